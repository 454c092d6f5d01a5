//! Oracle driver backed by the `oracle` crate (ODPI-C)

use ::oracle::sql_type::ToSql;
use ::oracle::{Connection, Error as OracleError};

use crate::error::BoxError;
use crate::remote::driver::{
    BatchRowError, Bind, ConnectRequest, RawResultSet, RemoteDriver, RemoteSession,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDriver;

impl RemoteDriver for OracleDriver {
    type Session = OracleSession;

    fn connect(&self, request: &ConnectRequest<'_>) -> Result<OracleSession, BoxError> {
        let conn = Connection::connect(request.user, request.password, &request.descriptor)?;
        Ok(OracleSession { conn })
    }
}

pub struct OracleSession {
    conn: Connection,
}

fn named(binds: &[Bind]) -> Vec<(&str, &dyn ToSql)> {
    binds
        .iter()
        .map(|bind| (bind.name, &bind.value as &dyn ToSql))
        .collect()
}

fn row_errors(err: OracleError) -> Result<Vec<BatchRowError>, BoxError> {
    match err {
        OracleError::BatchErrors(errors) => Ok(errors
            .iter()
            .map(|db_err| BatchRowError {
                offset: usize::try_from(db_err.offset()).unwrap_or(usize::MAX),
                message: db_err.message().to_string(),
            })
            .collect()),
        other => Err(other.into()),
    }
}

impl RemoteSession for OracleSession {
    fn query(&mut self, sql: &str, binds: &[Bind]) -> Result<RawResultSet, BoxError> {
        let params = named(binds);
        let result_set = self.conn.query_named(sql, &params)?;
        let columns: Vec<String> = result_set
            .column_info()
            .iter()
            .map(|info| info.name().to_string())
            .collect();

        let mut rows = Vec::new();
        for row in result_set {
            let row = row?;
            let values = (0..columns.len())
                .map(|index| row.get::<usize, Option<String>>(index))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(values);
        }
        Ok(RawResultSet { columns, rows })
    }

    fn execute_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<Bind>],
    ) -> Result<Vec<BatchRowError>, BoxError> {
        // One slot more than the row count so appending never flushes early.
        let mut batch = self
            .conn
            .batch(sql, rows.len() + 1)
            .with_batch_errors()
            .build()?;
        for row in rows {
            if let Err(err) = batch.append_row_named(&named(row)) {
                return row_errors(err);
            }
        }
        match batch.execute() {
            Ok(()) => Ok(Vec::new()),
            Err(err) => row_errors(err),
        }
    }

    fn commit(&mut self) -> Result<(), BoxError> {
        self.conn.commit()?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), BoxError> {
        self.conn.rollback()?;
        Ok(())
    }

    fn close(self) -> Result<(), BoxError> {
        self.conn.close()?;
        Ok(())
    }
}
