//! Local SQLite record store

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params, params_from_iter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::filter::SearchFilter;

/// Default file name of the local store.
pub const DEFAULT_DB_NAME: &str = "record.db";

/// Bootstrap rows written by [`LocalStore::reset_and_seed`].
pub const SEED_RECORDS: [(&str, &str, &str); 4] = [
    ("ID001", "2024-01-15", "Sample data A for local DB"),
    ("ID002", "2024-01-16", "Sample data B for local DB"),
    ("ID003", "2024-01-15", "Sample data C, also 2024-01-15"),
    ("ID004", "2023-12-20", "Older data for testing date filter"),
];

/// One row of the `records` table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    pub event_date: String,
    pub payload: String,
}

impl Record {
    pub fn new(
        identifier: impl Into<String>,
        event_date: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            event_date: event_date.into(),
            payload: payload.into(),
        }
    }
}

/// Open session on the local store. Owned by one caller; released by
/// [`LocalStore::close`] or on drop.
pub struct LocalStore {
    conn: Connection,
    path: PathBuf,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    /// Open the store at `path`, creating the containing directory if needed.
    ///
    /// Opening never touches the schema; call [`LocalStore::reset_and_seed`]
    /// explicitly to (re)build the table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = std::path::absolute(path.as_ref()).map_err(|err| {
            Error::connection(format!("resolve {}", path.as_ref().display()), err)
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                Error::connection(format!("create directory {}", parent.display()), err)
            })?;
        }

        let conn = Connection::open(&path)
            .map_err(|err| Error::connection(format!("open {}", path.display()), err))?;
        Self::configure_pragmas(&conn)
            .map_err(|err| Error::connection(format!("configure {}", path.display()), err))?;

        info!(path = %path.display(), "opened local store");
        Ok(Self { conn, path })
    }

    /// Absolute path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop and recreate `records`, then insert the bootstrap rows.
    ///
    /// Destroys every existing local row. Runs in one transaction so a failure
    /// leaves the previous table in place.
    pub fn reset_and_seed(&mut self) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|err| Error::query("begin reset", err))?;

        tx.execute_batch(
            "DROP TABLE IF EXISTS records;
             CREATE TABLE records (
                 identifier TEXT PRIMARY KEY,
                 event_date TEXT,
                 payload TEXT
             );",
        )
        .map_err(|err| Error::query("recreate records table", err))?;

        {
            let mut stmt = tx
                .prepare("INSERT INTO records (identifier, event_date, payload) VALUES (?1, ?2, ?3)")
                .map_err(|err| Error::query("prepare seed insert", err))?;
            for (identifier, event_date, payload) in SEED_RECORDS {
                stmt.execute(params![identifier, event_date, payload])
                    .map_err(|err| Error::query(format!("seed {identifier}"), err))?;
            }
        }

        tx.commit()
            .map_err(|err| Error::query("commit reset", err))?;
        warn!(
            path = %self.path.display(),
            rows = SEED_RECORDS.len(),
            "local records table reset and seeded"
        );
        Ok(())
    }

    /// Insert one operator-entered row. A duplicate identifier is rejected by
    /// the primary key.
    pub fn insert(&mut self, record: &Record) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO records (identifier, event_date, payload) VALUES (?1, ?2, ?3)",
                params![record.identifier, record.event_date, record.payload],
            )
            .map_err(|err| Error::query(format!("insert {}", record.identifier), err))?;
        debug!(identifier = %record.identifier, "inserted local record");
        Ok(())
    }

    /// Rows matching `filter`, in the engine's natural order.
    pub fn query(&self, filter: &SearchFilter) -> Result<Vec<Record>> {
        let (sql, binds) = build_select(filter);
        debug!(sql = %sql, binds = binds.len(), "local query");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|err| Error::query("prepare local select", err))?;
        let rows = stmt
            .query_map(params_from_iter(binds.iter()), |row| {
                Ok(Record {
                    identifier: row.get(0)?,
                    event_date: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    payload: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })
            .map_err(|err| Error::query("run local select", err))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| Error::query("read local row", err))
    }

    /// Release the connection.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, err)| Error::connection(format!("close {}", path.display()), err))?;
        info!(path = %path.display(), "closed local store");
        Ok(())
    }

    fn configure_pragmas(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )
    }
}

fn build_select(filter: &SearchFilter) -> (String, Vec<String>) {
    let mut sql = String::from("SELECT identifier, event_date, payload FROM records");
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(date) = filter.date_param() {
        binds.push(date);
        conditions.push(format!("event_date = ?{}", binds.len()));
    }
    // instr() instead of LIKE: SQLite's LIKE folds ASCII case.
    if let Some(fragment) = &filter.identifier_fragment {
        binds.push(fragment.clone());
        conditions.push(format!("instr(identifier, ?{}) > 0", binds.len()));
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    (sql, binds)
}
