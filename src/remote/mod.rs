//! Remote Oracle store
//!
//! Connection setup tries three interpretations of the configured service
//! identifier in a fixed order (service name, SID, easy-connect string) and
//! keeps the first session that opens. Searches are capped server-side.
//! Uploads are all-or-nothing: one rejected row rolls back the whole batch.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RemoteConfig;
use crate::error::{BoxError, Error, Result};
use crate::storage::filter::SearchFilter;

pub mod driver;
#[cfg(feature = "oracle")]
pub mod oracle;
pub mod sql;
pub mod upload;

pub use driver::{
    BatchRowError, Bind, ConnectRequest, ConnectStrategy, RawResultSet, RemoteDriver,
    RemoteSession,
};
pub use upload::{UploadCandidate, UploadItem, UploadOutcome};

/// Number of positional fields in a [`RemoteRow`].
const ROW_WIDTH: usize = 6;

/// One row of the remote search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRow {
    pub gid: Option<String>,
    pub merchandise_code: Option<String>,
    pub barcode: Option<String>,
    pub product_name: Option<String>,
    /// `YYYY-MM-DD HH24:MI:SS`, formatted by the server.
    pub create_timestamp: Option<String>,
    pub remark: Option<String>,
}

impl RemoteRow {
    fn from_values(values: Vec<Option<String>>) -> Option<Self> {
        let fields: [Option<String>; ROW_WIDTH] = values.try_into().ok()?;
        let [gid, merchandise_code, barcode, product_name, create_timestamp, remark] = fields;
        Some(Self {
            gid,
            merchandise_code,
            barcode,
            product_name,
            create_timestamp,
            remark,
        })
    }

    /// Cell values in column order, NULL rendered as an empty string.
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        [
            &self.gid,
            &self.merchandise_code,
            &self.barcode,
            &self.product_name,
            &self.create_timestamp,
            &self.remark,
        ]
        .into_iter()
        .map(|value| value.clone().unwrap_or_default())
        .collect()
    }
}

/// Column headers plus rows. Headers are present even when `rows` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<RemoteRow>,
}

/// Entry point for the remote store: endpoint configuration plus a driver.
pub struct RemoteStore<D> {
    driver: D,
    config: RemoteConfig,
}

impl<D: RemoteDriver> RemoteStore<D> {
    pub const fn new(driver: D, config: RemoteConfig) -> Self {
        Self { driver, config }
    }

    #[must_use]
    pub const fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Open a session, trying each [`ConnectStrategy`] in order.
    ///
    /// Fails with [`Error::Connection`] carrying the last driver error when
    /// every strategy is rejected.
    pub fn open(&self) -> Result<RemoteConnection<D::Session>> {
        let endpoint = self.config.endpoint()?;
        let mut last_error: Option<BoxError> = None;

        for strategy in ConnectStrategy::ORDERED {
            let request = ConnectRequest {
                strategy,
                descriptor: strategy.descriptor(endpoint.host, endpoint.port, endpoint.service),
                user: endpoint.user,
                password: endpoint.password,
            };
            debug!(%strategy, descriptor = %request.descriptor, "connecting to remote store");

            match self.driver.connect(&request) {
                Ok(session) => {
                    info!(
                        %strategy,
                        host = endpoint.host,
                        service = endpoint.service,
                        "connected to remote store"
                    );
                    return Ok(RemoteConnection {
                        session,
                        strategy,
                        table: self.config.table.clone(),
                    });
                }
                Err(err) => {
                    warn!(%strategy, error = %err, "remote connection attempt failed");
                    last_error = Some(err);
                }
            }
        }

        Err(Error::connection(
            format!(
                "all connection strategies failed for {}:{}/{}",
                endpoint.host, endpoint.port, endpoint.service
            ),
            last_error.unwrap_or_else(|| "no connection strategy attempted".into()),
        ))
    }
}

/// Open remote session. Owned by one caller; released by
/// [`RemoteConnection::close`] or when the driver session drops.
pub struct RemoteConnection<S> {
    session: S,
    strategy: ConnectStrategy,
    table: String,
}

impl<S: RemoteSession> RemoteConnection<S> {
    /// The strategy that produced this session.
    #[must_use]
    pub const fn strategy(&self) -> ConnectStrategy {
        self.strategy
    }

    /// Search the remote table. At most [`sql::ROW_LIMIT`] rows come back.
    pub fn query(&mut self, filter: &SearchFilter) -> Result<RemoteResultSet> {
        let (statement, binds) = sql::select(&self.table, filter);
        debug!(sql = %statement, binds = binds.len(), "remote query");

        let raw = self
            .session
            .query(&statement, &binds)
            .map_err(|err| Error::query(format!("select from {}", self.table), err))?;

        if raw.columns.len() != ROW_WIDTH {
            return Err(Error::query(
                format!("select from {}", self.table),
                format!("expected {ROW_WIDTH} columns, got {}", raw.columns.len()),
            ));
        }

        let rows = raw
            .rows
            .into_iter()
            .map(|values| {
                let width = values.len();
                RemoteRow::from_values(values).ok_or_else(|| {
                    Error::query(
                        format!("read row from {}", self.table),
                        format!("expected {ROW_WIDTH} fields, got {width}"),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(rows = rows.len(), "remote query finished");
        Ok(RemoteResultSet {
            columns: raw.columns,
            rows,
        })
    }

    /// Insert every well-formed candidate in one batch and commit only if no
    /// row was rejected.
    pub fn upload(&mut self, candidates: &[UploadCandidate]) -> Result<UploadOutcome> {
        if candidates.is_empty() {
            info!("nothing to upload");
            return Ok(UploadOutcome::nothing_to_do(0));
        }

        let mut items = Vec::with_capacity(candidates.len());
        for (index, candidate) in candidates.iter().enumerate() {
            match candidate.to_item() {
                Some(item) => items.push(item),
                None => warn!(index, "skipping malformed upload candidate"),
            }
        }
        let skipped = candidates.len() - items.len();
        if items.is_empty() {
            info!(skipped, "no valid rows to upload");
            return Ok(UploadOutcome::nothing_to_do(skipped));
        }

        let statement = sql::insert(&self.table);
        let rows: Vec<Vec<Bind>> = items.iter().map(UploadItem::binds).collect();
        debug!(sql = %statement, rows = rows.len(), "submitting upload batch");

        let failures = match self.session.execute_batch(&statement, &rows) {
            Ok(failures) => failures,
            Err(err) => {
                self.rollback_quietly();
                return Err(Error::upload(
                    format!("submit batch of {} rows to {}", rows.len(), self.table),
                    err,
                ));
            }
        };

        if failures.is_empty() {
            if let Err(err) = self.session.commit() {
                self.rollback_quietly();
                return Err(Error::upload(format!("commit batch to {}", self.table), err));
            }
            info!(rows = items.len(), skipped, "upload committed");
            return Ok(UploadOutcome {
                committed: true,
                rows_uploaded: items.len(),
                skipped,
                failures,
            });
        }

        for failure in &failures {
            warn!(offset = failure.offset, message = %failure.message, "row rejected");
        }
        self.session
            .rollback()
            .map_err(|err| Error::upload(format!("roll back batch to {}", self.table), err))?;
        warn!(
            rejected = failures.len(),
            total = items.len(),
            "upload rolled back"
        );

        Ok(UploadOutcome {
            committed: false,
            rows_uploaded: items.len().saturating_sub(failures.len()),
            skipped,
            failures,
        })
    }

    /// Round-trip to the server; returns its current time.
    pub fn ping(&mut self) -> Result<String> {
        let raw = self
            .session
            .query(sql::PING, &[])
            .map_err(|err| Error::query("ping", err))?;
        raw.rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next().flatten())
            .ok_or_else(|| Error::query("ping", "server returned no rows"))
    }

    /// Release the session.
    pub fn close(self) -> Result<()> {
        self.session
            .close()
            .map_err(|err| Error::connection("close remote session", err))?;
        info!("closed remote session");
        Ok(())
    }

    fn rollback_quietly(&mut self) {
        if let Err(err) = self.session.rollback() {
            warn!(error = %err, "rollback after failed upload also failed");
        }
    }
}
