//! In-memory stand-in for the remote store.
//!
//! Behaves like an Oracle session as far as the adapter can observe: rows
//! inserted in a session are pending until `commit`, a batch reports rejected
//! rows individually, and only the configured connect strategies succeed.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;

use crate::error::BoxError;
use crate::remote::driver::{
    BatchRowError, Bind, ConnectRequest, ConnectStrategy, RawResultSet, RemoteDriver,
    RemoteSession,
};
use crate::remote::sql::ROW_LIMIT;
use crate::storage::filter::{DATE_FORMAT, LIKE_ESCAPE};

/// Column names the stand-in reports for every search.
pub const COLUMNS: [&str; 6] = [
    "GID",
    "MRLCODE",
    "BARCODE",
    "PRODUCT_NAME",
    "CREATE_DATE_STR",
    "REMARK",
];

/// A row of the simulated remote table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub gid: String,
    pub mrlcode: String,
    pub barcode: Option<String>,
    pub product_name: Option<String>,
    pub create_date: NaiveDate,
    pub remark: Option<String>,
    pub uda1: Option<String>,
}

impl StoredRow {
    fn values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.gid.clone()),
            Some(self.mrlcode.clone()),
            self.barcode.clone(),
            self.product_name.clone(),
            Some(format!("{} 00:00:00", self.create_date.format(DATE_FORMAT))),
            self.remark.clone(),
        ]
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    accepted: Option<HashSet<ConnectStrategy>>,
    attempts: Vec<ConnectStrategy>,
    rows: Vec<StoredRow>,
    rejected_codes: HashSet<String>,
    fail_next_submit: bool,
    fail_next_commit: bool,
    open_sessions: usize,
    batches: usize,
    next_gid: u64,
}

impl MemoryState {
    fn allocate_gid(&mut self) -> String {
        self.next_gid += 1;
        format!("G{:06}", self.next_gid)
    }
}

/// Cheap to clone; clones share one simulated server.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDriver {
    /// A server that accepts every connect strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the listed strategies open a session.
    #[must_use]
    pub fn accepting(strategies: &[ConnectStrategy]) -> Self {
        let driver = Self::default();
        driver.state.lock().accepted = Some(strategies.iter().copied().collect());
        driver
    }

    /// Rows with this MRLCODE violate a constraint on insert.
    pub fn reject_code(&self, code: impl Into<String>) {
        self.state.lock().rejected_codes.insert(code.into());
    }

    /// The next batch submission fails as a whole, as if the link dropped.
    pub fn fail_next_submit(&self) {
        self.state.lock().fail_next_submit = true;
    }

    pub fn fail_next_commit(&self) {
        self.state.lock().fail_next_commit = true;
    }

    /// Put a committed row on the server directly.
    pub fn insert_committed(&self, mrlcode: &str, create_date: NaiveDate, product_name: &str) {
        let mut state = self.state.lock();
        let gid = state.allocate_gid();
        state.rows.push(StoredRow {
            gid,
            mrlcode: mrlcode.to_string(),
            barcode: None,
            product_name: Some(product_name.to_string()),
            create_date,
            remark: None,
            uda1: None,
        });
    }

    #[must_use]
    pub fn committed_rows(&self) -> Vec<StoredRow> {
        self.state.lock().rows.clone()
    }

    /// Strategies tried so far, in order.
    #[must_use]
    pub fn connect_attempts(&self) -> Vec<ConnectStrategy> {
        self.state.lock().attempts.clone()
    }

    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.state.lock().open_sessions
    }

    /// Number of batch submissions that reached the server.
    #[must_use]
    pub fn batches(&self) -> usize {
        self.state.lock().batches
    }
}

impl RemoteDriver for MemoryDriver {
    type Session = MemorySession;

    fn connect(&self, request: &ConnectRequest<'_>) -> Result<MemorySession, BoxError> {
        let mut state = self.state.lock();
        state.attempts.push(request.strategy);
        let accepted = state
            .accepted
            .as_ref()
            .is_none_or(|accepted| accepted.contains(&request.strategy));
        if !accepted {
            return Err(format!(
                "ORA-12514: listener does not currently know of service requested in {}",
                request.descriptor
            )
            .into());
        }
        state.open_sessions += 1;
        Ok(MemorySession {
            state: Arc::clone(&self.state),
            pending: Vec::new(),
        })
    }
}

pub struct MemorySession {
    state: Arc<Mutex<MemoryState>>,
    pending: Vec<StoredRow>,
}

fn bind<'a>(binds: &'a [Bind], name: &str) -> Option<&'a str> {
    binds
        .iter()
        .find(|bind| bind.name == name)
        .map(|bind| bind.value.as_str())
}

/// The literal fragment inside a `%...%` pattern escaped with [`LIKE_ESCAPE`].
fn like_fragment(pattern: &str) -> String {
    let inner = pattern.strip_prefix('%').unwrap_or(pattern);
    let inner = inner.strip_suffix('%').unwrap_or(inner);
    let mut fragment = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == LIKE_ESCAPE {
            fragment.extend(chars.next());
        } else {
            fragment.push(c);
        }
    }
    fragment
}

impl RemoteSession for MemorySession {
    fn query(&mut self, sql: &str, binds: &[Bind]) -> Result<RawResultSet, BoxError> {
        if sql.contains("FROM DUAL") {
            return Ok(RawResultSet {
                columns: vec!["NOW".to_string()],
                rows: vec![vec![Some(
                    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                )]],
            });
        }

        let date = bind(binds, "search_date")
            .map(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT))
            .transpose()
            .map_err(|err| format!("ORA-01861: literal does not match format string: {err}"))?;
        let fragment = bind(binds, "search_id").map(like_fragment);

        let state = self.state.lock();
        let rows = state
            .rows
            .iter()
            .chain(self.pending.iter())
            .filter(|row| date.is_none_or(|date| row.create_date == date))
            .filter(|row| {
                fragment
                    .as_deref()
                    .is_none_or(|fragment| row.mrlcode.contains(fragment))
            })
            .take(ROW_LIMIT)
            .map(StoredRow::values)
            .collect();

        Ok(RawResultSet {
            columns: COLUMNS.iter().map(ToString::to_string).collect(),
            rows,
        })
    }

    fn execute_batch(
        &mut self,
        _sql: &str,
        rows: &[Vec<Bind>],
    ) -> Result<Vec<BatchRowError>, BoxError> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_next_submit) {
            return Err("ORA-03113: end-of-file on communication channel".into());
        }
        state.batches += 1;

        let mut failures = Vec::new();
        for (offset, binds) in rows.iter().enumerate() {
            let mrlcode = bind(binds, "mrlcode").unwrap_or_default().to_string();
            if state.rejected_codes.contains(&mrlcode) {
                failures.push(BatchRowError {
                    offset,
                    message: format!("ORA-00001: unique constraint violated ({mrlcode})"),
                });
                continue;
            }
            let raw_date = bind(binds, "create_date").unwrap_or_default();
            let Ok(create_date) = NaiveDate::parse_from_str(raw_date, DATE_FORMAT) else {
                failures.push(BatchRowError {
                    offset,
                    message: format!("ORA-01861: literal does not match format string ({raw_date})"),
                });
                continue;
            };
            let gid = state.allocate_gid();
            self.pending.push(StoredRow {
                gid,
                mrlcode,
                barcode: None,
                product_name: None,
                create_date,
                remark: None,
                uda1: bind(binds, "uda1").map(ToString::to_string),
            });
        }
        Ok(failures)
    }

    fn commit(&mut self) -> Result<(), BoxError> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_next_commit) {
            return Err("ORA-03113: end-of-file on communication channel".into());
        }
        state.rows.append(&mut self.pending);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), BoxError> {
        self.pending.clear();
        Ok(())
    }

    fn close(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        // Uncommitted work dies with the session, as on a real server.
        self.pending.clear();
        let mut state = self.state.lock();
        state.open_sessions = state.open_sessions.saturating_sub(1);
    }
}
