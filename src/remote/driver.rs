//! Driver seam between the remote adapter and a concrete database client
//!
//! The adapter owns every decision (strategy order, SQL text, commit or
//! rollback); a driver only moves statements and binds over the wire.

use std::fmt;

use serde::Serialize;

use crate::error::BoxError;

/// How the configured service identifier is interpreted for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectStrategy {
    ServiceName,
    Sid,
    EasyConnect,
}

impl ConnectStrategy {
    /// Attempt order used by [`crate::remote::RemoteStore::open`].
    pub const ORDERED: [Self; 3] = [Self::ServiceName, Self::Sid, Self::EasyConnect];

    /// Connect descriptor for this interpretation of `service`.
    #[must_use]
    pub fn descriptor(self, host: &str, port: u16, service: &str) -> String {
        match self {
            Self::ServiceName => format!(
                "(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST={host})(PORT={port}))(CONNECT_DATA=(SERVICE_NAME={service})))"
            ),
            Self::Sid => format!(
                "(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST={host})(PORT={port}))(CONNECT_DATA=(SID={service})))"
            ),
            Self::EasyConnect => format!("{host}:{port}/{service}"),
        }
    }
}

impl fmt::Display for ConnectStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ServiceName => "service name",
            Self::Sid => "SID",
            Self::EasyConnect => "easy connect",
        };
        f.write_str(label)
    }
}

/// Everything a driver needs for one connection attempt.
pub struct ConnectRequest<'a> {
    pub strategy: ConnectStrategy,
    pub descriptor: String,
    pub user: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for ConnectRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("strategy", &self.strategy)
            .field("descriptor", &self.descriptor)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A named bind variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bind {
    pub name: &'static str,
    pub value: String,
}

impl Bind {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Column names from statement metadata plus the fetched rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// One row rejected inside a batch executed with per-row error capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRowError {
    /// Zero-based position of the row in the submitted batch.
    pub offset: usize,
    pub message: String,
}

pub trait RemoteDriver {
    type Session: RemoteSession;

    fn connect(&self, request: &ConnectRequest<'_>) -> Result<Self::Session, BoxError>;
}

/// An open remote session. Statements run inside one implicit transaction
/// that only ends with `commit` or `rollback`.
pub trait RemoteSession {
    fn query(&mut self, sql: &str, binds: &[Bind]) -> Result<RawResultSet, BoxError>;

    /// Execute `sql` once per bind row with per-row error capture. Rows that
    /// fail are reported, the rest stay pending in the open transaction.
    /// `Err` means the batch as a whole could not be submitted.
    fn execute_batch(
        &mut self,
        sql: &str,
        rows: &[Vec<Bind>],
    ) -> Result<Vec<BatchRowError>, BoxError>;

    fn commit(&mut self) -> Result<(), BoxError>;

    fn rollback(&mut self) -> Result<(), BoxError>;

    fn close(self) -> Result<(), BoxError>
    where
        Self: Sized;
}

/// Driver type for builds without a database client. Uninhabited: a
/// `RemoteStore<Unavailable>` can be named but never constructed.
#[derive(Debug, Clone, Copy)]
pub enum Unavailable {}

impl RemoteDriver for Unavailable {
    type Session = Self;

    fn connect(&self, _request: &ConnectRequest<'_>) -> Result<Self, BoxError> {
        match *self {}
    }
}

impl RemoteSession for Unavailable {
    fn query(&mut self, _sql: &str, _binds: &[Bind]) -> Result<RawResultSet, BoxError> {
        match *self {}
    }

    fn execute_batch(
        &mut self,
        _sql: &str,
        _rows: &[Vec<Bind>],
    ) -> Result<Vec<BatchRowError>, BoxError> {
        match *self {}
    }

    fn commit(&mut self) -> Result<(), BoxError> {
        match *self {}
    }

    fn rollback(&mut self) -> Result<(), BoxError> {
        match *self {}
    }

    fn close(self) -> Result<(), BoxError> {
        match self {}
    }
}
