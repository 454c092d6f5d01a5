//! Error types for recbridge
//!
//! Every backend failure is caught at the adapter boundary and converted into
//! one of three kinds (connection, query, upload) with the underlying cause
//! attached. Raw `rusqlite` or driver errors never reach callers.

use thiserror::Error;

/// Boxed backend cause carried by the adapter error kinds.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A session could not be established. Includes exhausting every remote
    /// connection strategy and failing to create the local store directory.
    #[error("connection error: {context}: {source}")]
    Connection {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("query error: {context}: {source}")]
    Query {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error("upload error: {context}: {source}")]
    Upload {
        context: String,
        #[source]
        source: BoxError,
    },

    /// The batch reached the server but at least one row was rejected, so
    /// nothing was committed. The command has already printed the outcome.
    #[error("upload rolled back: {rejected} of {attempted} rows rejected")]
    RolledBack { rejected: usize, attempted: usize },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn connection(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn query(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Query {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn upload(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Upload {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Stable short code used in robot-mode error output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection_error",
            Self::Query { .. } => "query_error",
            Self::Upload { .. } => "upload_error",
            Self::RolledBack { .. } => "upload_rolled_back",
            Self::InvalidFilter(_) => "invalid_filter",
            Self::Config(_) => "config_error",
            Self::Unsupported(_) => "unsupported",
            Self::Serialization(_) => "serialization_error",
            Self::Io(_) => "io_error",
        }
    }

    /// True when the failing command already wrote its own result document,
    /// so the caller must not print a second one.
    #[must_use]
    pub const fn already_reported(&self) -> bool {
        matches!(self, Self::RolledBack { .. })
    }
}
