//! recbridge - search local or remote record stores and push local rows upstream
//!
//! Two adapters with no shared state: [`storage::LocalStore`] over a SQLite
//! file and [`remote::RemoteStore`] over an Oracle table. Every operation is
//! synchronous; each command opens its own handle and releases it when done.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod remote;
pub mod storage;
pub mod test_utils;

pub use error::{Error, Result};
