//! Local storage layer
//!
//! A single SQLite file holding the `records` table, plus the search filter
//! shared with the remote adapter.

pub mod filter;
pub mod local;

pub use filter::SearchFilter;
pub use local::{LocalStore, Record};
