//! Integration suite: public API against real SQLite files and the in-memory
//! remote driver.

mod local_store_tests;
mod remote_upload_tests;
