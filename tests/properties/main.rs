//! Property suite.

mod filter_tests;
