//! Unit suite for the public configuration surface.

mod config_tests;
