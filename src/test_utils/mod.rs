//! Shared test utilities: scratch stores, an in-memory remote server, log
//! capture and a table-driven runner.

pub mod fixtures;
pub mod logging;
pub mod memory_remote;

use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe, catch_unwind};
use std::time::Instant;

/// One row of a table-driven test.
#[derive(Debug, Clone)]
pub struct TestCase<I, E> {
    pub name: &'static str,
    pub input: I,
    pub expected: E,
    pub should_panic: bool,
}

/// Run every case through `check`, stopping at the first mismatch.
///
/// Each case prints its input, the observed value and how long it took, so a
/// failing table shows which row broke without a debugger.
pub fn run_table_tests<I, E, F>(cases: Vec<TestCase<I, E>>, check: F) -> Result<(), String>
where
    I: Debug + Clone + RefUnwindSafe,
    E: Debug + PartialEq,
    F: Fn(I) -> E + UnwindSafe + RefUnwindSafe,
{
    for case in cases {
        let started = Instant::now();
        println!("[case] {} <- {:?}", case.name, case.input);

        let outcome = catch_unwind(|| check(case.input.clone()));
        let elapsed = started.elapsed();

        match (outcome, case.should_panic) {
            (Err(_), true) => {
                println!("[case] {} panicked as expected ({elapsed:?})", case.name);
            }
            (Ok(_), true) => {
                return Err(format!("case '{}' was expected to panic", case.name));
            }
            (Err(_), false) => {
                return Err(format!("case '{}' panicked", case.name));
            }
            (Ok(actual), false) => {
                if actual != case.expected {
                    return Err(format!(
                        "case '{}': expected {:?}, got {:?}",
                        case.name, case.expected, actual
                    ));
                }
                println!("[case] {} ok ({elapsed:?})", case.name);
            }
        }
    }
    Ok(())
}
