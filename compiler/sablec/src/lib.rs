//! Sable driver: lex → parse → report → export.
//!
//! The binary wraps this library thinly; everything testable lives
//! here. The driver hands downstream tooling a finished, immutable
//! declaration graph as JSON; whether a non-empty diagnostic list makes
//! that tree unusable is the consumer's call, so the export happens
//! regardless and the exit code carries the verdict.

mod driver;
pub mod export;
pub mod macro_map;

pub use driver::{run, DriverError, Options};
