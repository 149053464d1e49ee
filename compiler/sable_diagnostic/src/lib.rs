//! Structured diagnostics for the Sable C++ front end.
//!
//! Diagnostics are collected, not thrown: the parser keeps going after an
//! error and the caller receives the full ordered list alongside the
//! (possibly partial) declaration tree. A hard cap bounds accumulation;
//! when it is reached the parse of the current translation unit stops.

mod diagnostic;
mod emitter;
mod sink;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use emitter::Emitter;
pub use sink::{DiagnosticSink, MAX_ERRORS};
