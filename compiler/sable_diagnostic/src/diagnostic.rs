//! Diagnostic records.

use sable_ir::{Name, ScopedName};
use std::fmt;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// The closed taxonomy of things Sable reports.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DiagnosticKind {
    /// A grammar production failed in a committed (non-speculative)
    /// context.
    Syntax,
    /// A qualified lookup's intermediate scope name did not resolve.
    UndefinedSymbol { name: ScopedName },
    /// A `declare` collided with an existing non-overloadable entry.
    /// Both source sites are reported; this record carries the first.
    AlreadyDefined {
        name: ScopedName,
        first_file: Name,
        first_line: u32,
    },
    /// A symbol resolved, but not to the kind the context required.
    TypeMismatch {
        name: ScopedName,
        expected: &'static str,
    },
}

/// One collected diagnostic.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    /// Source file the diagnostic points at.
    pub file: Name,
    /// 1-based line.
    pub line: u32,
}

impl Diagnostic {
    /// A syntax error at a committed parse position.
    pub fn syntax(file: Name, line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind: DiagnosticKind::Syntax,
            message: message.into(),
            file,
            line,
        }
    }

    /// An unresolved qualifying name.
    pub fn undefined(file: Name, line: u32, name: ScopedName, rendered: &str) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: format!("undefined symbol `{rendered}`"),
            kind: DiagnosticKind::UndefinedSymbol { name },
            file,
            line,
        }
    }

    /// A redefinition of a non-overloadable name. `first` is the original
    /// definition site.
    pub fn already_defined(
        file: Name,
        line: u32,
        name: ScopedName,
        rendered: &str,
        first_file: Name,
        first_line: u32,
    ) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: format!("`{rendered}` is already defined"),
            kind: DiagnosticKind::AlreadyDefined {
                name,
                first_file,
                first_line,
            },
            file,
            line,
        }
    }

    /// A symbol of the wrong kind for its use site.
    pub fn type_mismatch(
        file: Name,
        line: u32,
        name: ScopedName,
        rendered: &str,
        expected: &'static str,
    ) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: format!("`{rendered}` is not a {expected}"),
            kind: DiagnosticKind::TypeMismatch { name, expected },
            file,
            line,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
