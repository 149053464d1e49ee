//! Symbol table, name lookup and overload resolution for Sable.
//!
//! The [`Builder`] is the sole mutator of the symbol table and is driven
//! by the parser at every declaration point. [`Lookup`] answers the
//! parser's read-only disambiguation queries (is this a class-name? a
//! template-name?) without side effects, which is what makes speculative
//! parsing's rollback purity hold. The [`Decoder`] expands the parser's
//! byte encodings into full type graphs on demand.

mod builder;
mod decode;
mod dict;
mod lookup;
mod overload;
mod scope_info;

pub use builder::{Builder, BuilderOutput, NamespaceKind};
pub use decode::{encode_type, Decoder};
pub use dict::{DictError, Dictionary};
pub use lookup::Lookup;
pub use overload::{TypeInfo, BASE_MISMATCH, CONST_MISMATCH, DEREF_MISMATCH, REJECT};
pub use scope_info::{InfoId, ScopeInfo};

use sable_ir::Name;
use std::fmt;

/// Why a function lookup failed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FuncLookupError {
    /// Candidates existed but none fit the arguments.
    NoViable(Name),
    /// No function of that name was visible at all.
    NotFound(Name),
}

impl fmt::Display for FuncLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuncLookupError::NoViable(_) => write!(f, "no appropriate function found"),
            FuncLookupError::NotFound(_) => write!(f, "no matching functions found"),
        }
    }
}

impl std::error::Error for FuncLookupError {}
