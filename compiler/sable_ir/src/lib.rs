//! Core data model for the Sable C++ front end.
//!
//! Everything downstream crates share lives here: source spans, interned
//! names, tokens, comments, the declaration and type arenas, and the
//! compact [`Encoding`] codec the parser emits while recognizing grammar
//! fragments.

mod comment;
mod decl;
mod encoding;
mod interner;
mod name;
mod span;
mod token;
mod ty;

pub use comment::Comment;
pub use decl::{
    Access, ClassData, ClassKey, DeclArena, DeclId, DeclKind, Declaration, FunctionData,
    Inheritance, NamespaceFlavor, Parameter, ScopeData,
};
pub use encoding::{Encoding, MAX_NAME_LEN};
pub use interner::StringInterner;
pub use name::{scoped, scoped_in, Name, ScopedName};
pub use span::Span;
pub use token::{Token, TokenKind, TokenList};
pub use ty::{Mods, Type, TypeArena, TypeId};
