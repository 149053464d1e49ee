//! Speculative recursive-descent C++ parser for Sable.
//!
//! [`parse`] consumes a lexed token stream, drives the symbol-table
//! builder at every declaration point, and produces the homogeneous
//! parse tree, the declaration/type arenas, and the collected
//! diagnostics. A single malformed declaration never aborts the whole
//! translation unit: it is reported, dropped, and parsing resumes with
//! its siblings, until the error budget runs out.

mod cursor;
mod grammar;
mod parser;
mod ptree;

#[cfg(test)]
mod tests;

pub use cursor::Cursor;
pub use parser::Parser;
pub use ptree::{PNode, PNodeId, PTree};

use sable_diagnostic::Diagnostic;
use sable_ir::{DeclArena, DeclId, StringInterner, TokenList, TypeArena};
use sable_lexer::LineMap;

/// Everything produced for one translation unit.
pub struct ParseOutput {
    /// The global scope; its declaration list is the parsed sequence.
    pub root: DeclId,
    pub decls: DeclArena,
    pub types: TypeArena,
    /// The homogeneous list/atom tree.
    pub ptree: PTree,
    /// Root node of the tree, one child per top-level definition.
    pub tree_root: PNodeId,
    /// Ordered diagnostics; the caller decides whether a non-empty list
    /// makes the tree unusable.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse one translation unit.
pub fn parse(tokens: &TokenList, line_map: &LineMap, interner: &StringInterner) -> ParseOutput {
    let mut parser = Parser::new(tokens, line_map, interner);
    let mut items = Vec::new();
    loop {
        if parser.cursor.at_eof() || parser.builder.sink().is_full() {
            break;
        }
        match parser.parse_definition() {
            Some(node) => items.push(node),
            None => {
                if !parser.syntax_error() {
                    break;
                }
                parser.recover();
            }
        }
    }
    // Anything left after an aborted parse is untouched input, not a
    // bug; note it and stop.
    if !parser.cursor.at_eof() {
        tracing::debug!("parse stopped before end of input");
    }
    let tree_root = parser.ptree.list(items);
    let Parser {
        builder, ptree, ..
    } = parser;
    let output = builder.finish();
    ParseOutput {
        root: output.root,
        decls: output.decls,
        types: output.types,
        ptree,
        tree_root,
        diagnostics: output.diagnostics.into_diagnostics(),
    }
}
