//! Parser test support.

mod parser;
mod rollback;

use crate::ParseOutput;
use sable_ir::{DeclId, Declaration, StringInterner};

/// Lex and parse a source snippet as one translation unit.
pub(crate) fn parse_source(source: &str, interner: &StringInterner) -> ParseOutput {
    let lexed = sable_lexer::lex(source, "test.cc", interner);
    crate::parse(&lexed.tokens, &lexed.line_map, interner)
}

/// Find the first declaration with the given unqualified name.
pub(crate) fn find_decl<'o>(
    output: &'o ParseOutput,
    interner: &StringInterner,
    name: &str,
) -> Option<(DeclId, &'o Declaration)> {
    output
        .decls
        .iter()
        .find(|(_, decl)| interner.resolve(decl.last_name()) == name)
}

/// Ids declared directly in the global scope, in documentation order.
pub(crate) fn root_decls(output: &ParseOutput) -> &[DeclId] {
    output
        .decls
        .get(output.root)
        .as_scope()
        .map(|scope| scope.declarations.as_slice())
        .unwrap_or(&[])
}
