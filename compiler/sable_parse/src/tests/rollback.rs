//! Rollback purity of tentative regions.
//!
//! A failed speculative attempt must leave the cursor, the
//! qualifying-scope pointer, the parse tree, and the whole symbol table
//! exactly as they were.

#![allow(clippy::unwrap_used)]

use crate::Parser;
use sable_ir::{StringInterner, TokenKind};
use sable_lexer::LexOutput;

fn lex(source: &str, interner: &StringInterner) -> LexOutput {
    sable_lexer::lex(source, "test.cc", interner)
}

#[test]
fn failed_tentative_restores_everything() {
    let interner = StringInterner::new();
    let lexed = lex("foo bar baz", &interner);
    let mut parser = Parser::new(&lexed.tokens, &lexed.line_map, &interner);

    let pos_before = parser.cursor.position();
    let ptree_before = parser.ptree.len();
    let types_before = parser.builder.types().len();
    let decls_before = parser.builder.decls().len();

    let result: Option<()> = parser.tentative(|p| {
        p.cursor.advance();
        p.cursor.advance();
        p.atom();
        None
    });

    assert!(result.is_none());
    assert_eq!(parser.cursor.position(), pos_before);
    assert_eq!(parser.ptree.len(), ptree_before);
    // The read-only attempt grew no arenas and touched no dictionaries.
    assert_eq!(parser.builder.types().len(), types_before);
    assert_eq!(parser.builder.decls().len(), decls_before);
}

#[test]
fn commit_disables_rollback() {
    let interner = StringInterner::new();
    let lexed = lex("a b c", &interner);
    let mut parser = Parser::new(&lexed.tokens, &lexed.line_map, &interner);

    let result: Option<()> = parser.tentative(|p| {
        p.cursor.advance();
        p.commit();
        p.cursor.advance();
        None
    });

    assert!(result.is_none());
    // The failure is real: no rewind past the committed point.
    assert_eq!(parser.cursor.position(), 2);
}

#[test]
fn nested_tentative_unwinds_to_the_right_level() {
    let interner = StringInterner::new();
    let lexed = lex("a b c d e", &interner);
    let mut parser = Parser::new(&lexed.tokens, &lexed.line_map, &interner);

    let outer: Option<()> = parser.tentative(|p| {
        p.cursor.advance(); // a
        let inner: Option<()> = p.tentative(|p| {
            p.cursor.advance(); // b
            p.cursor.advance(); // c
            None
        });
        assert!(inner.is_none());
        // Inner rollback returned us to `b`.
        assert_eq!(p.cursor.position(), 1);
        None
    });
    assert!(outer.is_none());
    assert_eq!(parser.cursor.position(), 0);
}

#[test]
fn failed_speculation_leaves_no_dictionary_entries() {
    let interner = StringInterner::new();
    // `x * y` at statement level speculates a declaration of `y` with
    // type `x` before settling on the expression reading; the
    // speculation must not mint an Unknown for `x`.
    let lexed = lex("void f() { int x; int y; x * y; }", &interner);
    let mut parser = Parser::new(&lexed.tokens, &lexed.line_map, &interner);
    while parser.parse_definition().is_some() {}

    let unknowns = (0..parser.builder.types().len())
        .filter(|&i| {
            parser
                .builder
                .types()
                .get(sable_ir::TypeId::new(i as u32))
                .is_unknown()
        })
        .count();
    assert_eq!(unknowns, 0, "no Unknown placeholders from speculation");
    assert!(!parser.builder.sink().has_errors());
}

#[test]
fn qualifying_scope_is_restored() {
    let interner = StringInterner::new();
    let lexed = lex("namespace N { int x; } N :: x", &interner);
    let mut parser = Parser::new(&lexed.tokens, &lexed.line_map, &interner);
    // Parse the namespace so `N` resolves.
    parser.parse_definition().unwrap();

    let qual_before = parser.qual_scope;
    let result: Option<()> = parser.tentative(|p| {
        // Walk the qualified name, which sets the qualifying scope...
        let mut enc = sable_ir::Encoding::new();
        let names = p.opt_name(&mut enc)?;
        assert_eq!(names.len(), 2);
        assert!(p.qual_scope.is_some());
        // ...then fail the production.
        None
    });
    assert!(result.is_none());
    assert_eq!(parser.qual_scope, qual_before);
}

#[test]
fn tentative_arg_list_rolls_back_cleanly() {
    let interner = StringInterner::new();
    // `x(3)` tries a parameter list first and falls back to the
    // constructor-style initializer; the stream position must be
    // consistent afterwards.
    let lexed = lex("int x(3);", &interner);
    let mut parser = Parser::new(&lexed.tokens, &lexed.line_map, &interner);
    let node = parser.parse_definition();
    assert!(node.is_some());
    assert!(parser.cursor.check(TokenKind::Eof));
}
