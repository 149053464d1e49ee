//! C++ tokenizer for the Sable front end.
//!
//! The whole preprocessed buffer is scanned eagerly into a
//! [`TokenList`](sable_ir::TokenList); the parser's cursor then gives
//! arbitrary lookahead and save/restore for free, since a lexer position
//! is just an index. Comments are captured out-of-band and tagged with the
//! index of the token that follows them. Preprocessor directives are
//! skipped — the preprocessor runs before Sable.

mod keywords;
mod line_map;
mod scanner;

pub use line_map::LineMap;

use sable_ir::{StringInterner, TokenList};

/// Result of lexing one translation unit.
pub struct LexOutput {
    pub tokens: TokenList,
    pub line_map: LineMap,
}

/// Lex a preprocessed source buffer.
pub fn lex(source: &str, file: &str, interner: &StringInterner) -> LexOutput {
    let line_map = LineMap::new(file, source, interner);
    let tokens = scanner::Scanner::new(source, interner, &line_map).run();
    LexOutput { tokens, line_map }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sable_ir::TokenKind;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let interner = StringInterner::new();
        let out = lex(source, "test.cc", &interner);
        out.tokens.tokens().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_class_head() {
        let interner = StringInterner::new();
        let out = lex("class A : public B {};", "t.cc", &interner);
        let kinds: Vec<TokenKind> = out.tokens.tokens().iter().map(|t| t.kind).collect();
        assert_eq!(kinds.len(), 9); // class A : public B { } ; eof
        assert_eq!(kinds[0], TokenKind::KwClass);
        assert_eq!(kinds[1], TokenKind::Ident(interner.intern("A")));
        assert_eq!(kinds[2], TokenKind::Colon);
        assert_eq!(kinds[3], TokenKind::KwPublic);
        assert_eq!(kinds[8], TokenKind::Eof);
    }

    #[test]
    fn scope_and_ellipsis_are_single_tokens() {
        let ks = kinds("a::b(...)");
        assert!(ks.contains(&TokenKind::Scope));
        assert!(ks.contains(&TokenKind::Ellipsis));
    }

    #[test]
    fn shift_and_compare_operators() {
        let ks = kinds("a << b >>= c <= d");
        assert!(ks.contains(&TokenKind::Shl));
        assert!(ks.contains(&TokenKind::ShrAssign));
        assert!(ks.contains(&TokenKind::LtEq));
    }

    #[test]
    fn preprocessor_lines_are_skipped() {
        let ks = kinds("#include <vector>\nint x;");
        assert_eq!(ks[0], TokenKind::KwInt);
    }

    #[test]
    fn comments_are_captured_not_tokenized() {
        let interner = StringInterner::new();
        let out = lex("// doc\nint x; /* tail */\nint y;", "t.cc", &interner);
        // No comment tokens in the stream: int x ; int y ; eof
        assert_eq!(out.tokens.tokens().len(), 7);
        let comments = out.tokens.comments_between(0, out.tokens.len());
        assert_eq!(comments.len(), 2);
        assert_eq!(interner.resolve(comments[0].text), "// doc");
        assert!(comments[1].suffix);
    }

    #[test]
    fn line_map_reports_origin() {
        let interner = StringInterner::new();
        let out = lex("int a;\nint b;\n", "t.cc", &interner);
        let second = out.tokens.tokens()[3]; // `int` on line 2
        let (file, line) = out.line_map.origin(second.span.start);
        assert_eq!(interner.resolve(file), "t.cc");
        assert_eq!(line, 2);
    }

    #[test]
    fn numeric_literals_classify() {
        let interner = StringInterner::new();
        let out = lex("0x1f 3.5e2 42ul 'a' \"str\"", "t.cc", &interner);
        let ks: Vec<TokenKind> = out.tokens.tokens().iter().map(|t| t.kind).collect();
        assert!(matches!(ks[0], TokenKind::IntLit(_)));
        assert!(matches!(ks[1], TokenKind::FloatLit(_)));
        assert!(matches!(ks[2], TokenKind::IntLit(_)));
        assert!(matches!(ks[3], TokenKind::CharLit(_)));
        assert!(matches!(ks[4], TokenKind::StringLit(_)));
    }
}
