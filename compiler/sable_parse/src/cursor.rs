//! Token cursor.
//!
//! Low-level navigation over the eagerly lexed token stream. Since the
//! stream is a slice, arbitrary lookahead and save/restore are index
//! arithmetic; the tentative machinery snapshots `position` and nothing
//! else on the lexer side.

use sable_ir::{Comment, Token, TokenKind, TokenList};

pub struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    /// Current position in the token stream.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Restore a previously observed position.
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos <= self.tokens.len());
        self.pos = pos;
    }

    /// The current token.
    #[inline]
    pub fn current(&self) -> Token {
        self.tokens.get(self.pos)
    }

    /// The current token's kind.
    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Lookahead: the kind `k` tokens ahead (0 = current).
    #[inline]
    pub fn nth(&self, k: usize) -> TokenKind {
        self.tokens.get(self.pos + k).kind
    }

    /// Kind of the token at an absolute position, for re-reading
    /// already-consumed ranges.
    #[inline]
    pub fn kind_at(&self, pos: usize) -> TokenKind {
        self.tokens.get(pos).kind
    }

    /// Token at an absolute position.
    #[inline]
    pub fn token_at(&self, pos: usize) -> Token {
        self.tokens.get(pos)
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    /// Consume and return the current token.
    pub fn advance(&mut self) -> Token {
        let token = self.current();
        if !self.at_eof() {
            self.pos += 1;
        }
        token
    }

    /// True if the current token matches.
    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// The identifier name under the cursor, if any.
    #[inline]
    pub fn ident(&self) -> Option<sable_ir::Name> {
        self.kind().as_ident()
    }

    /// Comments attached between two token positions, in source order.
    pub fn comments_between(&self, lo: usize, hi: usize) -> Vec<Comment> {
        self.tokens.comments_between(lo, hi)
    }

    /// Skip a brace-balanced block starting at the current `{`. Returns
    /// the token range of the block (including both braces), or `None`
    /// if the cursor is not on `{`. Used to defer member function
    /// bodies.
    pub fn skip_brace_block(&mut self) -> Option<(usize, usize)> {
        if !self.check(TokenKind::LBrace) {
            return None;
        }
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        return Some((start, self.pos));
                    }
                }
                TokenKind::Eof => return Some((start, self.pos)),
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sable_ir::StringInterner;

    fn cursor_for(src: &'static str, interner: &StringInterner) -> sable_lexer::LexOutput {
        sable_lexer::lex(src, "t.cc", interner)
    }

    #[test]
    fn skip_brace_block_tracks_nesting() {
        let interner = StringInterner::new();
        let out = cursor_for("{ a { b } c } d", &interner);
        let mut cursor = Cursor::new(&out.tokens);
        let (start, end) = cursor.skip_brace_block().expect("block");
        assert_eq!(start, 0);
        assert_eq!(end, 7); // { a { b } c }
        assert_eq!(cursor.ident(), Some(interner.intern("d")));
    }

    #[test]
    fn save_restore_round_trips() {
        let interner = StringInterner::new();
        let out = cursor_for("a b c", &interner);
        let mut cursor = Cursor::new(&out.tokens);
        let mark = cursor.position();
        cursor.advance();
        cursor.advance();
        cursor.set_position(mark);
        assert_eq!(cursor.ident(), Some(interner.intern("a")));
    }
}
