//! The raw scanner: bytes in, tokens out.

use crate::keywords::keyword;
use crate::LineMap;
use memchr::memchr;
use sable_ir::{Comment, Span, StringInterner, Token, TokenKind, TokenList};

pub(crate) struct Scanner<'a> {
    src: &'a [u8],
    text: &'a str,
    pos: usize,
    interner: &'a StringInterner,
    line_map: &'a LineMap,
    tokens: Vec<Token>,
    comments: Vec<(u32, Comment)>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(text: &'a str, interner: &'a StringInterner, line_map: &'a LineMap) -> Self {
        Scanner {
            src: text.as_bytes(),
            text,
            pos: 0,
            interner,
            line_map,
            tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub(crate) fn run(mut self) -> TokenList {
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(&b) = self.src.get(self.pos) else {
                self.push(TokenKind::Eof, start);
                break;
            };
            match b {
                b'#' => self.skip_preprocessor_line(),
                b'/' if self.peek(1) == Some(b'/') || self.peek(1) == Some(b'*') => {
                    self.scan_comment();
                }
                b'_' | b'a'..=b'z' | b'A'..=b'Z' => self.scan_word(),
                b'0'..=b'9' => self.scan_number(),
                b'.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
                b'\'' => self.scan_quoted(b'\'', TokenKind::CharLit),
                b'"' => self.scan_quoted(b'"', TokenKind::StringLit),
                _ => self.scan_operator(),
            }
        }
        TokenList::new(self.tokens, self.comments)
    }

    #[inline]
    fn peek(&self, ahead: usize) -> Option<u8> {
        self.src.get(self.pos + ahead).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::from_range(start..self.pos),
        });
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.src.get(self.pos) {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Skip a `#` line, honoring backslash-newline continuations. The
    /// preprocessor already ran; anything left is a line marker or a
    /// directive we must not parse.
    fn skip_preprocessor_line(&mut self) {
        loop {
            match memchr(b'\n', &self.src[self.pos..]) {
                Some(rel) => {
                    let nl = self.pos + rel;
                    let continued = nl > 0 && self.src[nl - 1] == b'\\';
                    self.pos = nl + 1;
                    if !continued {
                        return;
                    }
                }
                None => {
                    self.pos = self.src.len();
                    return;
                }
            }
        }
    }

    fn scan_comment(&mut self) {
        let start = self.pos;
        if self.peek(1) == Some(b'*') {
            // Block comment: find the terminator.
            self.pos += 2;
            loop {
                match memchr(b'*', &self.src[self.pos..]) {
                    Some(rel) => {
                        self.pos += rel + 1;
                        if self.peek(0) == Some(b'/') {
                            self.pos += 1;
                            break;
                        }
                    }
                    None => {
                        self.pos = self.src.len();
                        break;
                    }
                }
            }
        } else {
            // Line comment.
            match memchr(b'\n', &self.src[self.pos..]) {
                Some(rel) => self.pos += rel,
                None => self.pos = self.src.len(),
            }
        }
        let line = self.line_map.line_of(start as u32);
        let suffix = self
            .tokens
            .last()
            .is_some_and(|t| self.line_map.line_of(t.span.end) == line);
        let text = self.interner.intern(&self.text[start..self.pos]);
        self.comments
            .push((self.tokens.len() as u32, Comment::new(text, line, suffix)));
    }

    fn scan_word(&mut self) {
        let start = self.pos;
        while self
            .peek(0)
            .is_some_and(|b| b == b'_' || b.is_ascii_alphanumeric())
        {
            self.pos += 1;
        }
        let text = &self.text[start..self.pos];
        let kind = keyword(text).unwrap_or_else(|| TokenKind::Ident(self.interner.intern(text)));
        self.push(kind, start);
    }

    fn scan_number(&mut self) {
        let start = self.pos;
        let mut is_float = false;
        if self.peek(0) == Some(b'0') && matches!(self.peek(1), Some(b'x' | b'X')) {
            self.pos += 2;
            while self.peek(0).is_some_and(|b| b.is_ascii_hexdigit()) {
                self.pos += 1;
            }
        } else {
            while self.peek(0).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
            if self.peek(0) == Some(b'.') && self.peek(1) != Some(b'.') {
                is_float = true;
                self.pos += 1;
                while self.peek(0).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
            if matches!(self.peek(0), Some(b'e' | b'E')) {
                let mut ahead = 1;
                if matches!(self.peek(1), Some(b'+' | b'-')) {
                    ahead = 2;
                }
                if self.peek(ahead).is_some_and(|b| b.is_ascii_digit()) {
                    is_float = true;
                    self.pos += ahead;
                    while self.peek(0).is_some_and(|b| b.is_ascii_digit()) {
                        self.pos += 1;
                    }
                }
            }
        }
        // Suffixes: uUlL for integers, fFlL for floats.
        while self
            .peek(0)
            .is_some_and(|b| matches!(b, b'u' | b'U' | b'l' | b'L' | b'f' | b'F'))
        {
            if matches!(self.peek(0), Some(b'f' | b'F')) {
                is_float = true;
            }
            self.pos += 1;
        }
        let text = self.interner.intern(&self.text[start..self.pos]);
        let kind = if is_float {
            TokenKind::FloatLit(text)
        } else {
            TokenKind::IntLit(text)
        };
        self.push(kind, start);
    }

    fn scan_quoted(&mut self, quote: u8, make: fn(sable_ir::Name) -> TokenKind) {
        let start = self.pos;
        self.pos += 1;
        while let Some(&b) = self.src.get(self.pos) {
            self.pos += 1;
            if b == b'\\' {
                self.pos += 1; // escaped character
            } else if b == quote {
                break;
            }
        }
        self.pos = self.pos.min(self.src.len());
        let text = self.interner.intern(&self.text[start..self.pos]);
        self.push(make(text), start);
    }

    fn scan_operator(&mut self) {
        use TokenKind::*;
        let start = self.pos;
        let b0 = self.src[self.pos];
        let b1 = self.peek(1);
        let b2 = self.peek(2);
        let (kind, len) = match (b0, b1, b2) {
            (b'<', Some(b'<'), Some(b'=')) => (ShlAssign, 3),
            (b'>', Some(b'>'), Some(b'=')) => (ShrAssign, 3),
            (b'.', Some(b'.'), Some(b'.')) => (Ellipsis, 3),
            (b'-', Some(b'>'), Some(b'*')) => (ArrowStar, 3),
            (b':', Some(b':'), _) => (Scope, 2),
            (b'-', Some(b'>'), _) => (Arrow, 2),
            (b'-', Some(b'-'), _) => (Dec, 2),
            (b'-', Some(b'='), _) => (MinusAssign, 2),
            (b'+', Some(b'+'), _) => (Inc, 2),
            (b'+', Some(b'='), _) => (PlusAssign, 2),
            (b'*', Some(b'='), _) => (StarAssign, 2),
            (b'/', Some(b'='), _) => (SlashAssign, 2),
            (b'%', Some(b'='), _) => (PercentAssign, 2),
            (b'^', Some(b'='), _) => (CaretAssign, 2),
            (b'&', Some(b'&'), _) => (AmpAmp, 2),
            (b'&', Some(b'='), _) => (AmpAssign, 2),
            (b'|', Some(b'|'), _) => (PipePipe, 2),
            (b'|', Some(b'='), _) => (PipeAssign, 2),
            (b'!', Some(b'='), _) => (NotEq, 2),
            (b'=', Some(b'='), _) => (EqEq, 2),
            (b'<', Some(b'<'), _) => (Shl, 2),
            (b'<', Some(b'='), _) => (LtEq, 2),
            (b'>', Some(b'>'), _) => (Shr, 2),
            (b'>', Some(b'='), _) => (GtEq, 2),
            (b'.', Some(b'*'), _) => (DotStar, 2),
            (b';', _, _) => (Semi, 1),
            (b':', _, _) => (Colon, 1),
            (b',', _, _) => (Comma, 1),
            (b'{', _, _) => (LBrace, 1),
            (b'}', _, _) => (RBrace, 1),
            (b'(', _, _) => (LParen, 1),
            (b')', _, _) => (RParen, 1),
            (b'[', _, _) => (LBracket, 1),
            (b']', _, _) => (RBracket, 1),
            (b'?', _, _) => (Question, 1),
            (b'.', _, _) => (Dot, 1),
            (b'~', _, _) => (Tilde, 1),
            (b'!', _, _) => (Bang, 1),
            (b'+', _, _) => (Plus, 1),
            (b'-', _, _) => (Minus, 1),
            (b'*', _, _) => (Star, 1),
            (b'/', _, _) => (Slash, 1),
            (b'%', _, _) => (Percent, 1),
            (b'^', _, _) => (Caret, 1),
            (b'&', _, _) => (Amp, 1),
            (b'|', _, _) => (Pipe, 1),
            (b'<', _, _) => (Lt, 1),
            (b'>', _, _) => (Gt, 1),
            (b'=', _, _) => (Assign, 1),
            _ => {
                // Unrecognized byte: drop it. The parser reports the
                // surrounding syntax error with better context.
                self.pos += 1;
                return;
            }
        };
        self.pos += len;
        self.push(kind, start);
    }
}
