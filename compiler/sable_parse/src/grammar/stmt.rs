//! Statements.
//!
//! Function bodies are parsed for name resolution only: control-flow
//! statements open synthetic block scopes (`` `if ``, `` `while2 ``, ...)
//! that exist for lookup and are discarded from documentation. The
//! declaration-vs-expression statement ambiguity is resolved the C++
//! way: whatever parses as a declaration is one, tried speculatively
//! first.

use crate::grammar::ty::DeclaratorKind;
use crate::Parser;
use sable_ir::TokenKind;
use sable_resolve::NamespaceKind;

impl<'a> Parser<'a> {
    /// `{ statement* }`
    pub(crate) fn parse_compound_statement(&mut self) -> Option<()> {
        self.cursor.eat(TokenKind::LBrace)?;
        loop {
            match self.cursor.kind() {
                TokenKind::RBrace => {
                    self.cursor.advance();
                    return Some(());
                }
                TokenKind::Eof => return Some(()),
                _ => {
                    if self.parse_statement().is_none() {
                        if !self.syntax_error() {
                            return None;
                        }
                        self.skip_to_statement_end();
                    }
                }
            }
        }
    }

    fn parse_statement(&mut self) -> Option<()> {
        match self.cursor.kind() {
            TokenKind::Semi => {
                self.cursor.advance();
                self.drop_comments();
                Some(())
            }
            TokenKind::LBrace => self.scoped_block("block"),
            TokenKind::KwIf => {
                self.in_block_scope("if", |p| {
                    p.cursor.advance();
                    p.cursor.eat(TokenKind::LParen)?;
                    p.parse_condition()?;
                    p.cursor.eat(TokenKind::RParen)?;
                    p.parse_statement()?;
                    if p.cursor.eat(TokenKind::KwElse).is_some() {
                        p.parse_statement()?;
                    }
                    Some(())
                })
            }
            TokenKind::KwWhile => {
                self.in_block_scope("while", |p| {
                    p.cursor.advance();
                    p.cursor.eat(TokenKind::LParen)?;
                    p.parse_condition()?;
                    p.cursor.eat(TokenKind::RParen)?;
                    p.parse_statement()
                })
            }
            TokenKind::KwDo => {
                self.in_block_scope("do", |p| {
                    p.cursor.advance();
                    p.parse_statement()?;
                    p.cursor.eat(TokenKind::KwWhile)?;
                    p.cursor.eat(TokenKind::LParen)?;
                    p.parse_comma_expression()?;
                    p.cursor.eat(TokenKind::RParen)?;
                    p.expect_statement_semi();
                    Some(())
                })
            }
            TokenKind::KwFor => {
                self.in_block_scope("for", |p| {
                    p.cursor.advance();
                    p.cursor.eat(TokenKind::LParen)?;
                    p.parse_statement()?; // init statement, `;` included
                    if !p.cursor.check(TokenKind::Semi) {
                        p.parse_comma_expression()?;
                    }
                    p.cursor.eat(TokenKind::Semi)?;
                    if !p.cursor.check(TokenKind::RParen) {
                        p.parse_comma_expression()?;
                    }
                    p.cursor.eat(TokenKind::RParen)?;
                    p.parse_statement()
                })
            }
            TokenKind::KwSwitch => {
                self.in_block_scope("switch", |p| {
                    p.cursor.advance();
                    p.cursor.eat(TokenKind::LParen)?;
                    p.parse_condition()?;
                    p.cursor.eat(TokenKind::RParen)?;
                    p.parse_statement()
                })
            }
            TokenKind::KwCase => {
                self.cursor.advance();
                self.parse_conditional_expr(false)?;
                self.cursor.eat(TokenKind::Colon)?;
                self.parse_statement()
            }
            TokenKind::KwDefault => {
                self.cursor.advance();
                self.cursor.eat(TokenKind::Colon)?;
                self.parse_statement()
            }
            TokenKind::KwReturn => {
                self.cursor.advance();
                if !self.cursor.check(TokenKind::Semi) {
                    self.parse_comma_expression()?;
                }
                self.expect_statement_semi();
                Some(())
            }
            TokenKind::KwBreak | TokenKind::KwContinue => {
                self.cursor.advance();
                self.expect_statement_semi();
                Some(())
            }
            TokenKind::KwGoto => {
                self.cursor.advance();
                if matches!(self.cursor.kind(), TokenKind::Ident(_)) {
                    self.cursor.advance();
                }
                self.expect_statement_semi();
                Some(())
            }
            TokenKind::KwTry => {
                self.cursor.advance();
                self.scoped_block("try")?;
                while self.cursor.check(TokenKind::KwCatch) {
                    // The exception declaration lives in the handler's
                    // scope.
                    self.in_block_scope("catch", |p| {
                        p.cursor.advance();
                        p.cursor.eat(TokenKind::LParen)?;
                        p.parse_catch_parameter()?;
                        p.cursor.eat(TokenKind::RParen)?;
                        p.parse_compound_statement()
                    })?;
                }
                Some(())
            }
            // `label:` — only when the colon cannot start `::`.
            TokenKind::Ident(_)
                if self.cursor.nth(1) == TokenKind::Colon
                    && self.cursor.nth(2) != TokenKind::Colon =>
            {
                self.cursor.advance();
                self.cursor.advance();
                self.parse_statement()
            }
            _ => {
                // Declaration statement wins over expression statement
                // whenever it parses.
                let declared = self.tentative(|p| p.parse_declaration(None));
                if declared.is_some() {
                    return Some(());
                }
                self.parse_comma_expression()?;
                self.expect_statement_semi();
                Some(())
            }
        }
    }

    /// A compound statement in its own synthetic scope.
    fn scoped_block(&mut self, kind: &str) -> Option<()> {
        self.in_block_scope(kind, |p| p.parse_compound_statement())
    }

    fn in_block_scope(
        &mut self,
        kind: &str,
        body: impl FnOnce(&mut Self) -> Option<()>,
    ) -> Option<()> {
        let line = self.line();
        let kind_name = self.interner.intern(kind);
        self.builder
            .start_namespace(line, NamespaceKind::Unique, Some(kind_name));
        let result = body(self);
        // The scope closes on every exit path, error unwinding included.
        self.builder.end_namespace();
        result
    }

    /// `condition`: a declaration with an initializer, or an expression.
    fn parse_condition(&mut self) -> Option<()> {
        let declared = self.tentative(|p| {
            let spec = p.opt_type_specifier()?;
            let declarator = p.opt_declarator(&spec, DeclaratorKind::Normal)?;
            if declarator.value.is_none() || !p.cursor.check(TokenKind::RParen) {
                return None;
            }
            p.commit();
            let line = p.line();
            let name = declarator.name.as_ref().and_then(|n| n.last().copied())?;
            let ty = p.decode_enc(&declarator.enc, line);
            p.builder.add_variable(line, name, ty, false);
            Some(())
        });
        if declared.is_some() {
            return Some(());
        }
        self.parse_comma_expression()?;
        Some(())
    }

    /// `...` or a single exception declaration.
    fn parse_catch_parameter(&mut self) -> Option<()> {
        if self.cursor.eat(TokenKind::Ellipsis).is_some() {
            return Some(());
        }
        let spec = self.opt_type_specifier()?;
        let declarator = self.opt_declarator(&spec, DeclaratorKind::Arg)?;
        if let Some(name) = declarator.name.as_ref().and_then(|n| n.last().copied()) {
            let line = self.line();
            let ty = self.decode_enc(&declarator.enc, line);
            self.builder.add_variable(line, name, ty, false);
        }
        Some(())
    }

    /// Statement-level `;` — tolerated when missing, the next statement
    /// resynchronizes.
    fn expect_statement_semi(&mut self) {
        self.cursor.eat(TokenKind::Semi);
        self.drop_comments();
    }

    fn skip_to_statement_end(&mut self) {
        loop {
            match self.cursor.kind() {
                TokenKind::Semi => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                TokenKind::LBrace => {
                    self.cursor.skip_brace_block();
                    return;
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }
}
