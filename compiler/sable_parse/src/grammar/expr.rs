//! Expressions.
//!
//! The full precedence chain, `id-expression` resolution through the
//! symbol table, and call/operator resolution against the overload
//! machinery. Expression parsing is speculative-safe: name resolution is
//! read-only, and the only arena traffic is unnamed literal/base types.
//!
//! Each expression yields a best-effort type. A type the parser cannot
//! determine is `TypeId::INVALID`, which downstream cost computation
//! treats as "matches anything".

use crate::grammar::ty::DeclaratorKind;
use crate::Parser;
use sable_ir::{DeclId, DeclKind, Encoding, ScopedName, TokenKind, Type, TypeId};
use smallvec::smallvec;

/// Value of a parsed (sub)expression.
#[derive(Clone, Debug)]
pub(crate) struct ExprVal {
    pub ty: TypeId,
    /// For id-expressions: the spelled name, kept for call resolution.
    pub callee: Option<ScopedName>,
    /// Class scope a trailing member access resolved against.
    pub member_of: Option<DeclId>,
}

impl ExprVal {
    fn typed(ty: TypeId) -> Self {
        ExprVal {
            ty,
            callee: None,
            member_of: None,
        }
    }
}

/// Binary precedence levels, loosest first. `.*`/`->*` bind tightest.
const BINARY_LEVELS: &[&[TokenKind]] = &[
    &[TokenKind::PipePipe],
    &[TokenKind::AmpAmp],
    &[TokenKind::Pipe],
    &[TokenKind::Caret],
    &[TokenKind::Amp],
    &[TokenKind::EqEq, TokenKind::NotEq],
    &[
        TokenKind::Lt,
        TokenKind::Gt,
        TokenKind::LtEq,
        TokenKind::GtEq,
    ],
    &[TokenKind::Shl, TokenKind::Shr],
    &[TokenKind::Plus, TokenKind::Minus],
    &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
    &[TokenKind::DotStar, TokenKind::ArrowStar],
];

impl<'a> Parser<'a> {
    // ---- entry points --------------------------------------------------

    /// `expression (, expression)*`
    pub(crate) fn parse_comma_expression(&mut self) -> Option<ExprVal> {
        let mut value = self.parse_expression()?;
        while self.cursor.eat(TokenKind::Comma).is_some() {
            value = self.parse_expression()?;
        }
        Some(value)
    }

    /// `assignment-expression`.
    pub(crate) fn parse_expression(&mut self) -> Option<ExprVal> {
        if self.cursor.check(TokenKind::KwThrow) {
            return self.parse_throw_expr();
        }
        let left = self.parse_conditional_expr(false)?;
        if self.cursor.kind().is_assign_op() {
            self.cursor.advance();
            let _right = self.parse_expression()?;
            return Some(ExprVal::typed(left.ty));
        }
        Some(left)
    }

    /// `conditional-expression`. With `no_gt`, a bare `>` terminates the
    /// expression — it closes a template argument list.
    pub(crate) fn parse_conditional_expr(&mut self, no_gt: bool) -> Option<ExprVal> {
        let cond = self.parse_binary_expr(0, no_gt)?;
        if self.cursor.eat(TokenKind::Question).is_some() {
            let then = self.parse_comma_expression()?;
            self.cursor.eat(TokenKind::Colon)?;
            let _else = self.parse_conditional_expr(no_gt)?;
            return Some(ExprVal::typed(then.ty));
        }
        Some(cond)
    }

    // ---- binary chain --------------------------------------------------

    fn parse_binary_expr(&mut self, level: usize, no_gt: bool) -> Option<ExprVal> {
        if level >= BINARY_LEVELS.len() {
            return self.parse_cast_expr(no_gt);
        }
        let mut left = self.parse_binary_expr(level + 1, no_gt)?;
        loop {
            let op = self.cursor.kind();
            let blocked = no_gt && matches!(op, TokenKind::Gt | TokenKind::GtEq | TokenKind::Shr);
            if blocked || !BINARY_LEVELS[level].contains(&op) {
                return Some(left);
            }
            self.cursor.advance();
            let right = self.parse_binary_expr(level + 1, no_gt)?;
            let ty = self.binary_result(op, &left, &right);
            left = ExprVal::typed(ty);
        }
    }

    /// Resolve an overloadable binary operator against both operand
    /// types; the result type is the winner's return type, defaulting to
    /// the left operand's.
    fn binary_result(&mut self, op: TokenKind, left: &ExprVal, right: &ExprVal) -> TypeId {
        let Some(spelling) = op.fixed_spelling() else {
            return left.ty;
        };
        let oper = self.interner.intern(&format!("operator{spelling}"));
        let info = self.builder.scope_info();
        let search = self.builder.infos()[info.index()].search.clone();
        let winner = self
            .builder
            .lookup()
            .lookup_operator(oper, left.ty, right.ty, &search);
        match winner {
            Some(func) => {
                let ret = self
                    .builder
                    .decls()
                    .get(func)
                    .as_function()
                    .map(|f| f.ret)
                    .unwrap_or(TypeId::INVALID);
                if ret.is_valid() {
                    ret
                } else {
                    left.ty
                }
            }
            None => left.ty,
        }
    }

    // ---- cast / unary --------------------------------------------------

    fn parse_cast_expr(&mut self, no_gt: bool) -> Option<ExprVal> {
        if self.cursor.check(TokenKind::LParen) {
            let cast = self.tentative(|p| {
                p.cursor.advance();
                let spec = p.opt_type_specifier()?;
                let declarator = p.opt_declarator(&spec, DeclaratorKind::Cast)?;
                p.cursor.eat(TokenKind::RParen)?;
                // The cast must be followed by something castable.
                p.parse_cast_expr(no_gt)?;
                Some(declarator.enc)
            });
            if let Some(enc) = cast {
                let line = self.line();
                let ty = self.cast_target_type(&enc, line);
                return Some(ExprVal::typed(ty));
            }
        }
        self.parse_unary_expr(no_gt)
    }

    /// Type named by a cast, resolved read-only; unknown names stay
    /// untyped rather than minting placeholders mid-expression.
    fn cast_target_type(&mut self, enc: &Encoding, _line: u32) -> TypeId {
        if let Some(name) = enc.as_simple_name() {
            let interned = self.interner.intern(name);
            if let Some(ty) = self.resolve_unqualified(interned, false) {
                return ty;
            }
        }
        TypeId::INVALID
    }

    fn parse_unary_expr(&mut self, no_gt: bool) -> Option<ExprVal> {
        match self.cursor.kind() {
            TokenKind::Star => {
                self.cursor.advance();
                let value = self.parse_cast_expr(no_gt)?;
                let ty = self.strip_pointer(value.ty);
                Some(ExprVal::typed(ty))
            }
            TokenKind::Amp => {
                self.cursor.advance();
                let value = self.parse_cast_expr(no_gt)?;
                let ty = self.pointer_to(value.ty);
                Some(ExprVal::typed(ty))
            }
            TokenKind::Plus | TokenKind::Minus | TokenKind::Tilde => {
                self.cursor.advance();
                self.parse_cast_expr(no_gt)
            }
            TokenKind::Bang => {
                self.cursor.advance();
                let _value = self.parse_cast_expr(no_gt)?;
                Some(ExprVal::typed(self.base_type("bool")))
            }
            TokenKind::Inc | TokenKind::Dec => {
                self.cursor.advance();
                self.parse_cast_expr(no_gt)
            }
            TokenKind::KwSizeof => self.parse_sizeof_expr(no_gt),
            TokenKind::KwNew => self.parse_new_expr(no_gt),
            TokenKind::KwDelete => {
                self.cursor.advance();
                if self.cursor.check(TokenKind::LBracket) {
                    self.cursor.advance();
                    self.cursor.eat(TokenKind::RBracket)?;
                }
                let _value = self.parse_cast_expr(no_gt)?;
                Some(ExprVal::typed(self.base_type("void")))
            }
            TokenKind::KwThrow => self.parse_throw_expr(),
            _ => self.parse_postfix_expr(no_gt),
        }
    }

    fn parse_sizeof_expr(&mut self, no_gt: bool) -> Option<ExprVal> {
        self.cursor.advance();
        let as_type = self.tentative(|p| {
            p.cursor.eat(TokenKind::LParen)?;
            let spec = p.opt_type_specifier()?;
            let _declarator = p.opt_declarator(&spec, DeclaratorKind::Cast)?;
            p.cursor.eat(TokenKind::RParen)?;
            Some(())
        });
        if as_type.is_none() {
            self.parse_unary_expr(no_gt)?;
        }
        Some(ExprVal::typed(self.base_type("long")))
    }

    fn parse_new_expr(&mut self, _no_gt: bool) -> Option<ExprVal> {
        self.cursor.advance();
        if self.cursor.check(TokenKind::LBracket) {
            self.cursor.advance();
            self.cursor.eat(TokenKind::RBracket)?;
        }
        // `new (placement) Type (init)` — recognize the type, skip the
        // rest.
        let parenthesized = self.cursor.eat(TokenKind::LParen).is_some();
        let spec = self.opt_type_specifier()?;
        let declarator = self.opt_declarator(&spec, DeclaratorKind::Cast)?;
        if parenthesized {
            self.cursor.eat(TokenKind::RParen)?;
        }
        if self.cursor.eat(TokenKind::LParen).is_some() {
            while !self.cursor.check(TokenKind::RParen) && !self.cursor.at_eof() {
                self.parse_expression()?;
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.cursor.eat(TokenKind::RParen)?;
        }
        let line = self.line();
        let base = self.cast_target_type(&declarator.enc, line);
        let ty = if base.is_valid() {
            self.pointer_to(base)
        } else {
            TypeId::INVALID
        };
        Some(ExprVal::typed(ty))
    }

    fn parse_throw_expr(&mut self) -> Option<ExprVal> {
        self.cursor.eat(TokenKind::KwThrow)?;
        // The operand is optional.
        if !matches!(
            self.cursor.kind(),
            TokenKind::Semi | TokenKind::RParen | TokenKind::Comma | TokenKind::RBrace
        ) {
            self.parse_expression()?;
        }
        Some(ExprVal::typed(self.base_type("void")))
    }

    // ---- postfix -------------------------------------------------------

    fn parse_postfix_expr(&mut self, no_gt: bool) -> Option<ExprVal> {
        let mut value = self.parse_primary_expr(no_gt)?;
        loop {
            match self.cursor.kind() {
                TokenKind::LParen => {
                    self.cursor.advance();
                    let mut args = Vec::new();
                    while !self.cursor.check(TokenKind::RParen) && !self.cursor.at_eof() {
                        let arg = self.parse_expression()?;
                        args.push(arg.ty);
                        if self.cursor.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    self.cursor.eat(TokenKind::RParen)?;
                    let ty = self.resolve_call(&value, &args);
                    value = ExprVal::typed(ty);
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let arg = self.parse_comma_expression()?;
                    self.cursor.eat(TokenKind::RBracket)?;
                    let ty = self.resolve_subscript(value.ty, arg.ty);
                    value = ExprVal::typed(ty);
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let arrow = self.cursor.check(TokenKind::Arrow);
                    self.cursor.advance();
                    let mut scratch = Encoding::new();
                    let names = self.opt_name(&mut scratch)?;
                    let base = if arrow {
                        self.strip_pointer(value.ty)
                    } else {
                        value.ty
                    };
                    value = self.resolve_member(base, &names);
                }
                TokenKind::Inc | TokenKind::Dec => {
                    self.cursor.advance();
                }
                _ => return Some(value),
            }
        }
    }

    /// Resolve a call through overload resolution when the callee is a
    /// known name; otherwise the call stays untyped.
    fn resolve_call(&mut self, callee: &ExprVal, args: &[TypeId]) -> TypeId {
        let Some(names) = &callee.callee else {
            return TypeId::INVALID;
        };
        let Some(&last) = names.last() else {
            return TypeId::INVALID;
        };
        let lookup = self.builder.lookup();
        let search = match callee.member_of.or_else(|| {
            (names.len() > 1).then(|| self.enclosing_scope_of(names)).flatten()
        }) {
            Some(scope) => match lookup.info_of(scope) {
                Some(info) => lookup.info(info).search.clone(),
                None => return TypeId::INVALID,
            },
            None => {
                let info = self.builder.scope_info();
                self.builder.infos()[info.index()].search.clone()
            }
        };
        match self.builder.lookup().lookup_func(last, &search, args) {
            Ok(func) => self
                .builder
                .decls()
                .get(func)
                .as_function()
                .map(|f| f.ret)
                .unwrap_or(TypeId::INVALID),
            Err(err) => {
                tracing::debug!(
                    name = %self.interner.resolve(last),
                    %err,
                    "call did not resolve"
                );
                TypeId::INVALID
            }
        }
    }

    /// `object[index]`: pointers dereference; class objects go through
    /// `operator[]`.
    fn resolve_subscript(&mut self, object: TypeId, index: TypeId) -> TypeId {
        let stripped = self.strip_pointer(object);
        if stripped != object {
            return stripped;
        }
        let lookup = self.builder.lookup();
        let Some(class) = lookup.as_class_decl(object) else {
            return TypeId::INVALID;
        };
        let Some(info) = lookup.info_of(class) else {
            return TypeId::INVALID;
        };
        let oper = self.interner.intern("operator[]");
        let mut methods = Vec::new();
        lookup.find_functions(oper, info, &mut methods);
        match lookup.best_function(&methods, &[index]) {
            Some((func, cost)) if cost < sable_resolve::REJECT => self
                .builder
                .decls()
                .get(func)
                .as_function()
                .map(|f| f.ret)
                .unwrap_or(TypeId::INVALID),
            _ => TypeId::INVALID,
        }
    }

    /// `object.member` / `pointer->member`: qualified lookup in the
    /// object's class, bases included.
    fn resolve_member(&mut self, base: TypeId, names: &ScopedName) -> ExprVal {
        let (class, entry) = {
            let lookup = self.builder.lookup();
            let Some(class) = lookup.as_class_decl(base) else {
                return ExprVal {
                    ty: TypeId::INVALID,
                    callee: Some(names.clone()),
                    member_of: None,
                };
            };
            let entry = names.last().and_then(|&name| {
                let info = lookup.info_of(class)?;
                lookup.qualified(name, info, true)
            });
            (class, entry)
        };
        let member_ty = entry
            .map(|entry| self.entry_value_type(entry))
            .unwrap_or(TypeId::INVALID);
        ExprVal {
            ty: member_ty,
            callee: Some(names.clone()),
            member_of: Some(class),
        }
    }

    // ---- primary -------------------------------------------------------

    fn parse_primary_expr(&mut self, no_gt: bool) -> Option<ExprVal> {
        match self.cursor.kind() {
            TokenKind::IntLit(text) => {
                self.cursor.advance();
                // The literal zero is the null pointer constant.
                let ty = if self.interner.resolve(text) == "0" {
                    self.base_type("__null_t")
                } else {
                    self.base_type("int")
                };
                Some(ExprVal::typed(ty))
            }
            TokenKind::FloatLit(_) => {
                self.cursor.advance();
                Some(ExprVal::typed(self.base_type("double")))
            }
            TokenKind::CharLit(_) => {
                self.cursor.advance();
                Some(ExprVal::typed(self.base_type("char")))
            }
            TokenKind::StringLit(_) => {
                self.cursor.advance();
                // Adjacent string literals concatenate.
                while matches!(self.cursor.kind(), TokenKind::StringLit(_)) {
                    self.cursor.advance();
                }
                let ch = self.base_type("char");
                Some(ExprVal::typed(self.pointer_to(ch)))
            }
            TokenKind::KwTrue | TokenKind::KwFalse => {
                self.cursor.advance();
                Some(ExprVal::typed(self.base_type("bool")))
            }
            TokenKind::KwThis => {
                self.cursor.advance();
                let this = self.interner.intern("this");
                let ty = self
                    .resolve_unqualified(this, false)
                    .map(|entry| self.entry_value_type(entry))
                    .unwrap_or(TypeId::INVALID);
                Some(ExprVal::typed(ty))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let value = self.parse_comma_expression()?;
                self.cursor.eat(TokenKind::RParen)?;
                Some(value)
            }
            TokenKind::Ident(_) | TokenKind::Scope | TokenKind::Tilde | TokenKind::KwOperator => {
                self.parse_id_expression(no_gt)
            }
            _ => None,
        }
    }

    /// `id-expression`: the same nested-name-specifier resolution as
    /// declarations, read-only.
    fn parse_id_expression(&mut self, _no_gt: bool) -> Option<ExprVal> {
        let mut scratch = Encoding::new();
        let names = self.opt_name(&mut scratch)?;
        let ty = self
            .resolve_scoped(&names, true)
            .map(|entry| self.entry_value_type(entry))
            .unwrap_or(TypeId::INVALID);
        Some(ExprVal {
            ty,
            callee: Some(names),
            member_of: None,
        })
    }

    /// The *value* type of a dictionary entry: a variable's declared
    /// type, a constant's type, `int` for enumerators, nothing for
    /// functions (calls resolve overloads instead).
    pub(crate) fn entry_value_type(&mut self, entry: TypeId) -> TypeId {
        let decl = match self.builder.types().get(entry) {
            Type::Declared { decl, .. } => *decl,
            _ => return entry,
        };
        enum Value {
            Ty(TypeId),
            Int,
            Builtin(sable_ir::Name),
            AsIs,
        }
        let value = {
            let decl_ref = self.builder.decls().get(decl);
            match &decl_ref.kind {
                DeclKind::Variable { vtype, .. } => Value::Ty(*vtype),
                DeclKind::Const { ctype, .. } => Value::Ty(*ctype),
                DeclKind::Enumerator { .. } => Value::Int,
                DeclKind::Builtin => Value::Builtin(decl_ref.last_name()),
                _ => Value::AsIs,
            }
        };
        match value {
            Value::Ty(ty) => ty,
            Value::Int => self.base_type("int"),
            Value::Builtin(name) => {
                let text = self.interner.resolve(name);
                match text {
                    "true" | "false" => self.base_type("bool"),
                    _ => self.base_type(text),
                }
            }
            Value::AsIs => entry,
        }
    }

    // ---- type helpers --------------------------------------------------

    pub(crate) fn base_type(&mut self, name: &str) -> TypeId {
        let interned = self.interner.intern(name);
        self.builder.create_base(interned)
    }

    /// Wrap a type in one level of pointer.
    pub(crate) fn pointer_to(&mut self, ty: TypeId) -> TypeId {
        if !ty.is_valid() {
            return TypeId::INVALID;
        }
        let star = self.interner.intern("*");
        self.builder.alloc_type(Type::Modifier {
            alias: ty,
            pre: smallvec![],
            post: smallvec![star],
        })
    }

    /// Remove one level of pointer indirection, if present.
    pub(crate) fn strip_pointer(&mut self, ty: TypeId) -> TypeId {
        if !ty.is_valid() {
            return TypeId::INVALID;
        }
        let star = self.interner.intern("*");
        let Type::Modifier { alias, pre, post } = self.builder.types().get(ty) else {
            return ty;
        };
        let mut post = post.clone();
        let (alias, pre) = (*alias, pre.clone());
        if let Some(idx) = post.iter().rposition(|&m| m == star) {
            post.remove(idx);
            if post.is_empty() && pre.is_empty() {
                return alias;
            }
            return self.builder.alloc_type(Type::Modifier { alias, pre, post });
        }
        ty
    }
}
