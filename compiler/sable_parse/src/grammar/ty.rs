//! Names, type specifiers, declarators and template arguments.
//!
//! Everything in this module is *pure* with respect to the symbol table:
//! it recognizes grammar and builds encodings, consulting lookup only
//! read-only. That makes every production here safe to call from inside
//! a tentative region. The committed side (declaring what was
//! recognized) lives in `item.rs`.

use crate::Parser;
use sable_ir::{DeclId, Encoding, Name, ScopedName, TokenKind};

/// A recognized type-specifier: the base-type encoding plus trailing
/// cv-qualification to be applied outermost by the declarator.
#[derive(Clone, Debug)]
pub(crate) struct TypeSpec {
    pub enc: Encoding,
    pub is_const: bool,
    pub is_volatile: bool,
    /// Class or enum defined inline by this specifier.
    pub defined: Option<DeclId>,
    /// Elaborated specifier without a body (`class X`), which becomes a
    /// forward declaration if the whole declaration is just `class X;`.
    pub forward: Option<ScopedName>,
}

/// A formal parameter, recognized but not yet declared: the type stays
/// an encoding until the enclosing declaration commits.
#[derive(Clone, Debug)]
pub(crate) struct ParamSpec {
    pub enc: Encoding,
    pub name: Name,
    pub value: Name,
}

/// A recognized declarator.
#[derive(Clone, Debug)]
pub(crate) struct Declarator {
    /// Declared name; `None` for abstract declarators.
    pub name: Option<ScopedName>,
    /// Full type encoding for this declarator.
    pub enc: Encoding,
    /// Return-type encoding when this is a function declarator.
    pub ret_enc: Option<Encoding>,
    /// Argument-group encoding (signature key material).
    pub args_enc: Encoding,
    pub params: Vec<ParamSpec>,
    /// Modifiers after the parameter list (`const`, ...).
    pub postmod: Vec<Name>,
    pub is_function: bool,
    /// `X x(3)` constructor-style initialization.
    pub constructed: bool,
    /// Initializer text after `=`, if any.
    pub value: Option<Name>,
}

/// How a declarator is being parsed; mirrors the grammar's three
/// declarator contexts.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum DeclaratorKind {
    /// An ordinary declarator (name required unless constructing).
    Normal,
    /// A parameter declarator (name optional).
    Arg,
    /// An abstract declarator in a cast or template argument.
    Cast,
}

impl<'a> Parser<'a> {
    // ---- qualified names -----------------------------------------------

    /// `id-expression` / declarator name: `[::] component (:: component)*`
    /// where a component is an identifier, a template-id, `~identifier`,
    /// or an operator-function-id. Appends the encoding of the whole
    /// name to `enc` and tracks the qualifying scope read-only.
    pub(crate) fn opt_name(&mut self, enc: &mut Encoding) -> Option<ScopedName> {
        let mut components = ScopedName::new();
        // Per-component encodings, composed into a Q group at the end.
        let mut parts = Encoding::new();
        let mut count = 0usize;

        if self.cursor.eat(TokenKind::Scope).is_some() {
            components.push(Name::EMPTY);
            parts.global_scope();
            count += 1;
        }

        loop {
            match self.cursor.kind() {
                TokenKind::Ident(name) => {
                    if self.cursor.nth(1) == TokenKind::Lt && self.is_template_name(name) {
                        let args = self.tentative(|p| {
                            p.cursor.advance();
                            p.opt_template_args()
                        });
                        match args {
                            Some(args) => {
                                parts.template_args(self.interner.resolve(name), &args)
                            }
                            None => {
                                self.cursor.advance();
                                parts.simple_name(self.interner.resolve(name));
                            }
                        }
                    } else {
                        self.cursor.advance();
                        parts.simple_name(self.interner.resolve(name));
                    }
                    components.push(name);
                    count += 1;
                }
                TokenKind::Tilde => {
                    let TokenKind::Ident(name) = self.cursor.nth(1) else {
                        break;
                    };
                    self.cursor.advance();
                    self.cursor.advance();
                    let dtor = self
                        .interner
                        .intern(&format!("~{}", self.interner.resolve(name)));
                    parts.simple_name(self.interner.resolve(dtor));
                    components.push(dtor);
                    count += 1;
                }
                TokenKind::KwOperator => {
                    self.cursor.advance();
                    let name = self.opt_operator_name()?;
                    parts.simple_name(self.interner.resolve(name));
                    components.push(name);
                    count += 1;
                }
                _ => break,
            }

            // A trailing `::` continues the nested-name-specifier and
            // fixes the qualifying scope so far.
            if self.cursor.check(TokenKind::Scope)
                && !matches!(self.cursor.nth(1), TokenKind::Star)
            {
                self.cursor.advance();
                self.qual_scope = self
                    .resolve_scoped(&components, false)
                    .and_then(|ty| {
                        let followed = self.builder.lookup().follow_typedef(ty);
                        self.builder.types().get(followed).as_declared()
                    })
                    .filter(|&decl| self.builder.decls().get(decl).is_scope());
            } else {
                break;
            }
        }

        if components.is_empty() {
            return None;
        }
        if count == 1 && components.len() == 1 {
            enc.append(&parts);
        } else {
            parts.qualified(count);
            enc.append(&parts);
        }
        self.last_symbol = self.resolve_scoped(&components, true);
        Some(components)
    }

    /// The spelling after the `operator` keyword: a symbol, `()`, `[]`,
    /// or `new`/`delete`. Conversion operators are recognized by their
    /// type-specifier spelling.
    fn opt_operator_name(&mut self) -> Option<Name> {
        let spelling: String = match self.cursor.kind() {
            TokenKind::LParen if self.cursor.nth(1) == TokenKind::RParen => {
                self.cursor.advance();
                self.cursor.advance();
                "()".to_owned()
            }
            TokenKind::LBracket if self.cursor.nth(1) == TokenKind::RBracket => {
                self.cursor.advance();
                self.cursor.advance();
                "[]".to_owned()
            }
            TokenKind::KwNew => {
                self.cursor.advance();
                "new".to_owned()
            }
            TokenKind::KwDelete => {
                self.cursor.advance();
                "delete".to_owned()
            }
            TokenKind::Ident(_) => {
                // A conversion operator naming a user type.
                let spec = self.opt_type_specifier()?;
                return Some(self.interner.intern(&format!("operator {}", spec.enc)));
            }
            kind => {
                let spelling = kind.fixed_spelling()?;
                // Only operator symbols qualify, not arbitrary keywords.
                if spelling
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
                {
                    // A conversion operator: `operator Type`. Recognize
                    // the type spelling as the operator name.
                    let spec = self.opt_type_specifier()?;
                    let name = self.interner.intern(&format!("operator {}", spec.enc));
                    return Some(name);
                }
                self.cursor.advance();
                spelling.to_owned()
            }
        };
        Some(self.interner.intern(&format!("operator{spelling}")))
    }

    // ---- template arguments --------------------------------------------

    /// `< template-argument , ... >` after the name of a template.
    /// Returns the argument-group encoding. Purely speculative: the
    /// caller decides whether a failed parse means "just a less-than".
    pub(crate) fn opt_template_args(&mut self) -> Option<Encoding> {
        self.cursor.eat(TokenKind::Lt)?;
        let mut args = Encoding::new();
        if self.cursor.eat(TokenKind::Gt).is_some() {
            return Some(args);
        }
        loop {
            // Prefer a type-id; fall back to a constant expression,
            // which encodes as a value placeholder.
            let type_arg = self.tentative(|p| {
                let spec = p.opt_type_specifier()?;
                let decl = p.opt_declarator(&spec, DeclaratorKind::Cast)?;
                if p.cursor.check(TokenKind::Comma) || p.cursor.check(TokenKind::Gt) {
                    Some(decl.enc)
                } else {
                    None
                }
            });
            match type_arg {
                Some(enc) => args.append(&enc),
                None => {
                    // A `>` here closes the argument list, not a
                    // comparison.
                    self.parse_conditional_expr(true)?;
                    args.value_param();
                }
            }
            if self.cursor.eat(TokenKind::Comma).is_some() {
                continue;
            }
            self.cursor.eat(TokenKind::Gt)?;
            return Some(args);
        }
    }

    // ---- type specifiers -----------------------------------------------

    /// `type-specifier`: cv-qualifiers, a builtin type combination, an
    /// elaborated `class`/`struct`/`union`/`enum` key with a name, a
    /// `typename`-marked dependent name, or a (possibly qualified)
    /// type-name checked against the symbol table.
    ///
    /// Purely recognizing — except that an elaborated specifier with a
    /// *body* (`class X { ... }`) commits the parse and builds the class
    /// through `item.rs`.
    pub(crate) fn opt_type_specifier(&mut self) -> Option<TypeSpec> {
        let mut is_const = false;
        let mut is_volatile = false;
        self.opt_cv_qualify(&mut is_const, &mut is_volatile);

        let mut enc = Encoding::new();

        if self.opt_builtin_type(&mut enc) {
            self.opt_cv_qualify(&mut is_const, &mut is_volatile);
            return Some(TypeSpec {
                enc,
                is_const,
                is_volatile,
                defined: None,
                forward: None,
            });
        }

        match self.cursor.kind() {
            TokenKind::KwClass | TokenKind::KwStruct | TokenKind::KwUnion | TokenKind::KwEnum => {
                let (defined, forward) = self.parse_elaborated_spec(&mut enc)?;
                self.opt_cv_qualify(&mut is_const, &mut is_volatile);
                Some(TypeSpec {
                    enc,
                    is_const,
                    is_volatile,
                    defined,
                    forward,
                })
            }
            TokenKind::KwTypename => {
                self.cursor.advance();
                self.opt_name(&mut enc)?;
                self.opt_cv_qualify(&mut is_const, &mut is_volatile);
                Some(TypeSpec {
                    enc,
                    is_const,
                    is_volatile,
                    defined: None,
                    forward: None,
                })
            }
            TokenKind::Ident(_) | TokenKind::Scope => {
                let names = self.opt_name(&mut enc)?;
                // The symbol table disambiguates: only a name that
                // resolves to a type (or nothing at all — headers
                // reference types we never saw) can be a specifier.
                match self.resolve_scoped(&names, false) {
                    Some(ty) if self.names_a_type(ty) => {}
                    Some(_) => return None,
                    None => {}
                }
                self.opt_cv_qualify(&mut is_const, &mut is_volatile);
                Some(TypeSpec {
                    enc,
                    is_const,
                    is_volatile,
                    defined: None,
                    forward: None,
                })
            }
            _ if is_const || is_volatile => {
                // `const x = 3;` — const with implied int.
                enc.append_byte(b'i');
                Some(TypeSpec {
                    enc,
                    is_const,
                    is_volatile,
                    defined: None,
                    forward: None,
                })
            }
            _ => None,
        }
    }

    pub(crate) fn opt_cv_qualify(&mut self, is_const: &mut bool, is_volatile: &mut bool) {
        loop {
            match self.cursor.kind() {
                TokenKind::KwConst => {
                    *is_const = true;
                    self.cursor.advance();
                }
                TokenKind::KwVolatile => {
                    *is_volatile = true;
                    self.cursor.advance();
                }
                _ => return,
            }
        }
    }

    /// Builtin type combinations (`unsigned long long`, `long double`,
    /// ...) folded into their canonical one-byte tags, sign first.
    fn opt_builtin_type(&mut self, enc: &mut Encoding) -> bool {
        let mut sign = 0u8;
        let mut longs = 0u8;
        let mut short = false;
        let mut base: Option<u8> = None;
        let mut seen = false;
        loop {
            match self.cursor.kind() {
                TokenKind::KwSigned => sign = b'S',
                TokenKind::KwUnsigned => sign = b'U',
                TokenKind::KwShort => short = true,
                TokenKind::KwLong => longs += 1,
                TokenKind::KwInt => base = Some(b'i'),
                TokenKind::KwChar => base = Some(b'c'),
                TokenKind::KwWcharT => base = Some(b'w'),
                TokenKind::KwBool => base = Some(b'b'),
                TokenKind::KwFloat => base = Some(b'f'),
                TokenKind::KwDouble => base = Some(b'd'),
                TokenKind::KwVoid => base = Some(b'v'),
                _ => break,
            }
            seen = true;
            self.cursor.advance();
        }
        if !seen {
            return false;
        }
        if sign != 0 {
            enc.append_byte(sign);
        }
        let tag = match (base, short, longs) {
            (Some(b'd'), _, l) if l > 0 => b'r',
            (_, true, _) => b's',
            (None | Some(b'i'), false, 1) => b'l',
            (None | Some(b'i'), false, l) if l >= 2 => b'j',
            (Some(tag), _, _) => tag,
            (None, false, _) => b'i',
        };
        enc.append_byte(tag);
        true
    }

    // ---- declarators ---------------------------------------------------

    /// `declarator` / `abstract-declarator`: pointer operators, an
    /// optional (possibly qualified) name, parameter lists, array
    /// bounds, trailing cv, and an initializer.
    pub(crate) fn opt_declarator(
        &mut self,
        base: &TypeSpec,
        kind: DeclaratorKind,
    ) -> Option<Declarator> {
        let mut ops: Vec<u8> = Vec::new();
        let mut is_const = base.is_const;
        let mut is_volatile = base.is_volatile;
        loop {
            match self.cursor.kind() {
                TokenKind::Star => {
                    ops.push(b'*');
                    self.cursor.advance();
                    self.opt_cv_qualify(&mut is_const, &mut is_volatile);
                }
                TokenKind::Amp => {
                    ops.push(b'&');
                    self.cursor.advance();
                }
                _ => break,
            }
        }

        // `( * inner )` — function-pointer declarator.
        let mut inner_name = None;
        if self.cursor.check(TokenKind::LParen)
            && matches!(self.cursor.nth(1), TokenKind::Star | TokenKind::Amp)
        {
            self.cursor.advance();
            let inner = self.opt_declarator(base, DeclaratorKind::Cast)?;
            inner_name = inner.name;
            // Inner pointer marks apply to the function pointer itself
            // and are flattened away in the encoding.
            if kind != DeclaratorKind::Cast && inner_name.is_none() {
                if let TokenKind::Ident(_) = self.cursor.kind() {
                    let mut scratch = Encoding::new();
                    inner_name = self.opt_name(&mut scratch);
                }
            }
            self.cursor.eat(TokenKind::RParen)?;
        }

        let mut name = inner_name;
        if name.is_none() && kind != DeclaratorKind::Cast {
            if matches!(
                self.cursor.kind(),
                TokenKind::Ident(_) | TokenKind::Scope | TokenKind::Tilde | TokenKind::KwOperator
            ) {
                let mut scratch = Encoding::new();
                name = self.opt_name(&mut scratch);
                if name.is_none() && kind == DeclaratorKind::Normal {
                    return None;
                }
            } else if kind == DeclaratorKind::Normal {
                return None;
            }
        }

        // Base + array + pointer + cv, innermost first.
        let mut enc = base.enc.clone();

        let mut declarator = Declarator {
            name,
            enc: Encoding::new(),
            ret_enc: None,
            args_enc: Encoding::new(),
            params: Vec::new(),
            postmod: Vec::new(),
            is_function: false,
            constructed: false,
            value: None,
        };

        // Parameter list or constructor-style initializer.
        if self.cursor.check(TokenKind::LParen) {
            let arg_list = self.tentative(|p| {
                p.cursor.advance();
                let parsed = p.opt_arg_decl_list()?;
                p.cursor.eat(TokenKind::RParen)?;
                Some(parsed)
            });
            match arg_list {
                Some((params, args_enc)) => {
                    for &op in &ops {
                        enc.ptr_operator(op);
                    }
                    enc.cv_qualify(is_const, is_volatile);
                    let mut full = Encoding::new();
                    full.start_function(&enc);
                    full.append(&args_enc);
                    full.end_function();
                    let mut postmod = Vec::new();
                    loop {
                        match self.cursor.kind() {
                            TokenKind::KwConst => {
                                postmod.push(self.interner.intern("const"));
                                self.cursor.advance();
                            }
                            TokenKind::KwVolatile => {
                                postmod.push(self.interner.intern("volatile"));
                                self.cursor.advance();
                            }
                            TokenKind::KwThrow => {
                                // Exception specification: recognized,
                                // not recorded.
                                self.cursor.advance();
                                if self.cursor.eat(TokenKind::LParen).is_some() {
                                    while !self.cursor.check(TokenKind::RParen)
                                        && !self.cursor.at_eof()
                                    {
                                        self.cursor.advance();
                                    }
                                    self.cursor.eat(TokenKind::RParen);
                                }
                            }
                            _ => break,
                        }
                    }
                    declarator.ret_enc = Some(enc);
                    declarator.enc = full;
                    declarator.args_enc = args_enc;
                    declarator.params = params;
                    declarator.postmod = postmod;
                    declarator.is_function = true;
                }
                None if kind == DeclaratorKind::Normal && declarator.name.is_some() => {
                    // `X x(expr...)` — constructor-style initialization.
                    self.cursor.advance();
                    while !self.cursor.check(TokenKind::RParen) && !self.cursor.at_eof() {
                        if self.parse_expression().is_none() {
                            return None;
                        }
                        if self.cursor.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    self.cursor.eat(TokenKind::RParen)?;
                    declarator.constructed = true;
                    for &op in &ops {
                        enc.ptr_operator(op);
                    }
                    enc.cv_qualify(is_const, is_volatile);
                    declarator.enc = enc;
                }
                None => return None,
            }
        } else {
            // Array bounds wrap the base before pointers.
            while self.cursor.check(TokenKind::LBracket) {
                self.cursor.advance();
                while !self.cursor.check(TokenKind::RBracket) && !self.cursor.at_eof() {
                    self.cursor.advance();
                }
                self.cursor.eat(TokenKind::RBracket)?;
                enc.array();
            }
            for &op in &ops {
                enc.ptr_operator(op);
            }
            enc.cv_qualify(is_const, is_volatile);
            declarator.enc = enc;
        }

        // `= initializer` — captured as text.
        if !declarator.is_function && self.cursor.check(TokenKind::Assign) {
            self.cursor.advance();
            let start = self.cursor.position();
            self.parse_expression()?;
            let text = self.spell_tokens(start, self.cursor.position());
            declarator.value = Some(self.interner.intern(&text));
        }

        Some(declarator)
    }

    /// `parameter-declaration-list`, up to but not consuming `)`.
    /// Returns `None` when the parenthesized material is not a parameter
    /// list (the constructor-initializer ambiguity).
    pub(crate) fn opt_arg_decl_list(&mut self) -> Option<(Vec<ParamSpec>, Encoding)> {
        let mut params = Vec::new();
        let mut args_enc = Encoding::new();
        if self.cursor.check(TokenKind::RParen) {
            args_enc.void_type();
            return Some((params, args_enc));
        }
        loop {
            if self.cursor.check(TokenKind::Ellipsis) {
                self.cursor.advance();
                args_enc.ellipsis_arg();
                let mut enc = Encoding::new();
                enc.ellipsis_arg();
                params.push(ParamSpec {
                    enc,
                    name: Name::EMPTY,
                    value: Name::EMPTY,
                });
                break;
            }
            let spec = self.opt_type_specifier()?;
            let declarator = self.opt_declarator(&spec, DeclaratorKind::Arg)?;
            args_enc.append(&declarator.enc);
            let name = declarator
                .name
                .as_ref()
                .and_then(|n| n.last().copied())
                .unwrap_or(Name::EMPTY);
            params.push(ParamSpec {
                enc: declarator.enc.clone(),
                name,
                value: declarator.value.unwrap_or(Name::EMPTY),
            });
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.cursor.check(TokenKind::RParen).then_some((params, args_enc))
    }

    /// Join token spellings for captured initializers and enum values.
    pub(crate) fn spell_tokens(&self, lo: usize, hi: usize) -> String {
        let mut out = String::new();
        for k in lo..hi {
            let piece = match self.cursor.kind_at(k) {
                TokenKind::Ident(n)
                | TokenKind::IntLit(n)
                | TokenKind::FloatLit(n)
                | TokenKind::CharLit(n)
                | TokenKind::StringLit(n) => self.interner.resolve(n),
                other => other.fixed_spelling().unwrap_or(""),
            };
            if !out.is_empty() && !piece.is_empty() {
                out.push(' ');
            }
            out.push_str(piece);
        }
        out
    }
}
