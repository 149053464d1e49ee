//! Declarations: namespaces, classes, templates, typedefs, using
//! directives, functions and variables.
//!
//! This module owns the *committed* side of declaration parsing. The
//! recognition helpers in `ty.rs` stay pure; once a production has seen
//! enough to prove its grammar choice (a terminating `;`, a `class-key
//! identifier {`, a function body brace) it calls `commit()` and only
//! then drives the builder.

use crate::grammar::ty::DeclaratorKind;
use crate::grammar::{Declarator, TypeSpec};
use crate::{PNodeId, Parser};
use sable_ir::{
    ClassKey, Comment, DeclId, Encoding, Mods, Name, Parameter, ScopedName, TokenKind, Type,
    TypeId,
};
use sable_resolve::{Decoder, NamespaceKind};
use smallvec::smallvec;

/// A member function body whose parse is deferred to class close, so
/// that siblings declared later in the class are visible inside it.
pub(crate) struct DeferredBody {
    pub func_name: Name,
    pub params: Vec<Parameter>,
    pub body_start: usize,
    pub class: DeclId,
}

impl<'a> Parser<'a> {
    // ---- top level -----------------------------------------------------

    /// One top-level definition. `None` means the tokens at the cursor
    /// match no production; the caller reports and recovers.
    pub(crate) fn parse_definition(&mut self) -> Option<PNodeId> {
        match self.cursor.kind() {
            TokenKind::Semi => {
                let start = self.cursor.position();
                self.cursor.advance();
                self.drop_comments();
                Some(self.node_for_range(start, None))
            }
            TokenKind::KwNamespace => self.parse_namespace(),
            TokenKind::KwUsing => self.parse_using(),
            TokenKind::KwTypedef => self.parse_typedef(),
            TokenKind::KwTemplate => self.parse_template_decl(),
            TokenKind::KwExtern if matches!(self.cursor.nth(1), TokenKind::StringLit(_)) => {
                self.parse_linkage_spec()
            }
            TokenKind::Eof => None,
            _ => self.parse_declaration(None),
        }
    }

    /// `namespace N { ... }`, `namespace { ... }`, `namespace A = B;`
    fn parse_namespace(&mut self) -> Option<PNodeId> {
        let start = self.cursor.position();
        let line = self.line();
        self.cursor.eat(TokenKind::KwNamespace)?;
        self.commit();
        self.drop_comments();

        match self.cursor.kind() {
            TokenKind::Ident(name) if self.cursor.nth(1) == TokenKind::Assign => {
                // namespace alias
                self.cursor.advance();
                self.cursor.advance();
                let mut scratch = Encoding::new();
                let target = self.opt_name(&mut scratch)?;
                let ty = self.builder.lookup_scoped_or_unknown(&target, line, false);
                self.builder.add_aliased_namespace(name, ty);
                self.expect_semi();
                Some(self.node_for_range(start, None))
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                self.cursor.eat(TokenKind::LBrace)?;
                self.builder
                    .start_namespace(line, NamespaceKind::Named, Some(name));
                let node = self.parse_scope_body(start);
                self.builder.end_namespace();
                Some(node)
            }
            TokenKind::LBrace => {
                self.cursor.advance();
                self.builder
                    .start_namespace(line, NamespaceKind::Anonymous, None);
                let node = self.parse_scope_body(start);
                self.builder.end_namespace();
                Some(node)
            }
            _ => None,
        }
    }

    /// Definitions up to the closing `}` of a namespace or linkage
    /// block, with per-declaration error recovery.
    fn parse_scope_body(&mut self, start: usize) -> PNodeId {
        loop {
            match self.cursor.kind() {
                TokenKind::RBrace => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof => break,
                _ => {
                    if self.parse_definition().is_none() {
                        if !self.syntax_error() {
                            break;
                        }
                        self.recover();
                    }
                }
            }
        }
        self.node_for_range(start, None)
    }

    /// `using namespace N;` or `using N::x;`
    fn parse_using(&mut self) -> Option<PNodeId> {
        let start = self.cursor.position();
        let line = self.line();
        self.cursor.eat(TokenKind::KwUsing)?;
        self.commit();
        self.drop_comments();
        let mut scratch = Encoding::new();
        if self.cursor.eat(TokenKind::KwNamespace).is_some() {
            let names = self.opt_name(&mut scratch)?;
            let target = self.builder.lookup_scoped_or_unknown(&names, line, false);
            self.builder.add_using_directive(line, target);
        } else {
            let names = self.opt_name(&mut scratch)?;
            let target = self.builder.lookup_scoped_or_unknown(&names, line, true);
            self.builder.add_using_declaration(line, target);
        }
        self.expect_semi();
        Some(self.node_for_range(start, Some(scratch)))
    }

    /// `typedef type declarator (, declarator)* ;`
    fn parse_typedef(&mut self) -> Option<PNodeId> {
        let start = self.cursor.position();
        let line = self.line();
        self.cursor.eat(TokenKind::KwTypedef)?;
        self.commit();
        let comments = self.pending_comments(start);
        let spec = self.opt_type_specifier()?;
        loop {
            let declarator = self.opt_declarator(&spec, DeclaratorKind::Normal)?;
            let names = declarator.name.as_ref()?;
            let name = *names.last()?;
            let alias = self.decode_enc(&declarator.enc, line);
            let decl = self.builder.add_typedef(line, name, alias, false);
            self.builder.add_comments(decl, comments.clone());
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect_semi();
        Some(self.node_for_range(start, Some(spec.enc)))
    }

    /// `extern "C" { ... }` or `extern "C" declaration` — linkage has no
    /// scope of its own.
    fn parse_linkage_spec(&mut self) -> Option<PNodeId> {
        let start = self.cursor.position();
        self.cursor.eat(TokenKind::KwExtern)?;
        self.cursor.advance(); // the string literal
        self.commit();
        if self.cursor.eat(TokenKind::LBrace).is_some() {
            Some(self.parse_scope_body(start))
        } else {
            self.parse_definition()?;
            Some(self.node_for_range(start, None))
        }
    }

    /// `template < parameter-list > declaration`, plus explicit
    /// instantiations (`template class X<int>;`), which are recognized
    /// and skipped.
    fn parse_template_decl(&mut self) -> Option<PNodeId> {
        let start = self.cursor.position();
        let line = self.line();
        self.cursor.eat(TokenKind::KwTemplate)?;
        if !self.cursor.check(TokenKind::Lt) {
            // Explicit instantiation: no new declaration.
            self.commit();
            while !self.cursor.check(TokenKind::Semi) && !self.cursor.at_eof() {
                self.cursor.advance();
            }
            self.expect_semi();
            self.drop_comments();
            return Some(self.node_for_range(start, None));
        }
        self.commit();
        self.cursor.advance();
        self.builder
            .start_namespace(line, NamespaceKind::Template, None);
        let params = self.parse_template_params();
        let template = self.builder.create_template(Name::EMPTY, params);
        self.pending_template = Some(template);
        let inner = self.parse_definition();
        self.pending_template = None;
        self.builder.end_namespace();
        if inner.is_none() {
            if !self.syntax_error() {
                return None;
            }
            self.recover();
        }
        Some(self.node_for_range(start, None))
    }

    /// Formal template parameters, each declared as a `Dependent` type
    /// in the temporary template scope.
    fn parse_template_params(&mut self) -> Vec<TypeId> {
        let mut params = Vec::new();
        loop {
            match self.cursor.kind() {
                TokenKind::Gt => {
                    self.cursor.advance();
                    return params;
                }
                TokenKind::Eof => return params,
                TokenKind::KwClass | TokenKind::KwTypename => {
                    self.cursor.advance();
                    let name = match self.cursor.kind() {
                        TokenKind::Ident(name) => {
                            self.cursor.advance();
                            name
                        }
                        _ => self.interner.intern("`anon"),
                    };
                    params.push(self.builder.create_dependent(name));
                    self.skip_template_default();
                }
                _ => {
                    // Non-type parameter: `int N = 4`.
                    let value = self.tentative(|p| {
                        let spec = p.opt_type_specifier()?;
                        p.opt_declarator(&spec, DeclaratorKind::Arg)
                    });
                    match value {
                        Some(declarator) => {
                            let name = declarator
                                .name
                                .as_ref()
                                .and_then(|n| n.last().copied())
                                .unwrap_or_else(|| self.interner.intern("`anon"));
                            params.push(self.builder.create_dependent(name));
                            self.skip_template_default();
                        }
                        None => {
                            self.cursor.advance();
                        }
                    }
                }
            }
            if self.cursor.check(TokenKind::Comma) {
                self.cursor.advance();
            }
        }
    }

    /// Skip a `= default` in a template parameter, angle-depth aware.
    fn skip_template_default(&mut self) {
        if !self.cursor.check(TokenKind::Assign) {
            return;
        }
        self.cursor.advance();
        let mut depth = 0usize;
        loop {
            match self.cursor.kind() {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt if depth == 0 => return,
                TokenKind::Gt => depth -= 1,
                TokenKind::Comma if depth == 0 => return,
                TokenKind::Eof | TokenKind::Semi => return,
                _ => {}
            }
            self.cursor.advance();
        }
    }

    // ---- declarations --------------------------------------------------

    /// A declaration: storage specifiers, a type specifier, and a list
    /// of declarators, or a constructor/destructor declarator when no
    /// type specifier fits. `in_class` carries the enclosing class for
    /// member declarations.
    pub(crate) fn parse_declaration(&mut self, in_class: Option<DeclId>) -> Option<PNodeId> {
        let start = self.cursor.position();
        let line = self.line();

        let mut premod: Vec<Name> = Vec::new();
        while self.cursor.kind().is_storage_spec() {
            let spelling = self.cursor.kind().fixed_spelling().unwrap_or("");
            premod.push(self.interner.intern(spelling));
            self.cursor.advance();
        }

        // Try the type-specifier form first; `C::C(...)` and friends
        // consume a plausible specifier before the declarator gives the
        // game away, so the whole attempt must roll back together.
        let with_spec = self.tentative(|p| {
            let spec = p.opt_type_specifier()?;
            p.parse_declarators(start, line, premod.clone(), spec, in_class)
        });
        if with_spec.is_some() {
            return with_spec;
        }

        // No usable type specifier: constructor, destructor, or nothing.
        self.tentative(|p| p.parse_constructor_decl(start, line, premod, in_class))
    }

    fn parse_declarators(
        &mut self,
        start: usize,
        line: u32,
        premod: Vec<Name>,
        spec: TypeSpec,
        in_class: Option<DeclId>,
    ) -> Option<PNodeId> {
        // `class X;` / `class X { ... };` / `int;`
        if self.cursor.check(TokenKind::Semi) {
            self.commit();
            let comments = self.pending_comments(start);
            if let Some(forward) = &spec.forward {
                let template = self.pending_template.take();
                if let Some(&name) = forward.last() {
                    let decl = self.builder.add_forward(line, name, template);
                    self.builder.add_comments(decl, comments);
                }
            } else if let Some(defined) = spec.defined {
                self.builder.add_comments(defined, comments);
            }
            self.cursor.advance();
            return Some(self.node_for_range(start, Some(spec.enc)));
        }

        let mut declarators = Vec::new();
        loop {
            let declarator = self.opt_declarator(&spec, DeclaratorKind::Normal)?;
            declarators.push(declarator);
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        if self.cursor.check(TokenKind::Semi) {
            self.commit();
            let comments = self.pending_comments(start);
            for declarator in &declarators {
                self.commit_declarator(&premod, &spec, declarator, line, &comments)?;
            }
            self.cursor.advance();
            let enc = declarators
                .first()
                .map(|d| d.enc.clone())
                .unwrap_or_else(|| spec.enc.clone());
            return Some(self.node_for_range(start, Some(enc)));
        }

        // A single function declarator followed by a body (or a
        // constructor initializer list).
        if declarators.len() == 1
            && declarators[0].is_function
            && matches!(self.cursor.kind(), TokenKind::LBrace | TokenKind::Colon)
        {
            self.commit();
            let comments = self.pending_comments(start);
            let declarator = declarators.remove(0);
            let (_, params) =
                self.commit_declarator(&premod, &spec, &declarator, line, &comments)?;
            self.skip_member_initializers();
            let names = declarator.name.as_ref()?;
            let real = self.real_function_name(names);
            self.handle_function_body(real, names, params, in_class)?;
            return Some(self.node_for_range(start, Some(declarator.enc.clone())));
        }

        None
    }

    /// `X(args)`, `X::X(args)`, `~X()`, `X::~X()` — declarators with no
    /// return type. Only recognized where the name proves the form: the
    /// unqualified spelling must name the enclosing class.
    fn parse_constructor_decl(
        &mut self,
        start: usize,
        line: u32,
        premod: Vec<Name>,
        in_class: Option<DeclId>,
    ) -> Option<PNodeId> {
        let mut name_enc = Encoding::new();
        let names = self.opt_name(&mut name_enc)?;
        let last = *names.last()?;
        let text = self.interner.resolve(last);
        let plain = text.strip_prefix('~').unwrap_or(text);
        let plain_name = self.interner.intern(plain);

        let is_ctor_shaped = match in_class {
            Some(_) => self.is_constructor_name(plain_name),
            None => {
                names.len() >= 2
                    && names[names.len() - 2] == plain_name
            }
        };
        if !is_ctor_shaped || !self.cursor.check(TokenKind::LParen) {
            return None;
        }

        self.cursor.advance();
        let (param_specs, args_enc) = self.opt_arg_decl_list()?;
        self.cursor.eat(TokenKind::RParen)?;

        // Committed once the declarator shape is complete and a valid
        // terminator follows.
        let terminator = self.cursor.kind();
        if !matches!(
            terminator,
            TokenKind::Semi | TokenKind::LBrace | TokenKind::Colon
        ) {
            return None;
        }
        self.commit();
        let comments = self.pending_comments(start);
        let params = self.decode_params(&param_specs, line);
        // An out-of-line `C::C` was declared at class scope already;
        // reuse it rather than redeclaring the class's own name.
        if names.len() > 1 {
            if self.find_declared_function(&names, last).is_none() {
                tracing::debug!(
                    name = %self.interner.join(&names),
                    "qualified constructor without a prior declaration"
                );
            }
        } else {
            let template = self.pending_template.take();
            let decl = self.builder.add_function(
                line,
                premod,
                TypeId::INVALID,
                Vec::new(),
                last,
                &args_enc,
                params.clone(),
                template,
                false,
            );
            self.builder.add_comments(decl, comments);
        }

        match terminator {
            TokenKind::Semi => {
                self.cursor.advance();
            }
            _ => {
                self.skip_member_initializers();
                self.handle_function_body(last, &names, params, in_class)?;
            }
        }
        let mut enc = Encoding::new();
        enc.start_function(&{
            let mut r = Encoding::new();
            r.no_return_type();
            r
        });
        enc.append(&args_enc);
        enc.end_function();
        Some(self.node_for_range(start, Some(enc)))
    }

    /// `: member(init), ...` before a constructor body — recognized and
    /// skipped.
    fn skip_member_initializers(&mut self) {
        if !self.cursor.check(TokenKind::Colon) {
            return;
        }
        while !matches!(
            self.cursor.kind(),
            TokenKind::LBrace | TokenKind::Semi | TokenKind::Eof
        ) {
            self.cursor.advance();
        }
    }

    /// Parse a function body now, or defer it to class close for
    /// members.
    fn handle_function_body(
        &mut self,
        real: Name,
        names: &ScopedName,
        params: Vec<Parameter>,
        in_class: Option<DeclId>,
    ) -> Option<()> {
        if let Some(class) = in_class {
            let (body_start, _) = self.cursor.skip_brace_block()?;
            self.deferred.push(DeferredBody {
                func_name: real,
                params,
                body_start,
                class,
            });
            return Some(());
        }
        // Out-of-line member definitions resolve against the scope the
        // function was declared in.
        let enclosing = self.enclosing_scope_of(names);
        let line = self.line();
        self.builder.start_function_impl(line, real, enclosing);
        for param in &params {
            if !param.name.is_empty() {
                self.builder.add_variable(line, param.name, param.ptype, false);
            }
        }
        let method_class =
            enclosing.filter(|&scope| self.builder.decls().get(scope).as_class().is_some());
        self.builder.add_this_variable(line, method_class);
        let ok = self.parse_compound_statement();
        self.builder.end_function_impl();
        if ok.is_none() {
            // The body failed to parse; drop it but keep the
            // declaration.
            if self.syntax_error() {
                self.recover();
            }
        }
        Some(())
    }

    /// Declare one recognized declarator. Returns the declaration and
    /// its decoded parameters (empty for non-functions).
    fn commit_declarator(
        &mut self,
        premod: &[Name],
        spec: &TypeSpec,
        declarator: &Declarator,
        line: u32,
        comments: &[Comment],
    ) -> Option<(DeclId, Vec<Parameter>)> {
        let names = declarator.name.as_ref()?;
        let last = *names.last()?;

        if declarator.is_function {
            let real = self.real_function_name(names);
            let params = self.decode_params(&declarator.params, line);
            if names.len() > 1 {
                // Out-of-line definition: the member was declared at
                // class scope; find it rather than redeclare it.
                if let Some(existing) = self.find_declared_function(names, real) {
                    return Some((existing, params));
                }
            }
            let ret = match &declarator.ret_enc {
                Some(enc) => self.decode_enc(enc, line),
                None => TypeId::INVALID,
            };
            let is_operator = self.interner.resolve(real).starts_with("operator");
            let template = self.pending_template.take();
            let decl = self.builder.add_function(
                line,
                premod.to_vec(),
                ret,
                declarator.postmod.clone(),
                real,
                &declarator.args_enc,
                params.clone(),
                template,
                is_operator,
            );
            self.builder.add_comments(decl, comments.to_vec());
            Some((decl, params))
        } else {
            let ty = self.decode_enc(&declarator.enc, line);
            let decl = if spec.is_const && declarator.value.is_some() {
                let value = declarator.value.unwrap_or(Name::EMPTY);
                self.builder.add_constant(line, last, ty, value)
            } else {
                self.builder
                    .add_variable(line, last, ty, declarator.constructed)
            };
            self.builder.add_comments(decl, comments.to_vec());
            Some((decl, Vec::new()))
        }
    }

    /// The unqualified function name for scope naming and dictionary
    /// real-name entry.
    fn real_function_name(&self, names: &ScopedName) -> Name {
        names.last().copied().unwrap_or(Name::EMPTY)
    }

    /// Scope named by the qualified prefix of an out-of-line definition.
    pub(crate) fn enclosing_scope_of(&self, names: &ScopedName) -> Option<DeclId> {
        if names.len() < 2 {
            return None;
        }
        let prefix: ScopedName = names[..names.len() - 1].iter().copied().collect();
        let ty = self.resolve_scoped(&prefix, false)?;
        let followed = self.builder.lookup().follow_typedef(ty);
        let decl = self.builder.types().get(followed).as_declared()?;
        self.builder.decls().get(decl).is_scope().then_some(decl)
    }

    /// Find a function already declared in the scope a qualified name
    /// points into.
    fn find_declared_function(&self, names: &ScopedName, real: Name) -> Option<DeclId> {
        let scope = self.enclosing_scope_of(names)?;
        let lookup = self.builder.lookup();
        let info = lookup.info_of(scope)?;
        let mut functions = Vec::new();
        lookup.find_functions(real, info, &mut functions);
        functions.first().copied()
    }

    // ---- class and enum specifiers -------------------------------------

    /// Elaborated specifier: `class-key name`, optionally with bases and
    /// a body, or `enum name { ... }`. Returns `(defined, forward)` for
    /// the type specifier.
    pub(crate) fn parse_elaborated_spec(
        &mut self,
        enc: &mut Encoding,
    ) -> Option<(Option<DeclId>, Option<ScopedName>)> {
        let start = self.cursor.position();
        let line = self.line();
        let key = match self.cursor.kind() {
            TokenKind::KwClass => ClassKey::Class,
            TokenKind::KwStruct => ClassKey::Struct,
            TokenKind::KwUnion => ClassKey::Union,
            TokenKind::KwEnum => {
                self.cursor.advance();
                return self.parse_enum_spec(enc, start, line);
            }
            _ => return None,
        };
        self.cursor.advance();

        let name_path = if matches!(
            self.cursor.kind(),
            TokenKind::Ident(_) | TokenKind::Scope
        ) {
            let mut scratch = Encoding::new();
            self.opt_name(&mut scratch)
        } else {
            None
        };
        let name = match &name_path {
            Some(path) => *path.last()?,
            None => self
                .interner
                .intern(&format!("`{}{}", key.spelling(), line)),
        };
        enc.simple_name(self.interner.resolve(name));

        // Base clause, recognized purely before the body commits.
        let mut bases: Vec<(Mods, ScopedName)> = Vec::new();
        if self.cursor.check(TokenKind::Colon) {
            self.cursor.advance();
            loop {
                let mut attrs: Mods = smallvec![];
                loop {
                    let spelling = match self.cursor.kind() {
                        TokenKind::KwVirtual => "virtual",
                        TokenKind::KwPublic => "public",
                        TokenKind::KwProtected => "protected",
                        TokenKind::KwPrivate => "private",
                        _ => break,
                    };
                    attrs.push(self.interner.intern(spelling));
                    self.cursor.advance();
                }
                let mut scratch = Encoding::new();
                let base = self.opt_name(&mut scratch)?;
                bases.push((attrs, base));
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        if self.cursor.check(TokenKind::LBrace) {
            // class-key identifier { — the grammar choice is proven.
            self.commit();
            let template = self.pending_template.take();
            let class = self.builder.start_class(line, key, name, template);
            // Leading comments belong to the class, not its first
            // member.
            let comments = self.pending_comments(start);
            self.builder.add_comments(class, comments);
            for (attrs, base) in bases {
                let ty = self.builder.lookup_scoped_or_unknown(&base, line, false);
                self.builder.add_inheritance(ty, attrs);
            }
            self.builder.update_base_search();
            self.parse_class_body(class);
            self.builder.end_class();
            Some((Some(class), None))
        } else if bases.is_empty() {
            let forward = name_path.unwrap_or_else(|| sable_ir::scoped(name));
            Some((None, Some(forward)))
        } else {
            None
        }
    }

    /// Class body, two phases: members scanned with function bodies
    /// deferred, then the deferred bodies replayed with every member
    /// visible.
    fn parse_class_body(&mut self, class: DeclId) {
        let deferred_mark = self.deferred.len();
        self.cursor.eat(TokenKind::LBrace);
        loop {
            match self.cursor.kind() {
                TokenKind::RBrace => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::KwPublic | TokenKind::KwProtected | TokenKind::KwPrivate
                    if self.cursor.nth(1) == TokenKind::Colon =>
                {
                    let access = match self.cursor.kind() {
                        TokenKind::KwPublic => sable_ir::Access::Public,
                        TokenKind::KwProtected => sable_ir::Access::Protected,
                        _ => sable_ir::Access::Private,
                    };
                    self.cursor.advance();
                    self.cursor.advance();
                    self.builder.set_access(access);
                }
                TokenKind::Semi => {
                    self.cursor.advance();
                }
                TokenKind::KwFriend => {
                    // Friends do not declare members; skip the whole
                    // declaration.
                    while !matches!(
                        self.cursor.kind(),
                        TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof
                    ) {
                        self.cursor.advance();
                    }
                    self.cursor.eat(TokenKind::Semi);
                    self.drop_comments();
                }
                TokenKind::KwTypedef => {
                    if self.parse_typedef().is_none() && self.member_error() {
                        break;
                    }
                }
                TokenKind::KwUsing => {
                    if self.parse_using().is_none() && self.member_error() {
                        break;
                    }
                }
                TokenKind::KwTemplate => {
                    if self.parse_template_decl().is_none() && self.member_error() {
                        break;
                    }
                }
                _ => {
                    if self.parse_declaration(Some(class)).is_none() && self.member_error() {
                        break;
                    }
                }
            }
        }

        // Phase two: replay deferred member bodies now that the whole
        // class is in the dictionary.
        let resume = self.cursor.position();
        let bodies: Vec<DeferredBody> = self.deferred.split_off(deferred_mark);
        for body in bodies {
            self.replay_member_body(body);
        }
        self.cursor.set_position(resume);
    }

    /// Report a member-level syntax error and resynchronize. Returns
    /// `true` when the error budget is gone and the class parse should
    /// stop.
    fn member_error(&mut self) -> bool {
        if !self.syntax_error() {
            return true;
        }
        self.recover();
        false
    }

    fn replay_member_body(&mut self, body: DeferredBody) {
        self.cursor.set_position(body.body_start);
        let line = self.line();
        self.builder
            .start_function_impl(line, body.func_name, Some(body.class));
        for param in &body.params {
            if !param.name.is_empty() {
                self.builder
                    .add_variable(line, param.name, param.ptype, false);
            }
        }
        self.builder.add_this_variable(line, Some(body.class));
        let ok = self.parse_compound_statement();
        self.builder.end_function_impl();
        if ok.is_none() {
            tracing::debug!(line, "deferred member body failed to parse");
        }
    }

    /// `enum name? { enumerator (, enumerator)* }` — the cursor sits
    /// just past the `enum` keyword.
    fn parse_enum_spec(
        &mut self,
        enc: &mut Encoding,
        start: usize,
        line: u32,
    ) -> Option<(Option<DeclId>, Option<ScopedName>)> {
        let name = match self.cursor.kind() {
            TokenKind::Ident(name) => {
                self.cursor.advance();
                name
            }
            _ => self.interner.intern(&format!("`enum{line}")),
        };
        enc.simple_name(self.interner.resolve(name));

        if !self.cursor.check(TokenKind::LBrace) {
            return Some((None, Some(sable_ir::scoped(name))));
        }
        self.commit();
        let comments = self.pending_comments(start);
        self.cursor.advance();
        let mut enumerators: Vec<(Name, Name, u32)> = Vec::new();
        loop {
            match self.cursor.kind() {
                TokenKind::RBrace => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Ident(ename) => {
                    let eline = self.line();
                    self.cursor.advance();
                    let value = if self.cursor.eat(TokenKind::Assign).is_some() {
                        let start = self.cursor.position();
                        while !matches!(
                            self.cursor.kind(),
                            TokenKind::Comma | TokenKind::RBrace | TokenKind::Eof
                        ) {
                            self.cursor.advance();
                        }
                        let text = self.spell_tokens(start, self.cursor.position());
                        self.interner.intern(&text)
                    } else {
                        Name::EMPTY
                    };
                    enumerators.push((ename, value, eline));
                    self.cursor.eat(TokenKind::Comma);
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
        let decl = self.builder.add_enum(line, name, enumerators);
        self.builder.add_comments(decl, comments);
        Some((Some(decl), None))
    }

    // ---- helpers -------------------------------------------------------

    /// Decode an encoding into the type graph, in a committed context.
    pub(crate) fn decode_enc(&mut self, enc: &Encoding, line: u32) -> TypeId {
        let mut decoder = Decoder::new(enc, line, &mut self.builder);
        decoder.decode_type().unwrap_or(TypeId::INVALID)
    }

    /// Decode parameter specs into concrete parameters. A solitary
    /// `void` parameter means an empty list.
    pub(crate) fn decode_params(
        &mut self,
        specs: &[crate::grammar::ParamSpec],
        line: u32,
    ) -> Vec<Parameter> {
        let mut params = Vec::with_capacity(specs.len());
        for spec in specs {
            let ptype = self.decode_enc(&spec.enc, line);
            params.push(Parameter {
                premod: Mods::new(),
                ptype,
                name: spec.name,
                value: spec.value,
            });
        }
        if params.len() == 1 && params[0].name.is_empty() {
            if let Type::Base { name } = self.builder.types().get(params[0].ptype) {
                if name.len() == 1 && self.interner.resolve(name[0]) == "void" {
                    params.clear();
                }
            }
        }
        params
    }

    /// Comments preceding the declaration that starts at `start`.
    pub(crate) fn pending_comments(&mut self, start: usize) -> Vec<Comment> {
        let comments = self.cursor.comments_between(self.comment_mark, start + 1);
        self.comment_mark = self.cursor.position();
        comments
    }

    fn expect_semi(&mut self) {
        if self.cursor.eat(TokenKind::Semi).is_none() {
            tracing::trace!(line = self.line(), "missing `;`");
        }
    }

    /// Build the flat list/atom node covering tokens `start..cursor`.
    pub(crate) fn node_for_range(&mut self, start: usize, enc: Option<Encoding>) -> PNodeId {
        let end = self.cursor.position();
        let mut children = Vec::with_capacity(end.saturating_sub(start));
        for pos in start..end {
            let token = self.cursor.token_at(pos);
            children.push(self.ptree.atom(token));
        }
        match enc {
            Some(enc) => self.ptree.list_with(children, enc),
            None => self.ptree.list(children),
        }
    }
}
