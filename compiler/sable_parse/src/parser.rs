//! Parser state and the tentative-transaction machinery.
//!
//! Shared mutable state is exactly: the cursor position, the scope stack
//! (inside the builder), the qualifying-scope/last-symbol pair, and the
//! in-progress encodings. Grammar code mutates all of it only through the
//! snapshot/commit protocol here, which is what gives failed speculative
//! attempts byte-for-byte rollback.
//!
//! The discipline the grammar follows: *recognize purely, declare on
//! commit*. A production first parses into encodings and token ranges
//! (symbol-table queries are read-only), and only after the surrounding
//! grammar choice is proven does it call into the builder. `commit()`
//! irrevocably disables rollback for every enclosing tentative region, so
//! a failure after a commit surfaces as a real syntax error instead of a
//! silent alternative.

use crate::{Cursor, PNodeId, PTree};
use sable_diagnostic::Diagnostic;
use sable_ir::{DeclId, Name, ScopedName, StringInterner, TokenKind, TokenList, TypeId};
use sable_lexer::LineMap;
use sable_resolve::Builder;

/// Snapshot of the rollback-relevant parser state.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Snapshot {
    pos: usize,
    qual_scope: Option<DeclId>,
    last_symbol: Option<TypeId>,
    ptree_len: usize,
    serial: u64,
}

pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) builder: Builder<'a>,
    pub(crate) interner: &'a StringInterner,
    pub(crate) line_map: &'a LineMap,
    pub(crate) ptree: PTree,
    /// Scope named by the qualified-name prefix being parsed, if any.
    pub(crate) qual_scope: Option<DeclId>,
    /// Most recently resolved symbol.
    pub(crate) last_symbol: Option<TypeId>,
    /// Bumped by `commit()`; tentative regions opened before the bump
    /// no longer roll back.
    serial: u64,
    /// Token index up to which comments have been attached.
    pub(crate) comment_mark: usize,
    /// Template type built by an enclosing `template<...>` head, waiting
    /// for the declaration that owns it.
    pub(crate) pending_template: Option<TypeId>,
    /// Member function bodies awaiting replay at class close.
    pub(crate) deferred: Vec<crate::grammar::DeferredBody>,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: &'a TokenList,
        line_map: &'a LineMap,
        interner: &'a StringInterner,
    ) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            builder: Builder::new(interner, line_map.file()),
            interner,
            line_map,
            ptree: PTree::new(),
            qual_scope: None,
            last_symbol: None,
            serial: 0,
            comment_mark: 0,
            pending_template: None,
            deferred: Vec::new(),
        }
    }

    // ---- tentative regions ---------------------------------------------

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.cursor.position(),
            qual_scope: self.qual_scope,
            last_symbol: self.last_symbol,
            ptree_len: self.ptree.len(),
            serial: self.serial,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.cursor.set_position(snapshot.pos);
        self.qual_scope = snapshot.qual_scope;
        self.last_symbol = snapshot.last_symbol;
        self.ptree.truncate(snapshot.ptree_len);
    }

    /// Commit the current grammar choice: no enclosing tentative region
    /// opened before this point will roll back anymore.
    pub(crate) fn commit(&mut self) {
        self.serial += 1;
    }

    /// Attempt a production speculatively. On failure the parser state is
    /// restored — unless the attempt committed, in which case the failure
    /// is real and propagates without rollback.
    pub(crate) fn tentative<T>(
        &mut self,
        attempt: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        let snapshot = self.snapshot();
        match attempt(self) {
            Some(value) => Some(value),
            None => {
                if self.serial == snapshot.serial {
                    self.restore(snapshot);
                }
                None
            }
        }
    }

    // ---- positions and diagnostics -------------------------------------

    /// Source line of the current token.
    pub(crate) fn line(&self) -> u32 {
        self.line_map.line_of(self.cursor.current().span.start)
    }

    /// Report a syntax error at the current token. Returns `false` once
    /// the error budget is exhausted and the parse should stop.
    pub(crate) fn syntax_error(&mut self) -> bool {
        let token = self.cursor.current();
        let line = self.line_map.line_of(token.span.start);
        let spelling = match token.kind {
            TokenKind::Ident(name)
            | TokenKind::IntLit(name)
            | TokenKind::FloatLit(name)
            | TokenKind::CharLit(name)
            | TokenKind::StringLit(name) => self.interner.resolve(name),
            kind => kind.fixed_spelling().unwrap_or("<token>"),
        };
        let file = self.builder.file();
        self.builder.sink_mut().report(Diagnostic::syntax(
            file,
            line,
            format!("syntax error before `{spelling}`"),
        ))
    }

    /// Skip to a likely declaration boundary: past the next `;`, or past
    /// a closing `}`.
    pub(crate) fn recover(&mut self) {
        loop {
            match self.cursor.kind() {
                TokenKind::Semi | TokenKind::RBrace => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::Eof => return,
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

    /// Comments accumulated since the last attachment point.
    pub(crate) fn take_comments(&mut self) -> Vec<sable_ir::Comment> {
        let here = self.cursor.position();
        let comments = self.cursor.comments_between(self.comment_mark, here);
        self.comment_mark = here;
        comments
    }

    /// Advance the comment attachment mark without collecting, dropping
    /// comments that belong to constructs we do not document.
    pub(crate) fn drop_comments(&mut self) {
        self.comment_mark = self.cursor.position();
    }

    // ---- read-only resolution points -----------------------------------

    /// Resolve an unqualified name in the current scope without side
    /// effects.
    pub(crate) fn resolve_unqualified(&self, name: Name, allow_func: bool) -> Option<TypeId> {
        let info = self.builder.scope_info();
        let search = &self.builder.infos()[info.index()].search;
        self.builder.lookup().unqualified(name, search, allow_func)
    }

    /// Resolve a possibly qualified name without side effects. Returns
    /// `None` when any component fails to resolve.
    pub(crate) fn resolve_scoped(&self, names: &ScopedName, allow_func: bool) -> Option<TypeId> {
        let lookup = self.builder.lookup();
        match names.as_slice() {
            [] => None,
            [single] if !single.is_empty() => self.resolve_unqualified(*single, allow_func),
            components => {
                let mut ty = if components[0].is_empty() {
                    self.builder.decls().get(self.builder.global()).declared()?
                } else {
                    self.resolve_unqualified(components[0], false)?
                };
                for (idx, &component) in components.iter().enumerate().skip(1) {
                    let is_last = idx == components.len() - 1;
                    let target = lookup.follow_typedef(ty);
                    let decl = self.builder.types().get(target).as_declared()?;
                    let info = lookup.info_of(decl)?;
                    ty = lookup.qualified(component, info, allow_func && is_last)?;
                }
                Some(ty)
            }
        }
    }

    /// Is this identifier a *type-name* in the current scope? Unknown
    /// placeholders count: a documentation front end keeps parsing
    /// headers whose dependencies it never saw.
    pub(crate) fn is_type_name(&self, name: Name) -> bool {
        match self.resolve_unqualified(name, false) {
            Some(ty) => self.names_a_type(ty),
            None => false,
        }
    }

    pub(crate) fn names_a_type(&self, ty: TypeId) -> bool {
        use sable_ir::{DeclKind, Type};
        match self.builder.types().get(ty) {
            Type::Base { .. } | Type::Unknown { .. } | Type::Dependent { .. } => true,
            Type::Template { .. } => true,
            Type::Declared { decl, .. } => matches!(
                self.builder.decls().get(*decl).kind,
                DeclKind::Class(_)
                    | DeclKind::ClassTemplate { .. }
                    | DeclKind::Enum { .. }
                    | DeclKind::Typedef { .. }
                    | DeclKind::Forward { .. }
            ),
            _ => false,
        }
    }

    /// Is this identifier a *class-name* (following typedefs)?
    pub(crate) fn is_class_name(&self, name: Name) -> bool {
        self.resolve_unqualified(name, false)
            .and_then(|ty| self.builder.lookup().as_class_decl(ty))
            .is_some()
    }

    /// Is this identifier a *template-name* (class or function template)?
    pub(crate) fn is_template_name(&self, name: Name) -> bool {
        use sable_ir::{DeclKind, Type};
        match self.resolve_unqualified(name, true) {
            Some(ty) => match self.builder.types().get(ty) {
                Type::Template { .. } => true,
                Type::Declared { decl, .. } => matches!(
                    self.builder.decls().get(*decl).kind,
                    DeclKind::ClassTemplate { .. }
                        | DeclKind::Forward { template: Some(_) }
                ),
                _ => false,
            },
            None => false,
        }
    }

    /// Is this identifier a *namespace-name*?
    pub(crate) fn is_namespace_name(&self, name: Name) -> bool {
        use sable_ir::DeclKind;
        match self.resolve_unqualified(name, false) {
            Some(ty) => match self.builder.types().get(ty).as_declared() {
                Some(decl) => matches!(
                    self.builder.decls().get(decl).kind,
                    DeclKind::Namespace { .. }
                ),
                None => false,
            },
            None => false,
        }
    }

    /// Does this unqualified identifier name the enclosing class — i.e.
    /// is a declarator starting with it a *constructor-declarator*?
    pub(crate) fn is_constructor_name(&self, name: Name) -> bool {
        self.builder
            .current_class()
            .is_some_and(|class| self.builder.decls().get(class).last_name() == name)
    }

    /// Atom node for the current token, consuming it.
    pub fn atom(&mut self) -> PNodeId {
        let token = self.cursor.advance();
        self.ptree.atom(token)
    }
}
