//! The symbol-table builder.
//!
//! The builder owns the declaration and type arenas, the scope-info arena,
//! and the live scope stack, and is the only component that mutates any of
//! them. The parser calls in at every declaration point; everything else
//! (lookup, overload resolution, decoding) reads through the views the
//! builder hands out.
//!
//! Scope lifecycle: a scope/info pair is created the first time a scope is
//! opened and never destroyed while the parse is active. Reopened named
//! namespaces and class definitions completing a forward declaration find
//! and reuse the existing scope through the info cache.

use crate::{Dictionary, InfoId, Lookup, ScopeInfo};
use rustc_hash::FxHashMap;
use sable_diagnostic::{Diagnostic, DiagnosticSink};
use sable_ir::{
    scoped, Access, ClassData, ClassKey, Comment, DeclArena, DeclId, DeclKind, Declaration,
    Encoding, FunctionData, Mods, Name, NamespaceFlavor, Parameter, ScopeData, ScopedName,
    StringInterner, Type, TypeArena, TypeId,
};
use smallvec::smallvec;

/// How a namespace-like scope is being opened.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NamespaceKind {
    /// `namespace N { ... }` — reopens an existing `N` when visible.
    Named,
    /// `namespace { ... }` — named after the source file.
    Anonymous,
    /// A synthesized block scope; the name is the block kind (`if`, ...).
    Unique,
    /// Holds template formal parameters until the templated declaration
    /// swallows them.
    Template,
}

/// The symbol-table builder. See the module docs.
pub struct Builder<'i> {
    interner: &'i StringInterner,
    decls: DeclArena,
    types: TypeArena,
    infos: Vec<ScopeInfo>,
    info_map: FxHashMap<DeclId, InfoId>,
    /// Live scope stack; bottom is the global scope.
    stack: Vec<InfoId>,
    global: DeclId,
    file: Name,
    /// Cache for built-in (`Base`) types, keyed by name.
    base_types: FxHashMap<Name, TypeId>,
    builtins: Vec<DeclId>,
    sink: DiagnosticSink,
}

impl<'i> Builder<'i> {
    /// Create a builder with a fresh global scope seeded with the builtin
    /// declarations (`__null_t`, `true`, `false`).
    pub fn new(interner: &'i StringInterner, file: Name) -> Self {
        let mut decls = DeclArena::new();
        let global = decls.alloc(Declaration::new(
            ScopedName::new(),
            file,
            0,
            DeclKind::Namespace {
                flavor: NamespaceFlavor::Named,
                scope: ScopeData::default(),
            },
        ));
        let mut builder = Builder {
            interner,
            decls,
            types: TypeArena::new(),
            infos: Vec::new(),
            info_map: FxHashMap::default(),
            stack: Vec::new(),
            global,
            file,
            base_types: FxHashMap::default(),
            builtins: Vec::new(),
            sink: DiagnosticSink::new(),
        };
        let global_info = builder.find_info(global);
        builder.stack.push(global_info);
        // Read-only consumers need the global scope's wrapper type to
        // exist up front.
        builder.declared_type(global);
        builder.seed_builtins();
        builder
    }

    fn seed_builtins(&mut self) {
        let null_t = self.interner.intern("__null_t");
        self.create_base(null_t);
        self.create_base(self.interner.intern("bool"));
        let names = [
            null_t,
            self.interner.intern("true"),
            self.interner.intern("false"),
        ];
        for name in names {
            let decl = self.decls.alloc(Declaration::new(
                scoped(name),
                self.file,
                0,
                DeclKind::Builtin,
            ));
            let ty = self.declared_type(decl);
            let top = self.top();
            self.info_mut(top).dict.insert(name, ty);
            self.builtins.push(decl);
        }
    }

    // ---- accessors -----------------------------------------------------

    #[inline]
    pub fn interner(&self) -> &'i StringInterner {
        self.interner
    }

    /// The current (innermost) scope declaration.
    pub fn scope(&self) -> DeclId {
        self.infos[self.top().index()].scope
    }

    /// The current scope's info id.
    #[inline]
    pub fn scope_info(&self) -> InfoId {
        self.top()
    }

    #[inline]
    pub fn global(&self) -> DeclId {
        self.global
    }

    #[inline]
    pub fn file(&self) -> Name {
        self.file
    }

    pub fn set_file(&mut self, file: Name) {
        self.file = file;
    }

    #[inline]
    pub fn decls(&self) -> &DeclArena {
        &self.decls
    }

    #[inline]
    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    #[inline]
    pub fn infos(&self) -> &[ScopeInfo] {
        &self.infos
    }

    pub fn builtin_decls(&self) -> &[DeclId] {
        &self.builtins
    }

    /// Diagnostic sink, for reporting and for the final output.
    pub fn sink_mut(&mut self) -> &mut DiagnosticSink {
        &mut self.sink
    }

    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// A read-only lookup view over the current symbol table.
    pub fn lookup(&self) -> Lookup<'_> {
        Lookup::new(
            &self.infos,
            &self.info_map,
            &self.decls,
            &self.types,
            self.interner,
        )
    }

    /// Consume the builder, yielding the arenas, diagnostics, and root.
    pub fn finish(self) -> BuilderOutput {
        BuilderOutput {
            decls: self.decls,
            types: self.types,
            root: self.global,
            diagnostics: self.sink,
        }
    }

    #[inline]
    fn top(&self) -> InfoId {
        *self.stack.last().expect("scope stack never empty")
    }

    #[inline]
    fn info(&self, id: InfoId) -> &ScopeInfo {
        &self.infos[id.index()]
    }

    #[inline]
    fn info_mut(&mut self, id: InfoId) -> &mut ScopeInfo {
        &mut self.infos[id.index()]
    }

    /// Find or create the cached info for a scope declaration.
    pub fn find_info(&mut self, scope: DeclId) -> InfoId {
        if let Some(&id) = self.info_map.get(&scope) {
            return id;
        }
        let id = InfoId::new(self.infos.len() as u32);
        let mut info = ScopeInfo::new(scope);
        info.search.push(id);
        self.infos.push(info);
        self.info_map.insert(scope, id);
        id
    }

    /// Info for a scope that has already been opened, if any.
    pub fn try_info(&self, scope: DeclId) -> Option<InfoId> {
        self.info_map.get(&scope).copied()
    }

    /// Current access level of the innermost scope.
    pub fn access(&self) -> Access {
        self.info(self.top()).access
    }

    /// Change the access level in effect for subsequent declarations.
    pub fn set_access(&mut self, access: Access) {
        let top = self.top();
        self.info_mut(top).access = access;
    }

    /// The nearest enclosing class on the scope stack, if any.
    pub fn current_class(&self) -> Option<DeclId> {
        self.stack.iter().rev().find_map(|&id| {
            let scope = self.info(id).scope;
            self.decls.get(scope).as_class().map(|_| scope)
        })
    }

    // ---- types ---------------------------------------------------------

    /// Cached built-in type.
    pub fn create_base(&mut self, name: Name) -> TypeId {
        if let Some(&ty) = self.base_types.get(&name) {
            return ty;
        }
        let ty = self.types.alloc(Type::Base { name: scoped(name) });
        self.base_types.insert(name, ty);
        ty
    }

    /// Speculative placeholder for an unresolved name. Reuses an existing
    /// placeholder of the same name in the current scope, so repeated
    /// failed lookups do not pile up duplicates.
    pub fn create_unknown(&mut self, name: ScopedName) -> TypeId {
        let last = *name.last().expect("unknown name never empty");
        let top = self.top();
        if let Ok(entries) = self.info(top).dict.lookup_multiple(last) {
            for &entry in entries {
                if let Type::Unknown { name: existing } = self.types.get(entry) {
                    if *existing == name {
                        return entry;
                    }
                }
            }
        }
        tracing::debug!(name = %self.interner.join(&name), "creating Unknown placeholder");
        let ty = self.types.alloc(Type::Unknown { name });
        self.info_mut(top).dict.insert(last, ty);
        ty
    }

    /// A template-parameter-dependent name, declared into the current
    /// (template) scope.
    pub fn create_dependent(&mut self, name: Name) -> TypeId {
        let ty = self.types.alloc(Type::Dependent { name: scoped(name) });
        let top = self.top();
        self.info_mut(top).dict.insert(name, ty);
        ty
    }

    /// A `Template` type for a not-yet-built declaration; patch the
    /// declaration in with [`patch_template_decl`](Self::patch_template_decl)
    /// once it exists.
    pub fn create_template(&mut self, name: Name, params: Vec<TypeId>) -> TypeId {
        self.types.alloc(Type::Template {
            name: scoped(name),
            decl: DeclId::INVALID,
            params,
        })
    }

    /// Point a `Template` type at its declaration, taking over the
    /// declaration's qualified name.
    pub fn patch_template_decl(&mut self, template: TypeId, decl: DeclId) {
        let qname = self.decls.get(decl).name.clone();
        if let Type::Template {
            name, decl: slot, ..
        } = self.types.get_mut(template)
        {
            *slot = decl;
            *name = qname;
        }
    }

    /// Allocate an arbitrary structural type.
    pub fn alloc_type(&mut self, ty: Type) -> TypeId {
        self.types.alloc(ty)
    }

    /// The memoized `Declared` wrapper for a declaration: created once,
    /// reused forever.
    pub fn declared_type(&mut self, decl: DeclId) -> TypeId {
        if let Some(ty) = self.decls.get(decl).declared() {
            return ty;
        }
        let name = self.decls.get(decl).name.clone();
        let ty = self.types.alloc(Type::Declared { name, decl });
        self.decls.get(decl).set_declared(ty);
        ty
    }

    /// Re-attempt resolution of an `Unknown`: if a concrete declaration
    /// now exists along the placeholder's qualified name, return it;
    /// otherwise hand the placeholder back.
    pub fn resolve_type(&mut self, ty: TypeId) -> TypeId {
        let Type::Unknown { name } = self.types.get(ty) else {
            return ty;
        };
        let name = name.clone();
        let mut scope = self.global;
        for component in &name[..name.len().saturating_sub(1)] {
            let Some(info) = self.try_info(scope) else {
                return ty;
            };
            let Ok(entry) = self.info(info).dict.lookup(*component) else {
                return ty;
            };
            let Some(decl) = self.types.get(entry).as_declared() else {
                return ty;
            };
            if !self.decls.get(decl).is_scope() {
                return ty;
            }
            scope = decl;
        }
        let last = *name.last().expect("unknown name never empty");
        let resolved = self
            .try_info(scope)
            .and_then(|info| self.info(info).dict.lookup(last).ok());
        match resolved {
            Some(found) if !self.types.get(found).is_unknown() => found,
            _ => ty,
        }
    }

    // ---- lookup wrappers (mutating on miss) ----------------------------

    /// Unqualified lookup that always succeeds: a miss produces an
    /// `Unknown` placeholder in the current scope.
    pub fn lookup_type_or_unknown(&mut self, name: Name, allow_func: bool) -> TypeId {
        let search = self.info(self.top()).search.clone();
        if let Some(found) = self.lookup().unqualified(name, &search, allow_func) {
            return found;
        }
        self.create_unknown(scoped(name))
    }

    /// Qualified lookup that always succeeds. Intermediate failures (a
    /// qualifying name that does not resolve, or resolves to a non-scope)
    /// are fatal lookup errors: reported, and an `Unknown` stands in so
    /// sibling declarations keep parsing.
    pub fn lookup_scoped_or_unknown(
        &mut self,
        names: &ScopedName,
        line: u32,
        allow_func: bool,
    ) -> TypeId {
        match names.as_slice() {
            [] => self.declared_type(self.global),
            [single] => self.lookup_type_or_unknown(*single, allow_func),
            _ => self.lookup_scoped_inner(names, line, allow_func),
        }
    }

    fn lookup_scoped_inner(
        &mut self,
        names: &ScopedName,
        line: u32,
        allow_func: bool,
    ) -> TypeId {
        // A leading empty component means the name was `::`-rooted.
        let mut ty = if names[0].is_empty() {
            self.declared_type(self.global)
        } else {
            self.lookup_type_or_unknown(names[0], false)
        };
        for (idx, component) in names.iter().enumerate().skip(1) {
            let is_last = idx == names.len() - 1;
            // Follow a typedef to its underlying scope.
            let target = self.follow_typedef(ty);
            let Some(scope_decl) = self.types.get(target).as_declared() else {
                return self.fail_qualified(names, line, idx);
            };
            if !self.decls.get(scope_decl).is_scope() {
                let rendered = self.interner.join(&self.decls.get(scope_decl).name);
                self.sink.report(Diagnostic::type_mismatch(
                    self.file,
                    line,
                    names.clone(),
                    &rendered,
                    "scope",
                ));
                return self.create_unknown(names.clone());
            }
            let info = self.find_info(scope_decl);
            let found = self
                .lookup()
                .qualified(*component, info, allow_func && is_last);
            match found {
                Some(found) => ty = found,
                None if is_last => return self.create_unknown(names.clone()),
                None => return self.fail_qualified(names, line, idx),
            }
        }
        ty
    }

    /// Report an unresolved qualifying prefix and substitute an `Unknown`.
    fn fail_qualified(&mut self, names: &ScopedName, line: u32, upto: usize) -> TypeId {
        let prefix: ScopedName = names[..=upto].iter().copied().collect();
        let rendered = self.interner.join(&prefix);
        self.sink
            .report(Diagnostic::undefined(self.file, line, prefix, &rendered));
        self.create_unknown(names.clone())
    }

    /// Follow a `Declared` typedef to the named type it aliases.
    pub fn follow_typedef(&self, ty: TypeId) -> TypeId {
        if !ty.is_valid() {
            return ty;
        }
        let mut current = ty;
        for _ in 0..16 {
            let Some(decl) = self.types.get(current).as_declared() else {
                return current;
            };
            let DeclKind::Typedef { alias, .. } = self.decls.get(decl).kind else {
                return current;
            };
            current = alias;
        }
        current
    }

    // ---- scopes --------------------------------------------------------

    /// Qualified name for a new declaration: the declaring scope's name
    /// plus the final component. A template-parameter scope on top of the
    /// stack does not qualify; its parent does.
    fn qualify(&self, name: Name) -> ScopedName {
        let scope = self.info(self.declaring_info()).scope;
        let mut qname = self.decls.get(scope).name.clone();
        qname.push(name);
        qname
    }

    fn current_search(&self) -> Vec<InfoId> {
        self.info(self.top()).search.clone()
    }

    /// True for scopes that exist for lookup only and record no
    /// documentation declarations.
    fn is_local(&self, info: InfoId) -> bool {
        matches!(
            self.decls.get(self.info(info).scope).kind,
            DeclKind::Namespace {
                flavor: NamespaceFlavor::Unique
                    | NamespaceFlavor::Template
                    | NamespaceFlavor::FunctionImpl,
                ..
            }
        )
    }

    /// The scope a new declaration lands in: the top of the stack, except
    /// that a template-parameter scope forwards to its parent.
    fn declaring_info(&self) -> InfoId {
        let top = self.top();
        let is_template_scope = matches!(
            self.decls.get(self.info(top).scope).kind,
            DeclKind::Namespace {
                flavor: NamespaceFlavor::Template,
                ..
            }
        );
        if is_template_scope && self.stack.len() >= 2 {
            self.stack[self.stack.len() - 2]
        } else {
            top
        }
    }

    /// Open a namespace-like scope. Returns the scope declaration, which
    /// may be an existing one for `Named`/`Anonymous` reopenings.
    pub fn start_namespace(&mut self, line: u32, kind: NamespaceKind, name: Option<Name>) -> DeclId {
        let (name, flavor, declare) = match kind {
            NamespaceKind::Named => (
                name.expect("named namespace requires a name"),
                NamespaceFlavor::Named,
                true,
            ),
            NamespaceKind::Anonymous => (self.file, NamespaceFlavor::Anonymous, true),
            NamespaceKind::Unique => {
                let kind_name = name.expect("unique namespace requires a block kind");
                let top = self.top();
                let n = self.info_mut(top).unique_count(kind_name);
                let text = self.interner.resolve(kind_name);
                let unique = if n == 1 {
                    self.interner.intern(&format!("`{text}"))
                } else {
                    self.interner.intern(&format!("`{text}{n}"))
                };
                (unique, NamespaceFlavor::Unique, false)
            }
            NamespaceKind::Template => {
                let top = self.top();
                let template = self.interner.intern("template");
                let n = self.info_mut(top).unique_count(template);
                (
                    self.interner.intern(&format!("`template{n}")),
                    NamespaceFlavor::Template,
                    false,
                )
            }
        };

        // Reopen an existing namespace of this name when one is visible.
        if declare {
            if let Some((decl, info)) = self.find_namespace_in_search(name) {
                self.stack.push(info);
                return decl;
            }
        }

        let decl = self.decls.alloc(Declaration::new(
            self.qualify(name),
            self.file,
            line,
            DeclKind::Namespace {
                flavor,
                scope: ScopeData::default(),
            },
        ));
        if declare {
            self.declare_with_keys(decl, &[name]);
        }
        let enclosing = self.current_search();
        let info = self.find_info(decl);
        self.info_mut(info).search.extend(enclosing);
        self.stack.push(info);
        decl
    }

    /// Close the current namespace-like scope.
    pub fn end_namespace(&mut self) {
        debug_assert!(self.stack.len() > 1, "cannot pop the global scope");
        self.stack.pop();
    }

    fn find_namespace_in_search(&mut self, name: Name) -> Option<(DeclId, InfoId)> {
        let search = self.current_search();
        for id in search {
            let probe = if self.info(id).is_using {
                self.info(id).target
            } else {
                id
            };
            let entries: Vec<TypeId> = match self.info(probe).dict.lookup_multiple(name) {
                Ok(entries) => entries.to_vec(),
                Err(_) => continue,
            };
            for entry in entries {
                if let Some(decl) = self.types.get(entry).as_declared() {
                    if matches!(self.decls.get(decl).kind, DeclKind::Namespace { .. }) {
                        let info = self.find_info(decl);
                        return Some((decl, info));
                    }
                }
            }
        }
        None
    }

    /// Open a class scope. A forward declaration or placeholder of the
    /// same name is superseded: its dictionary entries are retired so
    /// subsequent lookups see the concrete class.
    pub fn start_class(
        &mut self,
        line: u32,
        key: ClassKey,
        name: Name,
        template: Option<TypeId>,
    ) -> DeclId {
        let declaring = self.declaring_info();
        self.retire_placeholders(declaring, name);

        let data = ClassData {
            key,
            scope: ScopeData::default(),
            parents: Vec::new(),
        };
        let kind = match template {
            Some(template) => DeclKind::ClassTemplate { data, template },
            None => DeclKind::Class(data),
        };
        let decl = self
            .decls
            .alloc(Declaration::new(self.qualify(name), self.file, line, kind));
        if let Some(template) = template {
            self.patch_template_decl(template, decl);
        }
        self.declare_with_keys(decl, &[name]);

        let enclosing = self.current_search();
        let info = self.find_info(decl);
        self.info_mut(info).search.extend(enclosing);
        self.info_mut(info).access = key.default_access();
        self.stack.push(info);
        decl
    }

    /// Drop `Forward` and `Unknown` entries for `name` so the concrete
    /// class being declared wins subsequent lookups.
    fn retire_placeholders(&mut self, info: InfoId, name: Name) {
        let Ok(entries) = self.info(info).dict.lookup_multiple(name) else {
            return;
        };
        let keep: Vec<TypeId> = entries
            .iter()
            .copied()
            .filter(|&entry| match self.types.get(entry) {
                Type::Unknown { .. } => false,
                Type::Declared { decl, .. } => !matches!(
                    self.decls.get(*decl).kind,
                    DeclKind::Forward { .. }
                ),
                _ => true,
            })
            .collect();
        if keep.len() != entries.len() {
            let dict = &mut self.info_mut(info).dict;
            dict.remove(name);
            for entry in keep {
                dict.insert(name, entry);
            }
        }
    }

    /// Record the base-class list on the open class and rebuild its
    /// search list as `[self] ++ transitive bases (declaration order) ++
    /// enclosing search`.
    pub fn update_base_search(&mut self) {
        let top = self.top();
        let class = self.info(top).scope;
        debug_assert!(self.decls.get(class).as_class().is_some());

        // Everything after `self` in the current search is the enclosing
        // part seeded at start_class time.
        let enclosing: Vec<InfoId> = self.info(top).search[1..].to_vec();
        let mut bases = Vec::new();
        let mut seen = vec![class];
        self.add_class_bases(class, &mut bases, &mut seen);

        let search = &mut self.info_mut(top).search;
        search.truncate(1);
        search.extend(bases);
        search.extend(enclosing);
    }

    fn add_class_bases(&mut self, class: DeclId, out: &mut Vec<InfoId>, seen: &mut Vec<DeclId>) {
        let parents: Vec<TypeId> = match self.decls.get(class).as_class() {
            Some(data) => data.parents.iter().map(|i| i.parent).collect(),
            None => return,
        };
        for parent in parents {
            let target = self.follow_typedef(parent);
            let Some(decl) = self.types.get(target).as_declared() else {
                continue;
            };
            if self.decls.get(decl).as_class().is_none() || seen.contains(&decl) {
                continue;
            }
            seen.push(decl);
            let info = self.find_info(decl);
            out.push(info);
            self.add_class_bases(decl, out, seen);
        }
    }

    /// Record one base class on the open class.
    pub fn add_inheritance(&mut self, parent: TypeId, attributes: Mods) {
        let top = self.top();
        let class = self.info(top).scope;
        if let Some(data) = self.decls.get_mut(class).as_class_mut() {
            data.parents.push(sable_ir::Inheritance { parent, attributes });
        }
    }

    /// Close the current class scope.
    pub fn end_class(&mut self) {
        debug_assert!(self.stack.len() > 1, "cannot pop the global scope");
        self.stack.pop();
    }

    /// Open a function-body scope for local name resolution. The scope
    /// records no declarations; it is named after the function and its
    /// search extends the scope the function was declared in (`enclosing`
    /// when given, e.g. the class of an out-of-line member definition).
    pub fn start_function_impl(
        &mut self,
        line: u32,
        name: Name,
        enclosing: Option<DeclId>,
    ) -> DeclId {
        let decl = self.decls.alloc(Declaration::new(
            self.qualify(name),
            self.file,
            line,
            DeclKind::Namespace {
                flavor: NamespaceFlavor::FunctionImpl,
                scope: ScopeData::default(),
            },
        ));
        let seed = match enclosing.and_then(|scope| self.try_info(scope)) {
            Some(info) => self.info(info).search.clone(),
            None => self.current_search(),
        };
        let info = self.find_info(decl);
        self.info_mut(info).search.extend(seed);
        self.stack.push(info);
        decl
    }

    /// Close the current function-body scope.
    pub fn end_function_impl(&mut self) {
        debug_assert!(self.stack.len() > 1, "cannot pop the global scope");
        self.stack.pop();
    }

    // ---- declarations --------------------------------------------------

    /// Core declare: set access, append to the scope's declaration list
    /// (unless the scope is local), and insert into the dictionary under
    /// each key. Collisions with a non-overloadable concrete entry are
    /// reported and the duplicate entry is not inserted.
    fn declare_with_keys(&mut self, decl_id: DeclId, keys: &[Name]) -> TypeId {
        let info_id = self.declaring_info();
        let access = self.info(info_id).access;
        self.decls.get_mut(decl_id).access = access;

        if !self.is_local(info_id) {
            let scope_decl = self.info(info_id).scope;
            if let Some(scope) = self.decls.get_mut(scope_decl).as_scope_mut() {
                scope.declarations.push(decl_id);
            }
        }

        let ty = self.declared_type(decl_id);
        let overloadable = self.decls.get(decl_id).is_function();
        for &key in keys {
            if !overloadable {
                if let Some((first_file, first_line)) = self.concrete_conflict(info_id, key) {
                    let decl = self.decls.get(decl_id);
                    let rendered = self.interner.resolve(key).to_owned();
                    let (file, line) = (decl.file, decl.line);
                    let name = decl.name.clone();
                    self.sink.report(Diagnostic::already_defined(
                        file, line, name, &rendered, first_file, first_line,
                    ));
                    continue;
                }
            }
            self.info_mut(info_id).dict.insert(key, ty);
        }
        ty
    }

    /// An existing concrete, non-function entry under `key`, if any.
    /// Returns its definition site.
    fn concrete_conflict(&self, info: InfoId, key: Name) -> Option<(Name, u32)> {
        let entries = self.info(info).dict.lookup_multiple(key).ok()?;
        for &entry in entries {
            match self.types.get(entry) {
                Type::Unknown { .. } => continue,
                Type::Declared { decl, .. } => {
                    let existing = self.decls.get(*decl);
                    // Forward declarations and functions do not conflict.
                    if existing.is_function()
                        || matches!(
                            existing.kind,
                            DeclKind::Forward { .. } | DeclKind::Builtin
                        )
                    {
                        continue;
                    }
                    return Some((existing.file, existing.line));
                }
                _ => continue,
            }
        }
        None
    }

    /// Attach comments to a declaration.
    pub fn add_comments(&mut self, decl: DeclId, comments: Vec<Comment>) {
        self.decls.get_mut(decl).comments.extend(comments);
    }

    /// Declare a function or operator. The dictionary gets two keys: the
    /// signature-qualified name derived from the argument encoding, and
    /// the plain real name, so both encoded and human lookups succeed.
    #[allow(clippy::too_many_arguments)]
    pub fn add_function(
        &mut self,
        line: u32,
        premod: Vec<Name>,
        ret: TypeId,
        postmod: Vec<Name>,
        real_name: Name,
        args: &Encoding,
        params: Vec<Parameter>,
        template: Option<TypeId>,
        is_operator: bool,
    ) -> DeclId {
        let real_text = self.interner.resolve(real_name);
        let signature = self.interner.intern(&format!("{real_text}({args})"));
        let data = FunctionData {
            premod,
            ret,
            postmod,
            real_name,
            params,
            template,
        };
        let kind = if is_operator {
            DeclKind::Operation(data)
        } else {
            DeclKind::Function(data)
        };
        let decl = self.decls.alloc(Declaration::new(
            self.qualify(signature),
            self.file,
            line,
            kind,
        ));
        if let Some(template) = template {
            self.patch_template_decl(template, decl);
        }
        let keys = if signature == real_name {
            vec![signature]
        } else {
            vec![signature, real_name]
        };
        self.declare_with_keys(decl, &keys);
        decl
    }

    /// Declare a variable.
    pub fn add_variable(
        &mut self,
        line: u32,
        name: Name,
        vtype: TypeId,
        constructed: bool,
    ) -> DeclId {
        let decl = self.decls.alloc(Declaration::new(
            self.qualify(name),
            self.file,
            line,
            DeclKind::Variable { vtype, constructed },
        ));
        self.declare_with_keys(decl, &[name]);
        decl
    }

    /// Declare a named constant.
    pub fn add_constant(&mut self, line: u32, name: Name, ctype: TypeId, value: Name) -> DeclId {
        let decl = self.decls.alloc(Declaration::new(
            self.qualify(name),
            self.file,
            line,
            DeclKind::Const { ctype, value },
        ));
        self.declare_with_keys(decl, &[name]);
        decl
    }

    /// Declare a typedef.
    pub fn add_typedef(
        &mut self,
        line: u32,
        name: Name,
        alias: TypeId,
        constructed: bool,
    ) -> DeclId {
        let decl = self.decls.alloc(Declaration::new(
            self.qualify(name),
            self.file,
            line,
            DeclKind::Typedef { alias, constructed },
        ));
        self.declare_with_keys(decl, &[name]);
        decl
    }

    /// Declare an enum and its enumerators. Enumerators are visible in
    /// the enclosing scope's dictionary but owned by the enum.
    pub fn add_enum(&mut self, line: u32, name: Name, enumerators: Vec<(Name, Name, u32)>) -> DeclId {
        let mut ids = Vec::with_capacity(enumerators.len());
        for (ename, value, eline) in enumerators {
            let decl = self.decls.alloc(Declaration::new(
                self.qualify(ename),
                self.file,
                eline,
                DeclKind::Enumerator { value },
            ));
            let ty = self.declared_type(decl);
            let info = self.declaring_info();
            self.info_mut(info).dict.insert(ename, ty);
            ids.push(decl);
        }
        let decl = self.decls.alloc(Declaration::new(
            self.qualify(name),
            self.file,
            line,
            DeclKind::Enum { enumerators: ids },
        ));
        self.declare_with_keys(decl, &[name]);
        decl
    }

    /// Declare a forward declaration (possibly templated), unless the
    /// name already has a concrete or forward entry.
    pub fn add_forward(&mut self, line: u32, name: Name, template: Option<TypeId>) -> DeclId {
        let info = self.declaring_info();
        if let Ok(entries) = self.info(info).dict.lookup_multiple(name) {
            for &entry in entries {
                if let Some(decl) = self.types.get(entry).as_declared() {
                    if matches!(
                        self.decls.get(decl).kind,
                        DeclKind::Forward { .. } | DeclKind::Class(_) | DeclKind::ClassTemplate { .. }
                    ) {
                        return decl;
                    }
                }
            }
        }
        let decl = self.decls.alloc(Declaration::new(
            self.qualify(name),
            self.file,
            line,
            DeclKind::Forward { template },
        ));
        if let Some(template) = template {
            self.patch_template_decl(template, decl);
        }
        self.declare_with_keys(decl, &[name]);
        decl
    }

    /// Declare a preprocessor macro (fed in from the external stage).
    pub fn add_macro(
        &mut self,
        line: u32,
        name: Name,
        parameters: Option<Vec<Name>>,
        text: Name,
    ) -> DeclId {
        let decl = self.decls.alloc(Declaration::new(
            self.qualify(name),
            self.file,
            line,
            DeclKind::Macro { parameters, text },
        ));
        self.declare_with_keys(decl, &[name]);
        decl
    }

    /// Declare the implicit `this` parameter. The class is the given
    /// one (out-of-line member bodies name it explicitly) or the
    /// nearest class on the scope stack.
    pub fn add_this_variable(&mut self, line: u32, class: Option<DeclId>) -> Option<DeclId> {
        let class = class.or_else(|| self.current_class())?;
        let class_type = self.declared_type(class);
        let star = self.interner.intern("*");
        let this_type = self.types.alloc(Type::Modifier {
            alias: class_type,
            pre: Mods::new(),
            post: smallvec![star],
        });
        let this = self.interner.intern("this");
        Some(self.add_variable(line, this, this_type, false))
    }

    // ---- using ---------------------------------------------------------

    /// `using namespace target;` — appends a dummy info to the current
    /// scope's search list and propagates transitively to every scope
    /// already using this one. Also records the directive as a
    /// declaration for documentation.
    pub fn add_using_directive(&mut self, line: u32, target: TypeId) -> DeclId {
        let target_scope = self
            .types
            .get(self.follow_typedef(target))
            .as_declared()
            .filter(|&decl| self.decls.get(decl).is_scope());
        if let Some(scope) = target_scope {
            let target_info = self.find_info(scope);
            let top = self.top();
            self.link_using(top, target_info);
        }
        let name = self
            .types
            .get(target)
            .name()
            .cloned()
            .unwrap_or_default();
        let decl = self.decls.alloc(Declaration::new(
            name,
            self.file,
            line,
            DeclKind::UsingDirective { target },
        ));
        // Recorded in documentation order but not in the dictionary.
        let info = self.declaring_info();
        if !self.is_local(info) {
            let scope_decl = self.info(info).scope;
            if let Some(scope) = self.decls.get_mut(scope_decl).as_scope_mut() {
                scope.declarations.push(decl);
            }
        }
        decl
    }

    fn link_using(&mut self, scope: InfoId, target: InfoId) {
        if scope == target || self.info(scope).using_scopes.contains(&target) {
            return;
        }
        self.info_mut(scope).using_scopes.push(target);
        self.info_mut(target).used_by.push(scope);
        let scope_decl = self.info(scope).scope;
        let dummy_id = InfoId::new(self.infos.len() as u32);
        self.infos.push(ScopeInfo::new_using(scope_decl, target));
        self.info_mut(scope).search.push(dummy_id);
        // Scopes already using `scope` see the new target too.
        let users = self.info(scope).used_by.clone();
        for user in users {
            self.link_using(user, target);
        }
        // And `scope` sees everything `target` was already using. The
        // contains-guard above keeps cycles finite; traversal order
        // fixes the documented first-discovered-wins tie-break.
        let transitive = self.info(target).using_scopes.clone();
        for further in transitive {
            self.link_using(scope, further);
        }
    }

    /// `using N::name;` — the nominated entity becomes visible in the
    /// current scope under its unqualified name.
    pub fn add_using_declaration(&mut self, line: u32, target: TypeId) -> DeclId {
        let name = self
            .types
            .get(target)
            .name()
            .cloned()
            .unwrap_or_default();
        let decl = self.decls.alloc(Declaration::new(
            name.clone(),
            self.file,
            line,
            DeclKind::UsingDeclaration { target },
        ));
        if let Some(&last) = name.last() {
            let info = self.declaring_info();
            self.info_mut(info).dict.insert(last, target);
        }
        decl
    }

    /// `namespace alias = target;`
    pub fn add_aliased_namespace(&mut self, alias: Name, target: TypeId) {
        let info = self.declaring_info();
        self.info_mut(info).dict.insert(alias, target);
    }
}

/// Everything the builder accumulated for one translation unit.
pub struct BuilderOutput {
    pub decls: DeclArena,
    pub types: TypeArena,
    pub root: DeclId,
    pub diagnostics: DiagnosticSink,
}
