//! Name lookup over the symbol table.
//!
//! All methods here are read-only: speculative parses may query freely
//! without leaving placeholders, scopes, or dictionary entries behind.
//! The mutating always-succeed wrappers (`lookup_type_or_unknown`, ...)
//! live on [`Builder`](crate::Builder) and are only called from committed
//! parse contexts.

use crate::{InfoId, ScopeInfo};
use rustc_hash::FxHashMap;
use sable_ir::{DeclArena, DeclId, DeclKind, Name, StringInterner, Type, TypeArena, TypeId};
use std::collections::VecDeque;

/// Read-only lookup view. Cheap to construct; borrows the builder's
/// arenas.
pub struct Lookup<'a> {
    pub(crate) infos: &'a [ScopeInfo],
    pub(crate) info_map: &'a FxHashMap<DeclId, InfoId>,
    pub(crate) decls: &'a DeclArena,
    pub(crate) types: &'a TypeArena,
    pub(crate) interner: &'a StringInterner,
}

impl<'a> Lookup<'a> {
    pub fn new(
        infos: &'a [ScopeInfo],
        info_map: &'a FxHashMap<DeclId, InfoId>,
        decls: &'a DeclArena,
        types: &'a TypeArena,
        interner: &'a StringInterner,
    ) -> Self {
        Lookup {
            infos,
            info_map,
            decls,
            types,
            interner,
        }
    }

    /// The info behind an id.
    #[inline]
    pub fn info(&self, id: InfoId) -> &'a ScopeInfo {
        &self.infos[id.index()]
    }

    /// Info of a scope declaration, if the scope has been opened.
    #[inline]
    pub fn info_of(&self, scope: DeclId) -> Option<InfoId> {
        self.info_map.get(&scope).copied()
    }

    /// The dictionary a search-list entry contributes: its own for a real
    /// scope, the target's for a dummy using entry.
    pub(crate) fn dict_of(&self, id: InfoId) -> &'a crate::Dictionary {
        let info = self.info(id);
        if info.is_using {
            &self.info(info.target).dict
        } else {
            &info.dict
        }
    }

    /// True for dictionary entries that denote a *type* in the lookup
    /// sense: anything but a function.
    pub fn is_type_entry(&self, ty: TypeId) -> bool {
        match self.types.get(ty) {
            Type::Base { .. } | Type::Unknown { .. } | Type::Dependent { .. } => true,
            Type::Declared { decl, .. } => !self.decls.get(*decl).is_function(),
            Type::Template { decl, .. } => {
                !decl.is_valid() || !self.decls.get(*decl).is_function()
            }
            _ => false,
        }
    }

    /// Follow `Declared` typedefs to the named type they alias.
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

    /// The class declaration behind a `Declared` type, if any.
    pub fn as_class_decl(&self, ty: TypeId) -> Option<DeclId> {
        if !ty.is_valid() {
            return None;
        }
        let decl = self.types.get(self.follow_typedef(ty)).as_declared()?;
        self.decls.get(decl).as_class().map(|_| decl)
    }

    /// Unqualified lookup: walk the search list in order, merging the
    /// dictionaries of consecutive dummy using entries into one pool, and
    /// resolve the pool at the first real scope with matches.
    ///
    /// Resolution drops `Unknown` placeholders unless nothing concrete
    /// remains, and drops functions unless `allow_func`. More than one
    /// survivor is an *ambiguity*: deterministically the first wins, and
    /// the case is logged rather than rejected.
    pub fn unqualified(&self, name: Name, search: &[InfoId], allow_func: bool) -> Option<TypeId> {
        let mut results: Vec<TypeId> = Vec::new();
        for &id in search {
            if let Ok(entries) = self.dict_of(id).lookup_multiple(name) {
                results.extend_from_slice(entries);
            }
            if self.info(id).is_using || results.is_empty() {
                continue;
            }
            if let Some(found) = self.resolve_pool(name, &mut results, allow_func) {
                return Some(found);
            }
        }
        // Matches contributed by trailing dummy using entries still
        // resolve once the list is exhausted.
        if results.is_empty() {
            None
        } else {
            self.resolve_pool(name, &mut results, allow_func)
        }
    }

    /// Resolve an accumulated candidate pool: drop `Unknown`s unless
    /// nothing concrete remains, drop functions unless wanted, pick the
    /// single survivor — or, on ambiguity, the first. Drains the pool;
    /// an empty outcome means "keep walking".
    fn resolve_pool(
        &self,
        name: Name,
        results: &mut Vec<TypeId>,
        allow_func: bool,
    ) -> Option<TypeId> {
        let mut unknown = None;
        let mut kept: Vec<TypeId> = Vec::new();
        for ty in results.drain(..) {
            if self.types.get(ty).is_unknown() {
                unknown = Some(ty);
            } else if allow_func || self.is_type_entry(ty) {
                kept.push(ty);
            }
        }
        match kept.as_slice() {
            [] => {
                // Nothing but placeholders: hand one back. Only
                // functions, with functions unwanted, keeps walking.
                unknown
            }
            [single] => Some(*single),
            [first, ..] => {
                tracing::debug!(
                    name = %self.interner.resolve(name),
                    candidates = kept.len(),
                    "ambiguous unqualified lookup, first match wins"
                );
                Some(*first)
            }
        }
    }

    /// Qualified lookup in a specific scope. Class scopes search the
    /// inheritance graph breadth-first in declaration order; namespace
    /// scopes search their using-closure and rank the candidates.
    pub fn qualified(&self, name: Name, scope: InfoId, allow_func: bool) -> Option<TypeId> {
        let scope_decl = self.info(scope).scope;
        match &self.decls.get(scope_decl).kind {
            DeclKind::Class(_) | DeclKind::ClassTemplate { .. } => {
                self.qualified_in_class(name, scope_decl, allow_func)
            }
            DeclKind::Namespace { .. } => self.qualified_in_namespace(name, scope),
            _ => None,
        }
    }

    /// Breadth-first over the open list of base classes, seeded with the
    /// class itself. The first base (in declaration order) holding the
    /// name as a single suitable entry wins.
    fn qualified_in_class(&self, name: Name, class: DeclId, allow_func: bool) -> Option<TypeId> {
        let mut open: VecDeque<DeclId> = VecDeque::new();
        let mut visited: Vec<DeclId> = Vec::new();
        open.push_back(class);
        while let Some(current) = open.pop_front() {
            if visited.contains(&current) {
                continue;
            }
            visited.push(current);
            if let Some(info) = self.info_of(current) {
                if let Ok(entries) = self.info(info).dict.lookup_multiple(name) {
                    let concrete: Vec<TypeId> = entries
                        .iter()
                        .copied()
                        .filter(|&t| !self.types.get(t).is_unknown())
                        .collect();
                    if let [single] = concrete.as_slice() {
                        if allow_func || self.is_type_entry(*single) {
                            return Some(*single);
                        }
                        // A function where a type was wanted: keep
                        // walking the bases.
                    }
                }
            }
            if let Some(data) = self.decls.get(current).as_class() {
                for inheritance in &data.parents {
                    if let Some(parent) = self.as_class_decl(inheritance.parent) {
                        open.push_back(parent);
                    }
                }
            }
        }
        None
    }

    /// Closure over `using_scopes`, never revisiting a closed scope.
    /// Usings of a namespace that itself holds the name are not
    /// traversed. Candidates are ranked: a declaration beats a bare named
    /// type, a live declaration beats a dangling forward; the first
    /// discovered wins ties, which makes the directive tie-break order
    /// deterministic under the fixed traversal.
    fn qualified_in_namespace(&self, name: Name, scope: InfoId) -> Option<TypeId> {
        let mut open: VecDeque<InfoId> = VecDeque::new();
        let mut closed: Vec<InfoId> = Vec::new();
        let mut results: Vec<TypeId> = Vec::new();
        open.push_back(scope);
        while let Some(ns) = open.pop_front() {
            if closed.contains(&ns) {
                continue;
            }
            closed.push(ns);
            if let Ok(entries) = self.info(ns).dict.lookup_multiple(name) {
                results.extend_from_slice(entries);
            } else {
                open.extend(self.info(ns).using_scopes.iter().copied());
            }
        }
        if results.is_empty() {
            tracing::trace!(name = %self.interner.resolve(name), "qualified namespace lookup found nothing");
            return None;
        }
        let mut best = None;
        let mut best_score = -1;
        for ty in results {
            let score = self.rank(ty);
            if score > best_score {
                best_score = score;
                best = Some(ty);
            }
        }
        best
    }

    /// Candidate ranking for namespace-qualified lookup.
    fn rank(&self, ty: TypeId) -> i32 {
        match self.types.get(ty) {
            Type::Declared { decl, .. } | Type::Template { decl, .. } => {
                if !decl.is_valid() {
                    1
                } else if matches!(self.decls.get(*decl).kind, DeclKind::Forward { .. }) {
                    1
                } else {
                    2
                }
            }
            _ => 0,
        }
    }

    /// Collect the function declarations under `name` in one search-list
    /// entry's dictionary.
    pub fn find_functions(&self, name: Name, id: InfoId, out: &mut Vec<DeclId>) {
        if let Ok(entries) = self.dict_of(id).lookup_multiple(name) {
            for &entry in entries {
                if let Some(decl) = self.types.get(entry).as_declared() {
                    if self.decls.get(decl).is_function() && !out.contains(&decl) {
                        out.push(decl);
                    }
                }
            }
        }
    }

    /// Map a qualified name onto the chain of scopes containing it and
    /// the final entity, walking down from the global scope. Read-only;
    /// `None` when any component fails to resolve or names a non-scope.
    pub fn map_name(&self, names: &[Name]) -> Option<(Vec<DeclId>, TypeId)> {
        let (&last, prefix) = names.split_last()?;
        let mut scopes = Vec::with_capacity(prefix.len());
        let mut scope = self.decls.iter().next().map(|(id, _)| id)?;
        for &component in prefix {
            let info = self.info_of(scope)?;
            let entry = self.qualified(component, info, false)?;
            let decl = self.types.get(self.follow_typedef(entry)).as_declared()?;
            if !self.decls.get(decl).is_scope() {
                return None;
            }
            scopes.push(decl);
            scope = decl;
        }
        let info = self.info_of(scope)?;
        let entry = self.qualified(last, info, true)?;
        Some((scopes, entry))
    }

    /// Read-only resolution of a qualified scope name from the global
    /// scope, used by argument-associated operator lookup.
    pub(crate) fn resolve_scope_by_name(&self, names: &[Name]) -> Option<InfoId> {
        let mut scope = self.decls.iter().next().map(|(id, _)| id)?;
        debug_assert!(self.decls.get(scope).name.is_empty());
        for &component in names {
            let info = self.info_of(scope)?;
            let entries = self.info(info).dict.lookup_multiple(component).ok()?;
            let next = entries.iter().find_map(|&t| {
                let decl = self.types.get(t).as_declared()?;
                self.decls.get(decl).is_scope().then_some(decl)
            })?;
            scope = next;
        }
        self.info_of(scope)
    }
}
