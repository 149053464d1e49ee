//! Symbol-table metadata attached to scope declarations.
//!
//! A [`ScopeInfo`] carries what the documentation-facing
//! [`Declaration`](sable_ir::Declaration) deliberately does not: the name
//! dictionary, the precomputed search list for unqualified lookup, and the
//! using-directive edges. Infos live in an arena owned by the builder and
//! are created on first access, then cached for the scope's lifetime.
//!
//! Using directives insert *dummy* infos into the search list of the scope
//! containing the directive. A dummy holds no dictionary of its own; it
//! points at the used scope's info, and the lookup algorithms treat a run
//! of dummies as one merged pool so that all used namespaces are weighed
//! together, not one at a time.

use crate::Dictionary;
use rustc_hash::FxHashMap;
use sable_ir::{Access, DeclId, Name};
use std::fmt;

/// Index into the builder's scope-info arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct InfoId(u32);

impl InfoId {
    pub const INVALID: InfoId = InfoId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        InfoId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for InfoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoId({})", self.0)
    }
}

/// Lookup metadata for one scope.
pub struct ScopeInfo {
    /// The scope declaration this info belongs to.
    pub scope: DeclId,
    /// Name dictionary. Unused (empty) for dummy using entries, which
    /// search their target's dictionary instead.
    pub dict: Dictionary,
    /// Ordered scopes probed by unqualified lookup: self first, then base
    /// classes, then enclosing scopes, with dummy using entries merged in.
    pub search: Vec<InfoId>,
    /// Scopes this one imports through `using namespace`.
    pub using_scopes: Vec<InfoId>,
    /// Inverse edges: scopes that import this one. Drives transitive
    /// propagation when a directive is added later.
    pub used_by: Vec<InfoId>,
    /// True for a dummy entry standing in a search list for a used scope.
    pub is_using: bool,
    /// For dummies: the real info whose dictionary to probe.
    pub target: InfoId,
    /// Access level currently in effect while the scope is open.
    pub access: Access,
    /// Per-kind counters for naming synthesized block scopes.
    ns_counts: FxHashMap<Name, u32>,
}

impl ScopeInfo {
    /// Info for a real scope. The caller seeds `search` with the info's
    /// own id once that id is known.
    pub fn new(scope: DeclId) -> Self {
        ScopeInfo {
            scope,
            dict: Dictionary::new(),
            search: Vec::new(),
            using_scopes: Vec::new(),
            used_by: Vec::new(),
            is_using: false,
            target: InfoId::INVALID,
            access: Access::Default,
            ns_counts: FxHashMap::default(),
        }
    }

    /// Dummy info representing the use of `target` inside some search
    /// list.
    pub fn new_using(scope: DeclId, target: InfoId) -> Self {
        ScopeInfo {
            scope,
            dict: Dictionary::new(),
            search: Vec::new(),
            using_scopes: Vec::new(),
            used_by: Vec::new(),
            is_using: true,
            target,
            access: Access::Default,
            ns_counts: FxHashMap::default(),
        }
    }

    /// Next ordinal for a synthesized block-scope name of the given kind.
    /// First use of `if` yields 1 (printed `` `if ``), the second 2
    /// (printed `` `if2 ``), keeping names deterministic and unique.
    pub fn unique_count(&mut self, kind: Name) -> u32 {
        let counter = self.ns_counts.entry(kind).or_insert(0);
        *counter += 1;
        *counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unique_counts_are_per_kind() {
        let mut info = ScopeInfo::new(DeclId::new(0));
        let if_ = Name::from_raw(1);
        let while_ = Name::from_raw(2);
        assert_eq!(info.unique_count(if_), 1);
        assert_eq!(info.unique_count(if_), 2);
        assert_eq!(info.unique_count(while_), 1);
    }
}
