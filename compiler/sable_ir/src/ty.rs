//! The type graph.
//!
//! Types are separate from declarations: a [`Type`] may reference a
//! declaration through its [`DeclId`] but never owns it. Types live in a
//! [`TypeArena`] per translation unit and are never freed mid-parse, so a
//! `TypeId` stays valid for the arena's lifetime.

use crate::{DeclId, Name, ScopedName};
use smallvec::SmallVec;
use std::fmt;

/// Index into a [`TypeArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Sentinel for "no type" (e.g. a constructor's return type).
    pub const INVALID: TypeId = TypeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        TypeId(index)
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

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "TypeId({})", self.0)
        } else {
            write!(f, "TypeId::INVALID")
        }
    }
}

impl Default for TypeId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Pre/post modifier spellings (`const`, `*`, `&`, `[]`, ...).
pub type Mods = SmallVec<[Name; 2]>;

/// A type in the graph.
///
/// The first five variants are *named* types: they can be stored in a
/// dictionary and found by lookup. The rest are structural.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Type {
    /// A built-in type (`int`, `bool`, `...`).
    Base { name: ScopedName },
    /// Placeholder for a name that has not resolved to a declaration yet.
    /// Superseded, never deleted, once the real declaration appears.
    Unknown { name: ScopedName },
    /// A name dependent on a template parameter.
    Dependent { name: ScopedName },
    /// Wrapper around a declaration. Non-owning back-reference.
    Declared { name: ScopedName, decl: DeclId },
    /// A class or function template together with its formal parameters
    /// (each a `Dependent` type).
    Template {
        name: ScopedName,
        decl: DeclId,
        params: Vec<TypeId>,
    },
    /// A template instantiated with concrete argument types. `template`
    /// points at the `Template` type, or at the named placeholder that
    /// stood in when the primary template could not be resolved.
    Parameterized { template: TypeId, args: Vec<TypeId> },
    /// Qualified or pointer/reference-modified type.
    Modifier {
        alias: TypeId,
        pre: Mods,
        post: Mods,
    },
    /// Array of `alias` with the given (syntactic) dimensions.
    Array {
        alias: TypeId,
        sizes: SmallVec<[Name; 2]>,
    },
    /// Pointer to function.
    FuncPtr {
        ret: TypeId,
        pre: Mods,
        params: Vec<TypeId>,
    },
}

impl Type {
    /// The qualified name of a named type.
    pub fn name(&self) -> Option<&ScopedName> {
        match self {
            Type::Base { name }
            | Type::Unknown { name }
            | Type::Dependent { name }
            | Type::Declared { name, .. }
            | Type::Template { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True for types that participate in name lookup.
    #[inline]
    pub fn is_named(&self) -> bool {
        self.name().is_some()
    }

    /// The declaration a `Declared` or `Template` type wraps.
    pub fn as_declared(&self) -> Option<DeclId> {
        match self {
            Type::Declared { decl, .. } | Type::Template { decl, .. } => Some(*decl),
            _ => None,
        }
    }

    /// True for the `Unknown` placeholder.
    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown { .. })
    }
}

/// Arena of [`Type`] nodes for one translation unit.
#[derive(Default)]
pub struct TypeArena {
    types: Vec<Type>,
}

impl TypeArena {
    pub fn new() -> Self {
        TypeArena { types: Vec::new() }
    }

    /// Allocate a node, returning its id.
    pub fn alloc(&mut self, ty: Type) -> TypeId {
        debug_assert!(self.types.len() < u32::MAX as usize);
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoped;
    use pretty_assertions::assert_eq;

    #[test]
    fn alloc_and_get_round_trip() {
        let mut arena = TypeArena::new();
        let name = scoped(Name::from_raw(7));
        let id = arena.alloc(Type::Base { name: name.clone() });
        assert_eq!(arena.get(id).name(), Some(&name));
        assert!(arena.get(id).is_named());
    }

    #[test]
    fn invalid_id_is_not_valid() {
        assert!(!TypeId::INVALID.is_valid());
        assert!(TypeId::new(0).is_valid());
    }
}
