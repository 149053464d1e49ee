//! Multi-valued name dictionary.
//!
//! A dictionary maps an unqualified name to the named types declared under
//! it in one scope. Keys are not unique: overloaded functions coexist, and
//! `Unknown` placeholders pile up until a concrete declaration supersedes
//! them. The invariant the builder maintains on top of this container: a
//! name maps to at most one non-function, non-`Unknown` entry.

use rustc_hash::FxHashMap;
use sable_ir::{Name, TypeId};
use smallvec::SmallVec;

/// Why a single-result lookup failed.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DictError {
    /// The name is not in the dictionary.
    KeyError(Name),
    /// More than one entry has the name; all of them are returned so the
    /// caller can proceed without a second lookup.
    Multiple(Name, Vec<TypeId>),
}

/// Name → named-type entries for one scope.
#[derive(Default)]
pub struct Dictionary {
    map: FxHashMap<Name, SmallVec<[TypeId; 1]>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary {
            map: FxHashMap::default(),
        }
    }

    /// True if any entry has this name.
    #[inline]
    pub fn has_key(&self, name: Name) -> bool {
        self.map.contains_key(&name)
    }

    /// Add an entry under `name`. Duplicates are allowed by design.
    pub fn insert(&mut self, name: Name, entry: TypeId) {
        self.map.entry(name).or_default().push(entry);
    }

    /// All entries under `name`, in insertion order.
    pub fn lookup_multiple(&self, name: Name) -> Result<&[TypeId], DictError> {
        match self.map.get(&name) {
            Some(entries) => Ok(entries),
            None => Err(DictError::KeyError(name)),
        }
    }

    /// The single entry under `name`.
    pub fn lookup(&self, name: Name) -> Result<TypeId, DictError> {
        let entries = self.lookup_multiple(name)?;
        match entries {
            [one] => Ok(*one),
            _ => Err(DictError::Multiple(name, entries.to_vec())),
        }
    }

    /// Remove every entry under `name`.
    pub fn remove(&mut self, name: Name) {
        self.map.remove(&name);
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(name, entries)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Name, &[TypeId])> {
        self.map.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn multimap_keeps_insertion_order() {
        let mut dict = Dictionary::new();
        let f = Name::from_raw(1);
        dict.insert(f, TypeId::new(10));
        dict.insert(f, TypeId::new(11));
        assert_eq!(
            dict.lookup_multiple(f).unwrap(),
            &[TypeId::new(10), TypeId::new(11)]
        );
        assert!(matches!(dict.lookup(f), Err(DictError::Multiple(..))));
    }

    #[test]
    fn missing_key_is_a_key_error() {
        let dict = Dictionary::new();
        assert_eq!(
            dict.lookup(Name::from_raw(5)),
            Err(DictError::KeyError(Name::from_raw(5)))
        );
    }
}
