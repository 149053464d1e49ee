//! String interner backing [`Name`] handles.

use crate::{Name, ScopedName};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

struct Inner {
    /// Map from string content to index in `strings`.
    map: FxHashMap<&'static str, u32>,
    /// Storage for interned contents, indexed by `Name::raw`.
    strings: Vec<&'static str>,
}

/// Interner for identifier and literal text.
///
/// Strings are leaked into `'static` storage once; the handles stay valid
/// for the process lifetime, which matches the arena-per-translation-unit
/// model — nothing is freed mid-parse.
///
/// Interior mutability lets shared references intern new strings, so the
/// lexer, builder, and parser can all hold `&StringInterner`.
pub struct StringInterner {
    inner: Mutex<Inner>,
}

impl StringInterner {
    /// Create an interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        map.insert("", 0);
        StringInterner {
            inner: Mutex::new(Inner {
                map,
                strings: vec![""],
            }),
        }
    }

    /// Intern a string, returning its handle.
    pub fn intern(&self, text: &str) -> Name {
        let mut inner = self.inner.lock();
        if let Some(&idx) = inner.map.get(text) {
            return Name::from_raw(idx);
        }
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let idx = inner.strings.len() as u32;
        inner.strings.push(leaked);
        inner.map.insert(leaked, idx);
        Name::from_raw(idx)
    }

    /// Resolve a handle back to its text.
    ///
    /// # Panics
    /// Panics if `name` did not come from this interner.
    pub fn resolve(&self, name: Name) -> &'static str {
        self.inner.lock().strings[name.index()]
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.inner.lock().strings.len()
    }

    /// True if only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Render a qualified name as `a::b::c`.
    pub fn join(&self, name: &ScopedName) -> String {
        let inner = self.inner.lock();
        let mut out = String::new();
        for (i, component) in name.iter().enumerate() {
            if i > 0 {
                out.push_str("::");
            }
            out.push_str(inner.strings[component.index()]);
        }
        out
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoped_in;
    use pretty_assertions::assert_eq;

    #[test]
    fn intern_is_idempotent() {
        let interner = StringInterner::new();
        let a = interner.intern("vector");
        let b = interner.intern("vector");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "vector");
    }

    #[test]
    fn empty_is_preinterned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
    }

    #[test]
    fn join_renders_qualified_names() {
        let interner = StringInterner::new();
        let std_ = interner.intern("std");
        let vec_ = interner.intern("vector");
        let name = scoped_in(&crate::scoped(std_), vec_);
        assert_eq!(interner.join(&name), "std::vector");
    }
}
