//! Interned identifiers and qualified names.

use smallvec::SmallVec;
use std::fmt;

/// Interned string identifier.
///
/// A 32-bit index into the [`StringInterner`](crate::StringInterner).
/// Equality and hashing are O(1) integer operations.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from a raw index. Only the interner hands out valid indices.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get the raw index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the interner's storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// True for the pre-interned empty string.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Ordered components of a qualified name, outermost scope first.
///
/// `std::vector::iterator` is `[std, vector, iterator]`. The global scope
/// itself is the empty sequence. Most names are short, so the components
/// live inline.
pub type ScopedName = SmallVec<[Name; 4]>;

/// Build a `ScopedName` from a single component.
#[inline]
pub fn scoped(name: Name) -> ScopedName {
    let mut s = ScopedName::new();
    s.push(name);
    s
}

/// Build a `ScopedName` by appending a component to an existing prefix.
#[inline]
pub fn scoped_in(prefix: &ScopedName, name: Name) -> ScopedName {
    let mut s = prefix.clone();
    s.push(name);
    s
}
