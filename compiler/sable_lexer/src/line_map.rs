//! Byte-offset to source-line mapping.

use memchr::memchr_iter;
use sable_ir::{Name, StringInterner};

/// Maps byte offsets in the preprocessed buffer to `(file, line)` pairs
/// for diagnostics and comment placement.
pub struct LineMap {
    file: Name,
    /// Byte offset of the start of each line. `line_starts[0] == 0`.
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build the map for one source buffer.
    pub fn new(file: &str, source: &str, interner: &StringInterner) -> Self {
        let mut line_starts = vec![0u32];
        for nl in memchr_iter(b'\n', source.as_bytes()) {
            line_starts.push((nl + 1) as u32);
        }
        LineMap {
            file: interner.intern(file),
            line_starts,
        }
    }

    /// The file this map describes.
    #[inline]
    pub fn file(&self) -> Name {
        self.file
    }

    /// Origin of a byte offset: file and 1-based line.
    pub fn origin(&self, pos: u32) -> (Name, u32) {
        (self.file, self.line_of(pos))
    }

    /// 1-based line containing the byte offset.
    pub fn line_of(&self, pos: u32) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_of_handles_boundaries() {
        let interner = StringInterner::new();
        let map = LineMap::new("f.cc", "ab\ncd\n", &interner);
        assert_eq!(map.line_of(0), 1);
        assert_eq!(map.line_of(2), 1);
        assert_eq!(map.line_of(3), 2);
        assert_eq!(map.line_of(5), 2);
    }
}
