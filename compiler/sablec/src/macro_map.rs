//! Macro-call table: mapping preprocessed positions back to source.
//!
//! The preprocessor stage records, per line, where each macro call sat
//! in the original source and how wide its expansion is in the
//! preprocessed buffer. Comment and cross-reference placement use this
//! to translate buffer columns back to original columns. The grammar
//! never looks at it.
//!
//! Table format, one record per line, whitespace separated:
//!
//! ```text
//! line start end expanded_end name
//! ```
//!
//! where `start..end` is the call's column span in the original source
//! and `start..expanded_end` is its span in the preprocessed buffer.

use rustc_hash::FxHashMap;
use thiserror::Error;

/// One recorded macro call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacroCall {
    pub name: String,
    /// Column the call starts at, in both buffers.
    pub start: u32,
    /// Column just past the call in the original source.
    pub end: u32,
    /// Column just past the expansion in the preprocessed buffer.
    pub expanded_end: u32,
}

impl MacroCall {
    /// How far columns after the expansion are shifted.
    fn offset(&self) -> i64 {
        i64::from(self.end) - i64::from(self.expanded_end)
    }
}

#[derive(Debug, Error)]
pub enum MacroMapError {
    #[error("line {0}: expected `line start end expanded_end name`")]
    Malformed(usize),
    #[error("line {0}: bad number")]
    BadNumber(usize),
}

/// Per-line macro-call records for one source file.
#[derive(Default)]
pub struct MacroMap {
    calls: FxHashMap<u32, Vec<MacroCall>>,
}

impl MacroMap {
    /// Parse the table text. Blank lines and `#` comments are ignored.
    pub fn parse(text: &str) -> Result<MacroMap, MacroMapError> {
        let mut calls: FxHashMap<u32, Vec<MacroCall>> = FxHashMap::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let mut number = || -> Result<u32, MacroMapError> {
                fields
                    .next()
                    .ok_or(MacroMapError::Malformed(idx + 1))?
                    .parse()
                    .map_err(|_| MacroMapError::BadNumber(idx + 1))
            };
            let line_no = number()?;
            let start = number()?;
            let end = number()?;
            let expanded_end = number()?;
            let name = fields
                .next()
                .ok_or(MacroMapError::Malformed(idx + 1))?
                .to_owned();
            calls.entry(line_no).or_default().push(MacroCall {
                name,
                start,
                end,
                expanded_end,
            });
        }
        for records in calls.values_mut() {
            records.sort_by_key(|c| c.start);
        }
        Ok(MacroMap { calls })
    }

    /// Records for one line, sorted by start column.
    pub fn calls_on(&self, line: u32) -> &[MacroCall] {
        self.calls.get(&line).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Translate a preprocessed-buffer column back to an original-source
    /// column. Columns inside an expansion collapse to the call site;
    /// columns past it shift by the expansion's length difference.
    pub fn map_column(&self, line: u32, column: u32) -> u32 {
        let mut shifted = i64::from(column);
        for call in self.calls_on(line) {
            if column < call.start {
                break;
            }
            if column < call.expanded_end {
                return call.start;
            }
            shifted += call.offset();
        }
        shifted.max(0) as u32
    }

    /// Number of lines with at least one record.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_and_sorts_records() {
        let map = MacroMap::parse(
            "# comment\n12 20 25 40 LATER\n12 4 9 15 EARLY\n",
        )
        .unwrap();
        let calls = map.calls_on(12);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "EARLY");
    }

    #[test]
    fn columns_inside_an_expansion_collapse_to_the_call() {
        // Call at columns 4..9 in the source, expanding to 4..15.
        let map = MacroMap::parse("3 4 9 15 MAX\n").unwrap();
        assert_eq!(map.map_column(3, 2), 2);
        assert_eq!(map.map_column(3, 6), 4);
        assert_eq!(map.map_column(3, 14), 4);
        // Past the expansion: shifted left by 15 - 9 = 6.
        assert_eq!(map.map_column(3, 21), 15);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(MacroMap::parse("1 2 3\n").is_err());
        assert!(MacroMap::parse("1 2 x 4 NAME\n").is_err());
    }
}
