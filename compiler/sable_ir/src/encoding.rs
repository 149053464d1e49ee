//! Compact linear encoding of types and qualified names.
//!
//! The parser builds an [`Encoding`] incrementally as it recognizes grammar
//! fragments; full [`Type`](crate::Type) graphs are expanded from it later,
//! on demand, by the decoder in `sable_resolve`. Building bytes instead of
//! type nodes keeps failed speculative parses cheap: rolling back is a
//! truncate.
//!
//! # Alphabet
//!
//! - A *name* is a length byte with the high bit set (`0x80 + len`)
//!   followed by the identifier bytes. The high bit is what lets a decoder
//!   peek "is this a name?" without scanning.
//! - `Q` `<0x80+n>` then `n` components: qualified name.
//! - `T` `<name>` `<0x80+len>` then `len` bytes of argument encodings:
//!   template instantiation.
//! - `F` `<return>` `<args...>` `_` : function signature. The return type
//!   is encoded first — trailing in the grammar, leading here, so two
//!   signatures compare without scanning past the argument list.
//! - `P` pointer, `R` reference, `A` array, `C` const, `V` volatile,
//!   `S` signed, `U` unsigned: modifier prefixes.
//! - Built-ins: `b` bool, `c` char, `w` wchar_t, `s` short, `i` int,
//!   `l` long, `j` long long, `f` float, `d` double, `r` long double,
//!   `v` void, `e` ellipsis.
//! - `?` placeholder: no name/return type known yet (constructors,
//!   templates awaiting value substitution). `*` value template parameter.

use std::fmt;

/// Longest identifier storable in one length byte.
pub const MAX_NAME_LEN: usize = 0x7f;

/// A write-once byte buffer holding an encoded type or name.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct Encoding {
    buf: Vec<u8>,
}

impl Encoding {
    pub fn new() -> Self {
        Encoding { buf: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Discard everything.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Roll the buffer back to a previously observed length. Used by
    /// tentative parse regions.
    pub fn truncate(&mut self, len: usize) {
        debug_assert!(len <= self.buf.len());
        self.buf.truncate(len);
    }

    /// Append a raw byte (built-in tags, sign/size prefixes).
    #[inline]
    pub fn append_byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    /// Prepend a raw byte (pointer/cv marks wrap what is already built).
    #[inline]
    pub fn prepend_byte(&mut self, b: u8) {
        self.buf.insert(0, b);
    }

    /// Append another encoding's bytes.
    pub fn append(&mut self, other: &Encoding) {
        self.buf.extend_from_slice(&other.buf);
    }

    /// Prepend another encoding's bytes.
    pub fn prepend(&mut self, other: &Encoding) {
        self.buf.splice(0..0, other.buf.iter().copied());
    }

    /// Append a length-prefixed identifier.
    ///
    /// Identifiers longer than [`MAX_NAME_LEN`] are truncated; C++
    /// identifiers of that size do not occur in practice.
    pub fn simple_name(&mut self, name: &str) {
        let bytes = name.as_bytes();
        let len = bytes.len().min(MAX_NAME_LEN);
        self.buf.push(0x80 + len as u8);
        self.buf.extend_from_slice(&bytes[..len]);
    }

    /// Append an empty name component standing for the global scope in a
    /// `::`-rooted qualified name.
    pub fn global_scope(&mut self) {
        self.buf.push(0x80);
    }

    /// Mark the buffer's current contents as an `n`-component qualified
    /// name by prepending the `Q` header.
    pub fn qualified(&mut self, n: usize) {
        debug_assert!(n <= MAX_NAME_LEN);
        self.buf.insert(0, 0x80 + n as u8);
        self.buf.insert(0, b'Q');
    }

    /// Append a template instantiation: name plus argument sub-encoding.
    pub fn template_args(&mut self, name: &str, args: &Encoding) {
        self.buf.push(b'T');
        self.simple_name(name);
        let len = args.len().min(MAX_NAME_LEN);
        self.buf.push(0x80 + len as u8);
        self.buf.extend_from_slice(&args.buf[..len]);
    }

    /// Prepend a pointer (`*`) or reference (`&`) operator.
    pub fn ptr_operator(&mut self, op: u8) {
        self.prepend_byte(if op == b'&' { b'R' } else { b'P' });
    }

    /// Prepend an array mark.
    pub fn array(&mut self) {
        self.prepend_byte(b'A');
    }

    /// Prepend const/volatile qualifiers.
    pub fn cv_qualify(&mut self, is_const: bool, is_volatile: bool) {
        if is_volatile {
            self.prepend_byte(b'V');
        }
        if is_const {
            self.prepend_byte(b'C');
        }
    }

    /// Open a function signature group with the (already encoded) return
    /// type leading. Follow with argument encodings, then
    /// [`end_function`](Self::end_function).
    pub fn start_function(&mut self, ret: &Encoding) {
        self.buf.push(b'F');
        self.append(ret);
    }

    /// Close a function signature group.
    pub fn end_function(&mut self) {
        self.buf.push(b'_');
    }

    pub fn void_type(&mut self) {
        self.buf.push(b'v');
    }

    pub fn ellipsis_arg(&mut self) {
        self.buf.push(b'e');
    }

    /// Placeholder for "no user-defined name yet".
    pub fn no_name(&mut self) {
        self.buf.push(b'?');
    }

    /// Placeholder for a missing return type (constructors, destructors).
    pub fn no_return_type(&mut self) {
        self.buf.push(b'?');
    }

    /// A non-type (value) template parameter.
    pub fn value_param(&mut self) {
        self.buf.push(b'*');
    }

    /// True if the buffer starts with a name component (high bit set).
    pub fn starts_with_name(&self) -> bool {
        self.buf.first().is_some_and(|&b| b >= 0x80)
    }

    /// If the whole buffer is exactly one simple name, return it.
    pub fn as_simple_name(&self) -> Option<&str> {
        let (&len_byte, rest) = self.buf.split_first()?;
        if len_byte < 0x80 || rest.len() != (len_byte - 0x80) as usize {
            return None;
        }
        std::str::from_utf8(rest).ok()
    }
}

/// Printable rendering: length and count prefixes as decimal digits,
/// other bytes verbatim (a qualified `std::string` prints as
/// `Q23std6string`). Stable, so it doubles as the signature suffix in
/// dictionary keys for overloaded functions.
///
/// A high-bit byte is a *name* length prefix except in two positions
/// where it is a bare count: right after `Q` (component count) and right
/// after a `T`'s name (argument-block byte length); those positions are
/// tracked so their following bytes render as encoded items, not name
/// characters.
impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buf = &self.buf;
        let mut i = 0;
        while i < buf.len() {
            let b = buf[i];
            if b >= 0x80 {
                let n = (b - 0x80) as usize;
                write!(f, "{}", n)?;
                let end = (i + 1 + n).min(buf.len());
                for &c in &buf[i + 1..end] {
                    write!(f, "{}", c as char)?;
                }
                i = end;
            } else if b == b'Q' {
                write!(f, "Q")?;
                if let Some(&count) = buf.get(i + 1) {
                    write!(f, "{}", count.saturating_sub(0x80))?;
                }
                i += 2;
            } else if b == b'T' {
                write!(f, "T")?;
                i += 1;
                // The template's own name.
                if let Some(&len_byte) = buf.get(i) {
                    if len_byte >= 0x80 {
                        let n = (len_byte - 0x80) as usize;
                        write!(f, "{}", n)?;
                        let end = (i + 1 + n).min(buf.len());
                        for &c in &buf[i + 1..end] {
                            write!(f, "{}", c as char)?;
                        }
                        i = end;
                    }
                }
                // The argument-block length; its contents are ordinary
                // encoded items handled by the outer loop.
                if let Some(&len_byte) = buf.get(i) {
                    if len_byte >= 0x80 {
                        write!(f, "{}", len_byte - 0x80)?;
                        i += 1;
                    }
                }
            } else {
                write!(f, "{}", b as char)?;
                i += 1;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encoding({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_name_round_trips() {
        let mut e = Encoding::new();
        e.simple_name("vector");
        assert_eq!(e.as_simple_name(), Some("vector"));
        assert!(e.starts_with_name());
        assert_eq!(e.to_string(), "6vector");
    }

    #[test]
    fn qualified_name_prepends_header() {
        let mut e = Encoding::new();
        e.simple_name("std");
        e.simple_name("string");
        e.qualified(2);
        assert_eq!(e.to_string(), "Q23std6string");
        assert!(!e.starts_with_name());
        assert_eq!(e.as_simple_name(), None);
    }

    #[test]
    fn modifiers_wrap_the_base() {
        let mut e = Encoding::new();
        e.append_byte(b'i');
        e.ptr_operator(b'*');
        e.cv_qualify(true, false);
        assert_eq!(e.to_string(), "CPi");
    }

    #[test]
    fn function_signature_is_return_first() {
        let mut ret = Encoding::new();
        ret.void_type();
        let mut e = Encoding::new();
        e.start_function(&ret);
        e.append_byte(b'i');
        e.append_byte(b'd');
        e.end_function();
        assert_eq!(e.to_string(), "Fvid_");
    }

    #[test]
    fn truncate_restores_previous_state() {
        let mut e = Encoding::new();
        e.simple_name("a");
        let mark = e.len();
        e.simple_name("bc");
        e.truncate(mark);
        assert_eq!(e.to_string(), "1a");
    }

    #[test]
    fn template_args_nest() {
        let mut args = Encoding::new();
        args.append_byte(b'i');
        let mut e = Encoding::new();
        e.template_args("vector", &args);
        assert_eq!(e.to_string(), "T6vector1i");
    }
}
