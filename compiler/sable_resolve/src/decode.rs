//! Expanding encodings into linked type graphs.
//!
//! The decoder is a cursor over an [`Encoding`]'s bytes. Names route
//! through the builder's lookup (creating `Unknown` placeholders on
//! misses, which is why decoding happens only in committed parse
//! contexts), so the resulting [`Type`] graph is fully linked into the
//! symbol table.

use crate::Builder;
use sable_ir::{
    Encoding, Mods, Name, ScopedName, StringInterner, Type, TypeArena, TypeId,
};
use smallvec::SmallVec;

/// Re-encode a decoded type graph. Decoding then re-encoding an encoding
/// the parser built reproduces it byte for byte, which is what lets
/// signatures be compared on bytes alone.
pub fn encode_type(types: &TypeArena, interner: &StringInterner, ty: TypeId, out: &mut Encoding) {
    if !ty.is_valid() {
        out.no_return_type();
        return;
    }
    match types.get(ty) {
        Type::Base { name } => {
            let text = name.last().map(|&n| interner.resolve(n)).unwrap_or("");
            match builtin_tag(text) {
                Some(tag) => out.append_byte(tag),
                None => out.simple_name(text),
            }
        }
        Type::Unknown { name }
        | Type::Dependent { name }
        | Type::Declared { name, .. }
        | Type::Template { name, .. } => encode_scoped(interner, name, out),
        Type::Parameterized { template, args } => {
            let mut args_enc = Encoding::new();
            for &arg in args {
                encode_type(types, interner, arg, &mut args_enc);
            }
            let name = template
                .is_valid()
                .then(|| types.get(*template).name())
                .flatten()
                .and_then(|n| n.last())
                .map(|&n| interner.resolve(n))
                .unwrap_or("");
            out.template_args(name, &args_enc);
        }
        // Qualifier byte order mirrors the parser: cv marks outermost,
        // then pointer marks, then sign, then the base.
        Type::Modifier { alias, pre, post } => {
            let mut inner = Encoding::new();
            encode_type(types, interner, *alias, &mut inner);
            for &m in pre.iter() {
                match interner.resolve(m) {
                    "signed" => inner.prepend_byte(b'S'),
                    "unsigned" => inner.prepend_byte(b'U'),
                    _ => {}
                }
            }
            for &m in post.iter().rev() {
                inner.ptr_operator(if interner.resolve(m) == "&" { b'&' } else { b'*' });
            }
            let is_const = pre.iter().any(|&m| interner.resolve(m) == "const");
            let is_volatile = pre.iter().any(|&m| interner.resolve(m) == "volatile");
            inner.cv_qualify(is_const, is_volatile);
            out.append(&inner);
        }
        Type::Array { alias, .. } => {
            let mut inner = Encoding::new();
            encode_type(types, interner, *alias, &mut inner);
            inner.array();
            out.append(&inner);
        }
        Type::FuncPtr { ret, params, .. } => {
            let mut ret_enc = Encoding::new();
            encode_type(types, interner, *ret, &mut ret_enc);
            out.start_function(&ret_enc);
            for &param in params {
                encode_type(types, interner, param, out);
            }
            out.end_function();
        }
    }
}

fn encode_scoped(interner: &StringInterner, name: &ScopedName, out: &mut Encoding) {
    match name.as_slice() {
        [] => out.no_name(),
        [single] => out.simple_name(interner.resolve(*single)),
        components => {
            let mut inner = Encoding::new();
            for &component in components {
                inner.simple_name(interner.resolve(component));
            }
            inner.qualified(components.len());
            out.append(&inner);
        }
    }
}

fn builtin_tag(name: &str) -> Option<u8> {
    Some(match name {
        "int" => b'i',
        "void" => b'v',
        "bool" => b'b',
        "short" => b's',
        "char" => b'c',
        "wchar_t" => b'w',
        "long" => b'l',
        "long long" => b'j',
        "float" => b'f',
        "double" => b'd',
        "long double" => b'r',
        "..." => b'e',
        _ => return None,
    })
}

/// Cursor-based decoder for one encoding buffer.
pub struct Decoder<'e, 'b, 'i> {
    bytes: &'e [u8],
    pos: usize,
    /// Source line for diagnostics from lookups the decode triggers.
    line: u32,
    builder: &'b mut Builder<'i>,
}

impl<'e, 'b, 'i> Decoder<'e, 'b, 'i> {
    pub fn new(encoding: &'e Encoding, line: u32, builder: &'b mut Builder<'i>) -> Self {
        Decoder {
            bytes: encoding.bytes(),
            pos: 0,
            line,
            builder,
        }
    }

    /// Position of the cursor, mostly for tests.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Non-consuming check: is the cursor on a name (high bit set)?
    #[inline]
    pub fn peek_is_name(&self) -> bool {
        self.bytes.get(self.pos).is_some_and(|&b| b >= 0x80)
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Decode a length-prefixed name.
    pub fn decode_name(&mut self) -> Option<Name> {
        let len_byte = self.next_byte()?;
        if len_byte < 0x80 {
            self.pos -= 1;
            return None;
        }
        let len = (len_byte - 0x80) as usize;
        let end = (self.pos + len).min(self.bytes.len());
        let text = std::str::from_utf8(&self.bytes[self.pos..end]).ok()?;
        self.pos = end;
        Some(self.builder.interner().intern(text))
    }

    /// Decode one type. Returns `None` at a group terminator (`_`), an
    /// explicit placeholder (`?`), or exhausted input.
    pub fn decode_type(&mut self) -> Option<TypeId> {
        let interner = self.builder.interner();
        let mut premod: Mods = Mods::new();
        let mut postmod: Mods = Mods::new();
        let mut arrays = 0usize;
        let mut base: Option<TypeId> = None;

        loop {
            let Some(b) = self.next_byte() else {
                break;
            };
            let builtin = match b {
                b'P' => {
                    postmod.push(interner.intern("*"));
                    continue;
                }
                b'R' => {
                    postmod.push(interner.intern("&"));
                    continue;
                }
                b'S' => {
                    premod.push(interner.intern("signed"));
                    continue;
                }
                b'U' => {
                    premod.push(interner.intern("unsigned"));
                    continue;
                }
                b'C' => {
                    premod.push(interner.intern("const"));
                    continue;
                }
                b'V' => {
                    premod.push(interner.intern("volatile"));
                    continue;
                }
                b'A' => {
                    arrays += 1;
                    continue;
                }
                b'i' => "int",
                b'v' => "void",
                b'b' => "bool",
                b's' => "short",
                b'c' => "char",
                b'w' => "wchar_t",
                b'l' => "long",
                b'j' => "long long",
                b'f' => "float",
                b'd' => "double",
                b'r' => "long double",
                b'e' | b'*' => "...",
                b'?' => return None,
                b'_' => {
                    // Group terminator; leave it for the caller.
                    self.pos -= 1;
                    return None;
                }
                b'Q' => {
                    base = Some(self.decode_qualified());
                    break;
                }
                b'F' => {
                    base = Some(self.decode_func_ptr()?);
                    break;
                }
                b'T' => {
                    base = Some(self.decode_template()?);
                    break;
                }
                _ if b >= 0x80 => {
                    self.pos -= 1;
                    let name = self.decode_name()?;
                    base = Some(self.builder.lookup_type_or_unknown(name, false));
                    break;
                }
                _ => {
                    tracing::debug!(byte = b, pos = self.pos, "unknown byte in encoding");
                    return None;
                }
            };
            let name = self.builder.interner().intern(builtin);
            base = Some(self.builder.create_base(name));
            break;
        }

        let mut ty = base?;
        for _ in 0..arrays {
            ty = self.builder.alloc_type(Type::Array {
                alias: ty,
                sizes: SmallVec::new(),
            });
        }
        if !premod.is_empty() || !postmod.is_empty() {
            ty = self.builder.alloc_type(Type::Modifier {
                alias: ty,
                pre: premod,
                post: postmod,
            });
        }
        Some(ty)
    }

    /// Decode a `Q`-prefixed qualified name into a chain of scope
    /// lookups. The cursor sits just past the `Q`.
    fn decode_qualified(&mut self) -> TypeId {
        let count = self
            .next_byte()
            .map(|b| b.saturating_sub(0x80) as usize)
            .unwrap_or(0);
        let mut names = ScopedName::new();
        let mut args: Vec<TypeId> = Vec::new();
        for _ in 0..count {
            if self.peek_is_name() {
                if let Some(name) = self.decode_name() {
                    names.push(name);
                }
            } else if self.peek() == Some(b'T') {
                self.pos += 1;
                let Some(tname) = self.decode_name() else {
                    break;
                };
                let len = self
                    .next_byte()
                    .map(|b| b.saturating_sub(0x80) as usize)
                    .unwrap_or(0);
                let end = (self.pos + len).min(self.bytes.len());
                while self.pos < end {
                    match self.decode_type() {
                        Some(arg) => args.push(arg),
                        None => break,
                    }
                }
                names.push(tname);
            } else {
                tracing::debug!(pos = self.pos, "unknown component inside qualified name");
                break;
            }
        }
        let base = self
            .builder
            .lookup_scoped_or_unknown(&names, self.line, false);
        self.parameterize(base, args)
    }

    /// Decode a `T`-prefixed template instantiation. The cursor sits just
    /// past the `T`.
    fn decode_template(&mut self) -> Option<TypeId> {
        let name = self.decode_name()?;
        let len = self
            .next_byte()
            .map(|b| b.saturating_sub(0x80) as usize)
            .unwrap_or(0);
        let end = (self.pos + len).min(self.bytes.len());
        let mut args = Vec::new();
        while self.pos < end {
            match self.decode_type() {
                Some(arg) => args.push(arg),
                None => break,
            }
        }
        let base = self.builder.lookup_type_or_unknown(name, false);
        Some(self.parameterize(base, args))
    }

    /// Wrap a looked-up base in a `Parameterized` if arguments were
    /// decoded. An unresolved primary template leaves the named
    /// placeholder as the reference, preserving the name for
    /// re-encoding.
    fn parameterize(&mut self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        if args.is_empty() {
            return base;
        }
        let template = self.template_of(base).unwrap_or(base);
        self.builder
            .alloc_type(Type::Parameterized { template, args })
    }

    fn template_of(&self, ty: TypeId) -> Option<TypeId> {
        match self.builder.types().get(ty) {
            Type::Template { .. } => Some(ty),
            Type::Declared { decl, .. } => match self.builder.decls().get(*decl).kind {
                sable_ir::DeclKind::ClassTemplate { template, .. } => Some(template),
                sable_ir::DeclKind::Forward {
                    template: Some(template),
                } => Some(template),
                _ => None,
            },
            _ => None,
        }
    }

    /// Decode a `F`-prefixed function signature: return type first, then
    /// arguments up to the `_` terminator.
    fn decode_func_ptr(&mut self) -> Option<TypeId> {
        let ret = self.decode_type()?;
        let mut params = Vec::new();
        loop {
            if self.peek() == Some(b'_') {
                self.pos += 1;
                break;
            }
            match self.decode_type() {
                Some(param) => params.push(param),
                None => break,
            }
        }
        Some(self.builder.alloc_type(Type::FuncPtr {
            ret,
            pre: Mods::new(),
            params,
        }))
    }
}
