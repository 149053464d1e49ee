//! Declarations and the declaration arena.
//!
//! A [`Declaration`] records one named entity of the translation unit. The
//! scope-kind declarations (namespaces, classes) additionally own the
//! ordered list of their contained declarations — documentation order,
//! intentionally left empty for function-body and other local scopes, which
//! exist only for name resolution.

use crate::{Comment, Mods, Name, ScopedName, TypeId};
use std::cell::Cell;
use std::fmt;

/// Index into a [`DeclArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct DeclId(u32);

impl DeclId {
    pub const INVALID: DeclId = DeclId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        DeclId(index)
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

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "DeclId({})", self.0)
        } else {
            write!(f, "DeclId::INVALID")
        }
    }
}

impl Default for DeclId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Member access level. `Default` resolves per class-key (`class` members
/// default to private, `struct` to public).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Access {
    #[default]
    Default,
    Public,
    Protected,
    Private,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Default => write!(f, "default"),
            Access::Public => write!(f, "public"),
            Access::Protected => write!(f, "protected"),
            Access::Private => write!(f, "private"),
        }
    }
}

/// `class` / `struct` / `union` key of a class declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassKey {
    Class,
    Struct,
    Union,
}

impl ClassKey {
    /// The access members get before any access-specifier appears.
    pub fn default_access(self) -> Access {
        match self {
            ClassKey::Class => Access::Private,
            ClassKey::Struct | ClassKey::Union => Access::Public,
        }
    }

    pub fn spelling(self) -> &'static str {
        match self {
            ClassKey::Class => "class",
            ClassKey::Struct => "struct",
            ClassKey::Union => "union",
        }
    }
}

/// One base-class record: parent type plus attributes in source order
/// (`virtual`, `public`, ...).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Inheritance {
    pub parent: TypeId,
    pub attributes: Mods,
}

/// Ordered contents of a scope declaration.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct ScopeData {
    pub declarations: Vec<DeclId>,
}

/// What produced a namespace-like scope.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NamespaceFlavor {
    /// An ordinary named namespace.
    Named,
    /// An anonymous namespace; its name derives from the source filename.
    Anonymous,
    /// A synthesized block scope (`` `if ``, `` `while2 ``, ...).
    Unique,
    /// A temporary scope holding template formal parameters, merged into
    /// the declaration that follows.
    Template,
    /// A function body opened for local name resolution only.
    FunctionImpl,
}

/// Payload shared by `Class` and `ClassTemplate`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ClassData {
    pub key: ClassKey,
    pub scope: ScopeData,
    pub parents: Vec<Inheritance>,
}

/// One formal function parameter.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Parameter {
    /// Leading modifiers (`register`, ...).
    pub premod: Mods,
    pub ptype: TypeId,
    pub name: Name,
    /// Default value text, `Name::EMPTY` if none.
    pub value: Name,
}

impl Parameter {
    pub fn new(ptype: TypeId, name: Name) -> Self {
        Parameter {
            premod: Mods::new(),
            ptype,
            name,
            value: Name::EMPTY,
        }
    }

    /// True if the parameter carries a default value.
    #[inline]
    pub fn has_default(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Payload shared by `Function` and `Operation`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FunctionData {
    /// Modifiers before the declarator (`static`, `virtual`, `inline`, ...).
    pub premod: Vec<Name>,
    /// Return type; `TypeId::INVALID` for constructors/destructors.
    pub ret: TypeId,
    /// Modifiers after the parameter list (`const`, ...).
    pub postmod: Vec<Name>,
    /// The plain, unmangled name (`f`, `operator+`).
    pub real_name: Name,
    pub params: Vec<Parameter>,
    /// `Template` type when this is a function template.
    pub template: Option<TypeId>,
}

/// The closed set of declaration kinds.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DeclKind {
    Namespace {
        flavor: NamespaceFlavor,
        scope: ScopeData,
    },
    Class(ClassData),
    ClassTemplate {
        data: ClassData,
        /// The `Template` type carrying the formal parameter list.
        template: TypeId,
    },
    /// A named function.
    Function(FunctionData),
    /// An operator. Same payload as a function; the real name is the
    /// operator spelling (`operator+`).
    Operation(FunctionData),
    Variable {
        vtype: TypeId,
        /// True when declared with constructor-style initializer syntax.
        constructed: bool,
    },
    Const {
        ctype: TypeId,
        /// Initializer text.
        value: Name,
    },
    Enum {
        enumerators: Vec<DeclId>,
    },
    Enumerator {
        value: Name,
    },
    Typedef {
        alias: TypeId,
        constructed: bool,
    },
    /// Forward declaration; carries the template type for templated
    /// forwards (`template<class T> class X;`).
    Forward {
        template: Option<TypeId>,
    },
    Macro {
        /// Formal parameter names; `None` for object-like macros.
        parameters: Option<Vec<Name>>,
        /// Expansion text.
        text: Name,
    },
    UsingDirective {
        /// Named type of the nominated namespace.
        target: TypeId,
    },
    UsingDeclaration {
        target: TypeId,
    },
    /// Marker declarations seeded by the builder (`true`, `__null_t`, ...).
    Builtin,
}

impl DeclKind {
    /// Human-readable kind word for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DeclKind::Namespace { .. } => "namespace",
            DeclKind::Class(data) => data.key.spelling(),
            DeclKind::ClassTemplate { .. } => "class template",
            DeclKind::Function(_) => "function",
            DeclKind::Operation(_) => "operator",
            DeclKind::Variable { .. } => "variable",
            DeclKind::Const { .. } => "constant",
            DeclKind::Enum { .. } => "enum",
            DeclKind::Enumerator { .. } => "enumerator",
            DeclKind::Typedef { .. } => "typedef",
            DeclKind::Forward { .. } => "forward declaration",
            DeclKind::Macro { .. } => "macro",
            DeclKind::UsingDirective { .. } => "using directive",
            DeclKind::UsingDeclaration { .. } => "using declaration",
            DeclKind::Builtin => "builtin",
        }
    }
}

/// One declaration.
pub struct Declaration {
    /// Fully qualified name, outermost component first.
    pub name: ScopedName,
    /// Defining source file.
    pub file: Name,
    /// 1-based line of the declaration.
    pub line: u32,
    pub access: Access,
    /// Comments attached to this declaration, in source order.
    pub comments: Vec<Comment>,
    pub kind: DeclKind,
    /// Memoized `Declared` wrapper type: created once on first request,
    /// reused for the declaration's lifetime.
    declared: Cell<TypeId>,
}

impl Declaration {
    pub fn new(name: ScopedName, file: Name, line: u32, kind: DeclKind) -> Self {
        Declaration {
            name,
            file,
            line,
            access: Access::Default,
            comments: Vec::new(),
            kind,
            declared: Cell::new(TypeId::INVALID),
        }
    }

    /// Last component of the qualified name.
    pub fn last_name(&self) -> Name {
        self.name.last().copied().unwrap_or(Name::EMPTY)
    }

    /// The memoized wrapper type, if one was created.
    #[inline]
    pub fn declared(&self) -> Option<TypeId> {
        let id = self.declared.get();
        id.is_valid().then_some(id)
    }

    /// Memoize the wrapper type. Only the builder calls this, exactly once.
    pub fn set_declared(&self, ty: TypeId) {
        debug_assert!(!self.declared.get().is_valid());
        self.declared.set(ty);
    }

    /// Scope view of a namespace or class declaration.
    pub fn as_scope(&self) -> Option<&ScopeData> {
        match &self.kind {
            DeclKind::Namespace { scope, .. } => Some(scope),
            DeclKind::Class(data) | DeclKind::ClassTemplate { data, .. } => Some(&data.scope),
            _ => None,
        }
    }

    /// Mutable scope view.
    pub fn as_scope_mut(&mut self) -> Option<&mut ScopeData> {
        match &mut self.kind {
            DeclKind::Namespace { scope, .. } => Some(scope),
            DeclKind::Class(data) | DeclKind::ClassTemplate { data, .. } => Some(&mut data.scope),
            _ => None,
        }
    }

    /// True for declarations that open a lookup scope.
    #[inline]
    pub fn is_scope(&self) -> bool {
        self.as_scope().is_some()
    }

    /// Class view of a `Class` or `ClassTemplate`.
    pub fn as_class(&self) -> Option<&ClassData> {
        match &self.kind {
            DeclKind::Class(data) | DeclKind::ClassTemplate { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Mutable class view.
    pub fn as_class_mut(&mut self) -> Option<&mut ClassData> {
        match &mut self.kind {
            DeclKind::Class(data) | DeclKind::ClassTemplate { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Function view of a `Function` or `Operation`.
    pub fn as_function(&self) -> Option<&FunctionData> {
        match &self.kind {
            DeclKind::Function(data) | DeclKind::Operation(data) => Some(data),
            _ => None,
        }
    }

    /// True for `Function` and `Operation` declarations.
    #[inline]
    pub fn is_function(&self) -> bool {
        self.as_function().is_some()
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("name", &self.name)
            .field("kind", &self.kind.kind_name())
            .field("line", &self.line)
            .finish()
    }
}

/// Arena of [`Declaration`] nodes for one translation unit.
#[derive(Default)]
pub struct DeclArena {
    decls: Vec<Declaration>,
}

impl DeclArena {
    pub fn new() -> Self {
        DeclArena { decls: Vec::new() }
    }

    pub fn alloc(&mut self, decl: Declaration) -> DeclId {
        debug_assert!(self.decls.len() < u32::MAX as usize);
        let id = DeclId::new(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    #[inline]
    pub fn get(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Iterate over all (id, declaration) pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId::new(i as u32), d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoped;
    use pretty_assertions::assert_eq;

    fn namespace_decl(name: Name) -> Declaration {
        Declaration::new(
            scoped(name),
            Name::EMPTY,
            1,
            DeclKind::Namespace {
                flavor: NamespaceFlavor::Named,
                scope: ScopeData::default(),
            },
        )
    }

    #[test]
    fn scope_views() {
        let decl = namespace_decl(Name::from_raw(3));
        assert!(decl.is_scope());
        assert!(decl.as_class().is_none());
        assert!(!decl.is_function());
    }

    #[test]
    fn declared_is_memoized_once() {
        let decl = namespace_decl(Name::from_raw(3));
        assert_eq!(decl.declared(), None);
        decl.set_declared(TypeId::new(5));
        assert_eq!(decl.declared(), Some(TypeId::new(5)));
    }

    #[test]
    fn default_access_follows_class_key() {
        assert_eq!(ClassKey::Class.default_access(), Access::Private);
        assert_eq!(ClassKey::Struct.default_access(), Access::Public);
    }
}
