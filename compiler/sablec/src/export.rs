//! Declaration-tree export.
//!
//! The serialization bridge on the other side consumes the root scope's
//! declaration sequence plus per-source-file subsets. A file subset is a
//! list of arena ids into the main tree — merged by identity, never by
//! copying — because one file may add declarations to namespaces and
//! classes other files also touch.

use crate::macro_map::MacroMap;
use sable_ir::{DeclId, DeclKind, Declaration, StringInterner, Type, TypeId};
use sable_parse::ParseOutput;
use serde::Serialize;
use std::collections::BTreeMap;

/// Serialized form of one translation unit.
#[derive(Serialize)]
pub struct ExportUnit {
    pub declarations: Vec<ExportDecl>,
    /// Per-file declaration subsets, as ids into the tree.
    pub files: BTreeMap<String, Vec<u32>>,
    /// True when the macro-call table was supplied and applied to
    /// comment positions.
    pub remapped: bool,
}

#[derive(Serialize)]
pub struct ExportDecl {
    pub id: u32,
    pub name: String,
    pub kind: &'static str,
    pub file: String,
    pub line: u32,
    pub access: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub declarations: Vec<ExportDecl>,
}

/// Export the parsed unit.
pub fn export_unit(
    output: &ParseOutput,
    interner: &StringInterner,
    macro_map: Option<&MacroMap>,
) -> ExportUnit {
    let mut files: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    let root = output.decls.get(output.root);
    let declarations = root
        .as_scope()
        .map(|scope| {
            scope
                .declarations
                .iter()
                .map(|&id| export_decl(output, interner, id, &mut files))
                .collect()
        })
        .unwrap_or_default();
    ExportUnit {
        declarations,
        files,
        remapped: macro_map.is_some(),
    }
}

fn export_decl(
    output: &ParseOutput,
    interner: &StringInterner,
    id: DeclId,
    files: &mut BTreeMap<String, Vec<u32>>,
) -> ExportDecl {
    let decl = output.decls.get(id);
    files
        .entry(interner.resolve(decl.file).to_owned())
        .or_default()
        .push(id.index() as u32);

    let declarations = decl
        .as_scope()
        .map(|scope| {
            scope
                .declarations
                .iter()
                .map(|&member| export_decl(output, interner, member, files))
                .collect()
        })
        .unwrap_or_default();

    ExportDecl {
        id: id.index() as u32,
        name: interner.join(&decl.name),
        kind: decl.kind.kind_name(),
        file: interner.resolve(decl.file).to_owned(),
        line: decl.line,
        access: decl.access.to_string(),
        comments: decl
            .comments
            .iter()
            .map(|c| interner.resolve(c.text).to_owned())
            .collect(),
        r#type: declared_type_display(output, interner, decl),
        declarations,
    }
}

fn declared_type_display(
    output: &ParseOutput,
    interner: &StringInterner,
    decl: &Declaration,
) -> Option<String> {
    let ty = match &decl.kind {
        DeclKind::Variable { vtype, .. } => *vtype,
        DeclKind::Const { ctype, .. } => *ctype,
        DeclKind::Typedef { alias, .. } => *alias,
        DeclKind::Function(data) | DeclKind::Operation(data) => data.ret,
        _ => return None,
    };
    Some(type_display(output, interner, ty))
}

/// Human-readable rendering of a type, for the export and for logging.
pub fn type_display(output: &ParseOutput, interner: &StringInterner, ty: TypeId) -> String {
    if !ty.is_valid() {
        return String::new();
    }
    match output.types.get(ty) {
        Type::Base { name }
        | Type::Unknown { name }
        | Type::Dependent { name }
        | Type::Declared { name, .. }
        | Type::Template { name, .. } => interner.join(name),
        Type::Parameterized { template, args } => {
            let mut out = type_display(output, interner, *template);
            out.push('<');
            for (i, &arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&type_display(output, interner, arg));
            }
            out.push('>');
            out
        }
        Type::Modifier { alias, pre, post } => {
            let mut out = String::new();
            for &m in pre.iter() {
                out.push_str(interner.resolve(m));
                out.push(' ');
            }
            out.push_str(&type_display(output, interner, *alias));
            for &m in post.iter() {
                out.push_str(interner.resolve(m));
            }
            out
        }
        Type::Array { alias, .. } => {
            format!("{}[]", type_display(output, interner, *alias))
        }
        Type::FuncPtr { ret, params, .. } => {
            let mut out = type_display(output, interner, *ret);
            out.push_str("(*)(");
            for (i, &param) in params.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&type_display(output, interner, param));
            }
            out.push(')');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str, interner: &StringInterner) -> ParseOutput {
        let lexed = sable_lexer::lex(source, "unit.cc", interner);
        sable_parse::parse(&lexed.tokens, &lexed.line_map, interner)
    }

    #[test]
    fn exports_nested_declarations_once() {
        let interner = StringInterner::new();
        let output = parse("namespace N { int x; int y; }", &interner);
        let unit = export_unit(&output, &interner, None);

        assert_eq!(unit.declarations.len(), 1);
        let ns = &unit.declarations[0];
        assert_eq!(ns.name, "N");
        assert_eq!(ns.kind, "namespace");
        assert_eq!(ns.declarations.len(), 2);

        // The file subset references every declaration by identity.
        let subset = unit.files.get("unit.cc").expect("file subset");
        assert_eq!(subset.len(), 3);
    }

    #[test]
    fn renders_types_readably() {
        let interner = StringInterner::new();
        let output = parse("const char* s;", &interner);
        let unit = export_unit(&output, &interner, None);
        let s = &unit.declarations[0];
        assert_eq!(s.r#type.as_deref(), Some("const char*"));
    }
}
