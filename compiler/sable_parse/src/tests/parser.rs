//! End-to-end parser tests: declarations in, declaration graph out.

#![allow(clippy::unwrap_used)]

use super::{find_decl, parse_source, root_decls};
use pretty_assertions::assert_eq;
use sable_ir::{DeclKind, StringInterner, Type};

#[test]
fn parses_a_global_variable() {
    let interner = StringInterner::new();
    let output = parse_source("int x;", &interner);
    assert!(!output.has_errors());
    let (_, decl) = find_decl(&output, &interner, "x").unwrap();
    let DeclKind::Variable { vtype, .. } = &decl.kind else {
        panic!("expected variable, got {}", decl.kind.kind_name());
    };
    assert_eq!(
        output.types.get(*vtype).name().map(|n| interner.join(n)),
        Some("int".to_owned())
    );
}

#[test]
fn parses_pointer_and_const_declarations() {
    let interner = StringInterner::new();
    let output = parse_source("const char* s; int** pp;", &interner);
    assert!(!output.has_errors());
    let (_, s) = find_decl(&output, &interner, "s").unwrap();
    let DeclKind::Variable { vtype, .. } = &s.kind else {
        panic!("expected variable");
    };
    let Type::Modifier { pre, post, .. } = output.types.get(*vtype) else {
        panic!("expected modifier type");
    };
    assert!(pre.iter().any(|&m| interner.resolve(m) == "const"));
    assert_eq!(post.len(), 1);
}

#[test]
fn parses_a_function_declaration() {
    let interner = StringInterner::new();
    let output = parse_source("void copy(const char* from, char* to);", &interner);
    assert!(!output.has_errors());
    // Functions are keyed by their signature-qualified name; locate by
    // the real name.
    let (_, decl) = output
        .decls
        .iter()
        .find(|(_, d)| d.as_function().map(|f| interner.resolve(f.real_name)) == Some("copy"))
        .unwrap();
    let data = decl.as_function().unwrap();
    assert_eq!(data.params.len(), 2);
    assert_eq!(interner.resolve(data.params[0].name), "from");
    // The signature suffix renders the argument encodings.
    assert_eq!(interner.resolve(decl.last_name()), "copy(CPcPc)");
}

#[test]
fn constructor_style_initializer_is_a_variable() {
    let interner = StringInterner::new();
    let output = parse_source("int x(3);", &interner);
    assert!(!output.has_errors());
    let (_, decl) = find_decl(&output, &interner, "x").unwrap();
    assert!(matches!(
        decl.kind,
        DeclKind::Variable {
            constructed: true,
            ..
        }
    ));
}

#[test]
fn most_vexing_parse_prefers_the_function() {
    let interner = StringInterner::new();
    let output = parse_source("class T {}; int f(T);", &interner);
    assert!(!output.has_errors());
    let (_, decl) = output
        .decls
        .iter()
        .find(|(_, d)| d.as_function().map(|f| interner.resolve(f.real_name)) == Some("f"))
        .unwrap();
    assert!(decl.is_function());
}

#[test]
fn class_with_base_and_members() {
    let interner = StringInterner::new();
    let output = parse_source(
        "class A { public: int m; };\nclass B : public A { };\nB x;",
        &interner,
    );
    assert!(!output.has_errors());
    let (a_id, a) = find_decl(&output, &interner, "A").unwrap();
    assert_eq!(a.as_class().unwrap().scope.declarations.len(), 1);

    let (_, b) = find_decl(&output, &interner, "B").unwrap();
    let parents = &b.as_class().unwrap().parents;
    assert_eq!(parents.len(), 1);
    assert_eq!(
        output.types.get(parents[0].parent).as_declared(),
        Some(a_id)
    );
    assert_eq!(interner.resolve(parents[0].attributes[0]), "public");

    // `B x;` resolved B through the symbol table.
    let (_, x) = find_decl(&output, &interner, "x").unwrap();
    let DeclKind::Variable { vtype, .. } = &x.kind else {
        panic!("expected variable");
    };
    let resolved = output.types.get(*vtype).as_declared();
    assert_eq!(
        resolved.map(|d| interner.resolve(output.decls.get(d).last_name())),
        Some("B")
    );
}

#[test]
fn member_access_levels_are_recorded() {
    let interner = StringInterner::new();
    let output = parse_source(
        "class C { int hidden; public: int shown; protected: int guarded; };",
        &interner,
    );
    assert!(!output.has_errors());
    use sable_ir::Access;
    let (_, hidden) = find_decl(&output, &interner, "hidden").unwrap();
    let (_, shown) = find_decl(&output, &interner, "shown").unwrap();
    let (_, guarded) = find_decl(&output, &interner, "guarded").unwrap();
    assert_eq!(hidden.access, Access::Private);
    assert_eq!(shown.access, Access::Public);
    assert_eq!(guarded.access, Access::Protected);
}

#[test]
fn forward_then_definition_supersedes() {
    let interner = StringInterner::new();
    let output = parse_source("class C;\nclass C { int m; };\nC obj;", &interner);
    assert!(!output.has_errors());
    let (_, obj) = find_decl(&output, &interner, "obj").unwrap();
    let DeclKind::Variable { vtype, .. } = &obj.kind else {
        panic!("expected variable");
    };
    let decl = output.types.get(*vtype).as_declared().unwrap();
    // The variable's type is the definition, not the forward.
    assert!(output.decls.get(decl).as_class().is_some());
}

#[test]
fn member_bodies_see_later_members() {
    let interner = StringInterner::new();
    let output = parse_source(
        "class C { int get() { return val; } int val; };",
        &interner,
    );
    assert!(!output.has_errors());
    let (_, class) = find_decl(&output, &interner, "C").unwrap();
    // get + val, in documentation order.
    assert_eq!(class.as_class().unwrap().scope.declarations.len(), 2);
}

#[test]
fn constructors_and_destructors() {
    let interner = StringInterner::new();
    let output = parse_source(
        "class C { public: C(int x); virtual ~C(); };\nC::C(int x) : dummy(x) { }",
        &interner,
    );
    assert!(!output.has_errors());
    let ctors: Vec<_> = output
        .decls
        .iter()
        .filter(|(_, d)| {
            d.as_function()
                .map(|f| interner.resolve(f.real_name) == "C")
                .unwrap_or(false)
        })
        .collect();
    assert!(!ctors.is_empty());
    let dtor = output
        .decls
        .iter()
        .find(|(_, d)| {
            d.as_function()
                .map(|f| interner.resolve(f.real_name) == "~C")
                .unwrap_or(false)
        });
    assert!(dtor.is_some());
}

#[test]
fn namespaces_nest_and_reopen() {
    let interner = StringInterner::new();
    let output = parse_source(
        "namespace N { int a; }\nnamespace N { int b; }",
        &interner,
    );
    assert!(!output.has_errors());
    let (_, ns) = find_decl(&output, &interner, "N").unwrap();
    let scope = ns.as_scope().unwrap();
    // Both blocks feed one namespace declaration.
    assert_eq!(scope.declarations.len(), 2);
    let roots = root_decls(&output);
    assert_eq!(
        roots
            .iter()
            .filter(|&&d| interner.resolve(output.decls.get(d).last_name()) == "N")
            .count(),
        1
    );
}

#[test]
fn using_directive_is_recorded() {
    let interner = StringInterner::new();
    let output = parse_source(
        "namespace B { int x; }\nnamespace A { using namespace B; }",
        &interner,
    );
    assert!(!output.has_errors());
    let (_, a) = find_decl(&output, &interner, "A").unwrap();
    let has_directive = a
        .as_scope()
        .unwrap()
        .declarations
        .iter()
        .any(|&d| matches!(output.decls.get(d).kind, DeclKind::UsingDirective { .. }));
    assert!(has_directive);
}

#[test]
fn typedefs_resolve_in_later_declarations() {
    let interner = StringInterner::new();
    let output = parse_source("typedef unsigned long size_type;\nsize_type n;", &interner);
    assert!(!output.has_errors());
    let (_, n) = find_decl(&output, &interner, "n").unwrap();
    let DeclKind::Variable { vtype, .. } = &n.kind else {
        panic!("expected variable");
    };
    let target = output.types.get(*vtype).as_declared().unwrap();
    assert!(matches!(
        output.decls.get(target).kind,
        DeclKind::Typedef { .. }
    ));
}

#[test]
fn enums_declare_their_enumerators() {
    let interner = StringInterner::new();
    let output = parse_source("enum Color { Red, Green = 5, Blue };", &interner);
    assert!(!output.has_errors());
    let (_, color) = find_decl(&output, &interner, "Color").unwrap();
    let DeclKind::Enum { enumerators } = &color.kind else {
        panic!("expected enum");
    };
    assert_eq!(enumerators.len(), 3);
    let green = output.decls.get(enumerators[1]);
    let DeclKind::Enumerator { value } = &green.kind else {
        panic!("expected enumerator");
    };
    assert_eq!(interner.resolve(*value), "5");
}

#[test]
fn class_templates_carry_their_parameters() {
    let interner = StringInterner::new();
    let output = parse_source("template<class T> class List { T* head; };", &interner);
    assert!(!output.has_errors());
    let (_, list) = find_decl(&output, &interner, "List").unwrap();
    let DeclKind::ClassTemplate { template, .. } = &list.kind else {
        panic!("expected class template, got {}", list.kind.kind_name());
    };
    let Type::Template { params, .. } = output.types.get(*template) else {
        panic!("expected template type");
    };
    assert_eq!(params.len(), 1);
    // The member's type resolved to the dependent parameter.
    let (_, head) = find_decl(&output, &interner, "head").unwrap();
    let DeclKind::Variable { vtype, .. } = &head.kind else {
        panic!("expected variable");
    };
    let Type::Modifier { alias, .. } = output.types.get(*vtype) else {
        panic!("expected pointer type");
    };
    assert!(matches!(output.types.get(*alias), Type::Dependent { .. }));
}

#[test]
fn operator_members_become_operations() {
    let interner = StringInterner::new();
    let output = parse_source(
        "class V { public: V operator+(const V& other); };",
        &interner,
    );
    assert!(!output.has_errors());
    let operation = output
        .decls
        .iter()
        .find(|(_, d)| matches!(d.kind, DeclKind::Operation(_)))
        .unwrap();
    assert_eq!(
        interner.resolve(operation.1.as_function().unwrap().real_name),
        "operator+"
    );
}

#[test]
fn comments_attach_to_the_following_declaration() {
    let interner = StringInterner::new();
    let output = parse_source("// the answer\nint answer;", &interner);
    assert!(!output.has_errors());
    let (_, decl) = find_decl(&output, &interner, "answer").unwrap();
    assert_eq!(decl.comments.len(), 1);
    assert_eq!(interner.resolve(decl.comments[0].text), "// the answer");
}

#[test]
fn one_bad_declaration_does_not_abort_the_unit() {
    let interner = StringInterner::new();
    let output = parse_source("int 5 ;\nint y;", &interner);
    assert!(output.has_errors());
    assert!(find_decl(&output, &interner, "y").is_some());
}

#[test]
fn error_budget_bounds_the_parse() {
    let interner = StringInterner::new();
    // Nothing here ever parses; the budget must stop the loop.
    let source = "$ % ^ ; ".repeat(40);
    let output = parse_source(&source, &interner);
    assert!(output.has_errors());
    assert!(output.diagnostics.len() <= sable_diagnostic::MAX_ERRORS + 1);
}

#[test]
fn function_bodies_parse_statements() {
    let interner = StringInterner::new();
    let output = parse_source(
        "int abs(int v) { if (v < 0) { return -v; } return v; }",
        &interner,
    );
    assert!(!output.has_errors());
    let func = output
        .decls
        .iter()
        .find(|(_, d)| d.as_function().map(|f| interner.resolve(f.real_name)) == Some("abs"));
    assert!(func.is_some());
}

#[test]
fn declaration_statements_win_over_expressions() {
    let interner = StringInterner::new();
    // `z * 3` must be an expression (z is a variable), while `T * p`
    // must be a declaration (T is a type).
    let output = parse_source(
        "class T {};\nvoid f() { int z; z * 3; T * p; }",
        &interner,
    );
    assert!(!output.has_errors());
    assert!(find_decl(&output, &interner, "p").is_some());
}

#[test]
fn linkage_specs_pass_through() {
    let interner = StringInterner::new();
    let output = parse_source("extern \"C\" { int c_func(int); }", &interner);
    assert!(!output.has_errors());
    let func = output
        .decls
        .iter()
        .find(|(_, d)| d.as_function().map(|f| interner.resolve(f.real_name)) == Some("c_func"));
    assert!(func.is_some());
}

#[test]
fn ptree_root_covers_all_definitions() {
    let interner = StringInterner::new();
    let output = parse_source("int a; int b;", &interner);
    let crate::PNode::List { children, .. } = output.ptree.get(output.tree_root) else {
        panic!("root must be a list");
    };
    assert_eq!(children.len(), 2);
}
