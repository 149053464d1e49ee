//! Symbol-table behavior: declare/find, base-class search, using
//! closures, overload costs, and encoding round trips.

use pretty_assertions::assert_eq;
use sable_ir::{
    ClassKey, Encoding, Mods, Parameter, ScopedName, StringInterner, Type, TypeId,
};
use sable_resolve::{encode_type, Builder, Decoder, NamespaceKind, REJECT};
use smallvec::smallvec;

fn builder(interner: &StringInterner) -> Builder<'_> {
    Builder::new(interner, interner.intern("test.cc"))
}

fn int_param(builder: &mut Builder<'_>, interner: &StringInterner, name: &str) -> Parameter {
    let int_t = builder.create_base(interner.intern("int"));
    Parameter::new(int_t, interner.intern(name))
}

/// Declare-then-find: an unqualified lookup immediately after `declare`
/// returns the new declaration.
#[test]
fn declare_then_find() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let x = interner.intern("x");
    let int_t = b.create_base(interner.intern("int"));
    let decl = b.add_variable(4, x, int_t, false);

    let search = b.infos()[b.scope_info().index()].search.clone();
    let found = b.lookup().unqualified(x, &search, false).expect("x visible");
    assert_eq!(b.types().get(found).as_declared(), Some(decl));
}

/// Scenario A: `class A {}; class B : public A {}; B x;` — members of A
/// resolve from inside B via base-class search even though B's own
/// dictionary has no entry.
#[test]
fn base_class_member_search() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let int_t = b.create_base(interner.intern("int"));

    let a = b.start_class(1, ClassKey::Class, interner.intern("A"), None);
    let m = interner.intern("m");
    let m_decl = b.add_variable(1, m, int_t, false);
    b.end_class();

    b.start_class(2, ClassKey::Class, interner.intern("B"), None);
    let a_type = b.declared_type(a);
    b.add_inheritance(a_type, smallvec![interner.intern("public")]);
    b.update_base_search();

    let search = b.infos()[b.scope_info().index()].search.clone();
    let found = b.lookup().unqualified(m, &search, false).expect("m via base");
    assert_eq!(b.types().get(found).as_declared(), Some(m_decl));
    b.end_class();
}

/// Using-directive closure: names declared in the used namespace before
/// *and after* the directive are visible, and the visibility is
/// transitive through later directives.
#[test]
fn using_directive_closure() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let int_t = b.create_base(interner.intern("int"));

    // namespace B { int early; }
    let ns_b = b.start_namespace(1, NamespaceKind::Named, Some(interner.intern("B")));
    let early = interner.intern("early");
    b.add_variable(1, early, int_t, false);
    b.end_namespace();

    // namespace A { using namespace B; }
    b.start_namespace(2, NamespaceKind::Named, Some(interner.intern("A")));
    let b_type = b.declared_type(ns_b);
    b.add_using_directive(2, b_type);
    let a_search = b.infos()[b.scope_info().index()].search.clone();
    b.end_namespace();

    // namespace B { int late; } — reopened after the directive.
    b.start_namespace(3, NamespaceKind::Named, Some(interner.intern("B")));
    let late = interner.intern("late");
    b.add_variable(3, late, int_t, false);
    b.end_namespace();

    assert!(b.lookup().unqualified(early, &a_search, false).is_some());
    assert!(
        b.lookup().unqualified(late, &a_search, false).is_some(),
        "names declared after the directive are visible through it"
    );

    // namespace C { using namespace A; } — transitive closure.
    let ns_a = b
        .lookup()
        .unqualified(interner.intern("A"), &a_search, false)
        .and_then(|t| b.types().get(t).as_declared());
    b.start_namespace(4, NamespaceKind::Named, Some(interner.intern("C")));
    let a_type = b.declared_type(ns_a.expect("A resolves"));
    b.add_using_directive(4, a_type);
    let c_search = b.infos()[b.scope_info().index()].search.clone();
    b.end_namespace();

    assert!(b.lookup().unqualified(early, &c_search, false).is_some());
    assert!(b.lookup().unqualified(late, &c_search, false).is_some());
}

/// Scenario B: `namespace N { int f(int); int f(double); } N::f(3)` —
/// an integer argument selects `f(int)` at cost 0 over `f(double)` at
/// cost 10 or more.
#[test]
fn overload_picks_exact_match() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let int_t = b.create_base(interner.intern("int"));
    let double_t = b.create_base(interner.intern("double"));
    let f = interner.intern("f");

    b.start_namespace(1, NamespaceKind::Named, Some(interner.intern("N")));
    let mut args_int = Encoding::new();
    args_int.append_byte(b'i');
    let p_int = int_param(&mut b, &interner, "a");
    let f_int = b.add_function(
        1,
        Vec::new(),
        int_t,
        Vec::new(),
        f,
        &args_int,
        vec![p_int],
        None,
        false,
    );
    let mut args_double = Encoding::new();
    args_double.append_byte(b'd');
    let p_double = Parameter::new(double_t, interner.intern("a"));
    let f_double = b.add_function(
        1,
        Vec::new(),
        int_t,
        Vec::new(),
        f,
        &args_double,
        vec![p_double],
        None,
        false,
    );
    let n_search = b.infos()[b.scope_info().index()].search.clone();
    b.end_namespace();

    let lookup = b.lookup();
    let best = lookup.lookup_func(f, &n_search, &[int_t]).expect("viable");
    assert_eq!(best, f_int);

    // The costs themselves follow the fixed heuristic.
    let (_, cost_int) = lookup.best_function(&[f_int], &[int_t]).unwrap();
    let (_, cost_double) = lookup.best_function(&[f_double], &[int_t]).unwrap();
    assert_eq!(cost_int, 0);
    assert!(cost_double >= 10);
}

/// Overload monotonicity: a strictly cheaper candidate wins once added,
/// and removing the winner leaves the runner-up's cost unchanged.
#[test]
fn overload_monotonicity() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let int_t = b.create_base(interner.intern("int"));
    let double_t = b.create_base(interner.intern("double"));
    let f = interner.intern("f");

    let mut args_double = Encoding::new();
    args_double.append_byte(b'd');
    let p_double = Parameter::new(double_t, interner.intern("a"));
    let f_double = b.add_function(
        1,
        Vec::new(),
        int_t,
        Vec::new(),
        f,
        &args_double,
        vec![p_double],
        None,
        false,
    );
    let mut args_int = Encoding::new();
    args_int.append_byte(b'i');
    let p_int = int_param(&mut b, &interner, "a");
    let f_int = b.add_function(
        1,
        Vec::new(),
        int_t,
        Vec::new(),
        f,
        &args_int,
        vec![p_int],
        None,
        false,
    );

    let lookup = b.lookup();
    let (winner_before, _) = lookup.best_function(&[f_double], &[int_t]).unwrap();
    assert_eq!(winner_before, f_double);

    // Adding the strictly cheaper candidate flips the result.
    let (winner_after, cost_after) = lookup.best_function(&[f_double, f_int], &[int_t]).unwrap();
    assert_eq!(winner_after, f_int);
    assert_eq!(cost_after, 0);

    // Removing the winner does not change the remaining best's cost:
    // candidate costs are independent of the candidate set.
    let (_, cost_remaining) = lookup.best_function(&[f_double], &[int_t]).unwrap();
    assert_eq!(cost_remaining, 10);
}

/// An argument count that cannot fit rejects the candidate outright.
#[test]
fn overload_arity_rejection() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let int_t = b.create_base(interner.intern("int"));
    let f = interner.intern("f");
    let mut args = Encoding::new();
    args.append_byte(b'i');
    let p = int_param(&mut b, &interner, "a");
    let f_one = b.add_function(1, Vec::new(), int_t, Vec::new(), f, &args, vec![p], None, false);

    let lookup = b.lookup();
    let (_, cost) = lookup
        .best_function(&[f_one], &[int_t, int_t, int_t])
        .unwrap();
    assert!(cost >= REJECT);
}

/// Scenario C: a forward declaration hands back a placeholder; after the
/// definition the same name resolves to the concrete class, and the
/// member is visible through it.
#[test]
fn forward_then_define_shares_scope() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let c = interner.intern("C");
    let m = interner.intern("m");
    let int_t = b.create_base(interner.intern("int"));

    b.add_forward(1, c, None);
    let search = b.infos()[b.scope_info().index()].search.clone();
    let before = b.lookup().unqualified(c, &search, false).expect("forward visible");
    assert!(b.lookup().as_class_decl(before).is_none());

    let class = b.start_class(2, ClassKey::Class, c, None);
    b.add_variable(2, m, int_t, false);
    b.end_class();

    let after = b.lookup().unqualified(c, &search, false).expect("class visible");
    assert_eq!(
        b.lookup().as_class_decl(after),
        Some(class),
        "definition supersedes the forward placeholder"
    );

    // Member lookup goes through the one true scope.
    let info = b.lookup().info_of(class).expect("class scope info");
    let found = b.lookup().qualified(m, info, false).expect("m in C");
    assert_eq!(b.types().get(found).as_declared().map(|d| b.decls().get(d).last_name()), Some(m));
}

/// `map_name` walks a qualified name down from the global scope,
/// returning the containing scopes and the final entity.
#[test]
fn map_name_returns_scope_chain() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let int_t = b.create_base(interner.intern("int"));

    let outer = b.start_namespace(1, NamespaceKind::Named, Some(interner.intern("outer")));
    let inner = b.start_namespace(1, NamespaceKind::Named, Some(interner.intern("inner")));
    let x = interner.intern("x");
    let x_decl = b.add_variable(2, x, int_t, false);
    b.end_namespace();
    b.end_namespace();

    let names = [interner.intern("outer"), interner.intern("inner"), x];
    let (scopes, entity) = b.lookup().map_name(&names).expect("maps");
    assert_eq!(scopes, vec![outer, inner]);
    assert_eq!(b.types().get(entity).as_declared(), Some(x_decl));
}

/// Block scopes get deterministic unique names: `if`, then `if2`.
#[test]
fn unique_block_scope_names() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let if_kind = interner.intern("if");

    let first = b.start_namespace(1, NamespaceKind::Unique, Some(if_kind));
    b.end_namespace();
    let second = b.start_namespace(2, NamespaceKind::Unique, Some(if_kind));
    b.end_namespace();

    assert_eq!(interner.resolve(b.decls().get(first).last_name()), "`if");
    assert_eq!(interner.resolve(b.decls().get(second).last_name()), "`if2");
}

/// Reopening a named namespace reuses the original scope.
#[test]
fn namespace_reopening_reuses_scope() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let n = interner.intern("N");

    let first = b.start_namespace(1, NamespaceKind::Named, Some(n));
    b.end_namespace();
    let second = b.start_namespace(5, NamespaceKind::Named, Some(n));
    b.end_namespace();
    assert_eq!(first, second);
}

/// `resolve_type` upgrades an `Unknown` once the real declaration
/// appears, and leaves it alone otherwise.
#[test]
fn resolve_type_upgrades_unknowns() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let c = interner.intern("C");

    let unknown = b.lookup_type_or_unknown(c, false);
    assert!(b.types().get(unknown).is_unknown());
    assert_eq!(b.resolve_type(unknown), unknown);

    let class = b.start_class(3, ClassKey::Class, c, None);
    b.end_class();

    let resolved = b.resolve_type(unknown);
    assert_eq!(b.types().get(resolved).as_declared(), Some(class));
}

/// Multiple candidates resolve deterministically to the first in search
/// order; the ambiguity is tolerated, not rejected.
#[test]
fn ambiguous_lookup_first_match_wins() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let int_t = b.create_base(interner.intern("int"));
    let x = interner.intern("x");

    // Two namespaces both declaring x, both used from a third scope.
    let mut ns_types = Vec::new();
    for name in ["P", "Q"] {
        let ns = b.start_namespace(1, NamespaceKind::Named, Some(interner.intern(name)));
        b.add_variable(1, x, int_t, false);
        b.end_namespace();
        ns_types.push(b.declared_type(ns));
    }
    b.start_namespace(2, NamespaceKind::Named, Some(interner.intern("R")));
    for t in ns_types {
        b.add_using_directive(2, t);
    }
    let search = b.infos()[b.scope_info().index()].search.clone();
    b.end_namespace();

    let first = b.lookup().unqualified(x, &search, false).expect("resolves");
    let again = b.lookup().unqualified(x, &search, false).expect("resolves");
    assert_eq!(first, again, "deterministic first-discovered winner");
    let decl = b.types().get(first).as_declared().unwrap();
    let qualified: ScopedName = b.decls().get(decl).name.clone();
    assert_eq!(interner.join(&qualified), "P::x", "first directive wins");
}

/// Round trip: decoding an encoding and re-encoding the resulting type
/// graph reproduces the bytes, across pointers, cv-qualifiers,
/// functions and template instantiations.
#[test]
fn encoding_round_trip() {
    let interner = StringInterner::new();

    let mut shapes: Vec<Encoding> = Vec::new();
    // const char*
    let mut e = Encoding::new();
    e.append_byte(b'c');
    e.ptr_operator(b'*');
    e.cv_qualify(true, false);
    shapes.push(e);
    // unsigned long**
    let mut e = Encoding::new();
    e.append_byte(b'U');
    e.append_byte(b'l');
    e.ptr_operator(b'*');
    e.ptr_operator(b'*');
    shapes.push(e);
    // int (*)(double, bool&)
    let mut ret = Encoding::new();
    ret.append_byte(b'i');
    let mut e = Encoding::new();
    e.start_function(&ret);
    e.append_byte(b'd');
    let mut arg = Encoding::new();
    arg.append_byte(b'b');
    arg.ptr_operator(b'&');
    e.append(&arg);
    e.end_function();
    shapes.push(e);
    // vector<int> (template instantiation)
    let mut args = Encoding::new();
    args.append_byte(b'i');
    let mut e = Encoding::new();
    e.template_args("vector", &args);
    shapes.push(e);

    for original in shapes {
        let mut b = builder(&interner);
        let ty = {
            let mut decoder = Decoder::new(&original, 1, &mut b);
            decoder.decode_type().expect("decodes")
        };
        let mut reencoded = Encoding::new();
        encode_type(b.types(), &interner, ty, &mut reencoded);
        assert_eq!(
            reencoded.bytes(),
            original.bytes(),
            "round trip of {original}"
        );
    }
}

/// Decoding a qualified name asks the symbol table, and an unresolved
/// one degrades to an `Unknown` placeholder rather than an error.
#[test]
fn decode_qualified_name_unresolved_is_unknown() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let mut e = Encoding::new();
    e.simple_name("std");
    e.simple_name("string");
    e.qualified(2);

    let ty = {
        let mut decoder = Decoder::new(&e, 1, &mut b);
        decoder.decode_type().expect("decodes to a placeholder")
    };
    assert!(b.types().get(ty).is_unknown());
}

/// The decoder's name peek does not consume.
#[test]
fn decoder_peek_is_name() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let mut named = Encoding::new();
    named.simple_name("Foo");
    let decoder = Decoder::new(&named, 1, &mut b);
    assert!(decoder.peek_is_name());
    assert_eq!(decoder.position(), 0);

    let mut coded = Encoding::new();
    coded.append_byte(b'i');
    let mut b2 = builder(&interner);
    let decoder = Decoder::new(&coded, 1, &mut b2);
    assert!(!decoder.peek_is_name());
}

/// An `Unknown` decoded from a pointer-to-unknown chain still carries
/// its modifiers.
#[test]
fn decode_modified_user_type() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    b.start_class(1, ClassKey::Class, interner.intern("Foo"), None);
    b.end_class();

    let mut e = Encoding::new();
    e.simple_name("Foo");
    e.ptr_operator(b'*');
    let ty = {
        let mut decoder = Decoder::new(&e, 1, &mut b);
        decoder.decode_type().expect("decodes")
    };
    match b.types().get(ty) {
        Type::Modifier { alias, post, .. } => {
            assert_eq!(post.len(), 1);
            assert!(b.lookup().as_class_decl(*alias).is_some());
        }
        other => panic!("expected modifier, got {other:?}"),
    }
}

/// Redefinition of a non-overloadable name is reported with both sites.
#[test]
fn redefinition_is_reported() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let int_t = b.create_base(interner.intern("int"));
    let x = interner.intern("x");
    b.add_variable(1, x, int_t, false);
    b.add_variable(7, x, int_t, false);
    assert_eq!(b.sink().error_count(), 1);
    let diag = &b.sink().diagnostics()[0];
    assert_eq!(diag.line, 7);
}

/// A `TypeId` placeholder return type encodes as `?`.
#[test]
fn invalid_type_encodes_placeholder() {
    let interner = StringInterner::new();
    let b = builder(&interner);
    let mut out = Encoding::new();
    encode_type(b.types(), &interner, TypeId::INVALID, &mut out);
    assert_eq!(out.to_string(), "?");
}

/// Mods type alias sanity for inheritance attribute lists.
#[test]
fn inheritance_records_keep_order() {
    let interner = StringInterner::new();
    let mut b = builder(&interner);
    let base = b.start_class(1, ClassKey::Class, interner.intern("Base"), None);
    b.end_class();
    b.start_class(2, ClassKey::Class, interner.intern("Derived"), None);
    let base_ty = b.declared_type(base);
    let attrs: Mods = smallvec![interner.intern("virtual"), interner.intern("public")];
    b.add_inheritance(base_ty, attrs);
    b.update_base_search();
    let class = b.scope();
    b.end_class();

    let parents = &b.decls().get(class).as_class().unwrap().parents;
    assert_eq!(parents.len(), 1);
    assert_eq!(interner.resolve(parents[0].attributes[0]), "virtual");
}
