// Property-Based Testing for the type database
//
// Random class hierarchies (forests, chains and graphs with cycles) checked
// against the inheritance and member-lookup invariants.

use std::sync::Arc;

use asls_core::typedb::{DBMethod, DBProperty, DBSymbol, DBType, SymbolFilter, TypeDatabase, TypeKind};
use proptest::prelude::*;

fn class_name(i: usize) -> String {
    format!("C{i}")
}

/// `parents[i]` is the supertype index of class `i`, if any. Indices may
/// point anywhere, so cycles and self-loops occur.
fn hierarchy(max: usize) -> impl Strategy<Value = Vec<Option<usize>>> {
    (1..max).prop_flat_map(|n| prop::collection::vec(prop::option::of(0..n), n))
}

/// Same, but every parent precedes its child, so there are no cycles.
fn acyclic_hierarchy(max: usize) -> impl Strategy<Value = Vec<Option<usize>>> {
    (1..max).prop_flat_map(|n| {
        (0..n)
            .map(|i| if i == 0 { Just(None).boxed() } else { prop::option::of(0..i).boxed() })
            .collect::<Vec<_>>()
    })
}

fn build(parents: &[Option<usize>]) -> TypeDatabase {
    let mut db = TypeDatabase::new();
    for (i, parent) in parents.iter().enumerate() {
        let mut ty = DBType::new(class_name(i), TypeKind::Class);
        ty.supertype = parent.map(class_name);
        db.insert(ty);
    }
    db
}

/// Ancestors by following parent links from `i`, stopping at a repeat.
fn expected_chain(parents: &[Option<usize>], i: usize) -> Vec<String> {
    let mut chain = Vec::new();
    let mut seen = vec![false; parents.len()];
    let mut current = Some(i);
    while let Some(c) = current {
        if seen[c] {
            break;
        }
        seen[c] = true;
        chain.push(class_name(c));
        current = parents[c];
    }
    chain
}

/// Property: inheritance walks terminate, start at the type itself and match
/// the parent links, cycles included
#[test]
fn prop_inheritance_walk_follows_parents() {
    proptest!(|(parents in hierarchy(24))| {
        let db = build(&parents);
        for i in 0..parents.len() {
            let ty = db.get_type(&class_name(i)).unwrap();
            let chain: Vec<String> = ty.inheritance_types(&db).map(|t| t.typename.clone()).collect();
            prop_assert_eq!(&chain, &expected_chain(&parents, i));
            prop_assert!(ty.inherits_from(&db, &class_name(i)));
        }
    });
}

/// Property: inherits_from is transitive on acyclic hierarchies
#[test]
fn prop_inherits_from_is_transitive() {
    proptest!(|(parents in acyclic_hierarchy(16))| {
        let db = build(&parents);
        let n = parents.len();
        let types: Vec<Arc<DBType>> = (0..n).map(|i| db.get_type(&class_name(i)).unwrap()).collect();
        for a in 0..n {
            for b in 0..n {
                if !types[a].inherits_from(&db, &class_name(b)) {
                    continue;
                }
                for c in 0..n {
                    if types[b].inherits_from(&db, &class_name(c)) {
                        prop_assert!(types[a].inherits_from(&db, &class_name(c)), "C{} C{} C{}", a, b, c);
                    }
                }
                if a != b {
                    prop_assert!(!types[b].inherits_from(&db, &class_name(a)), "C{} and C{} inherit each other", a, b);
                }
            }
        }
    });
}

/// Property: lookups return the nearest declaration and respect the filter
#[test]
fn prop_member_lookup_finds_nearest_declaration() {
    let strategy = acyclic_hierarchy(12).prop_flat_map(|parents| {
        let n = parents.len();
        // Per class: declares `Value` as nothing (0), a method (1) or a property (2).
        (Just(parents), prop::collection::vec(0u8..3, n))
    });
    proptest!(|((parents, members) in strategy)| {
        let mut db = TypeDatabase::new();
        for (i, parent) in parents.iter().enumerate() {
            let owner = class_name(i);
            let mut ty = DBType::new(owner.clone(), TypeKind::Class);
            ty.supertype = parent.map(class_name);
            match members[i] {
                1 => ty.methods.push(Arc::new(DBMethod {
                    name: "Value".to_string(),
                    return_type: "int".to_string(),
                    containing_type: owner,
                    ..DBMethod::default()
                })),
                2 => ty.properties.push(Arc::new(DBProperty {
                    name: "Value".to_string(),
                    typename: "int".to_string(),
                    containing_type: owner,
                    ..DBProperty::default()
                })),
                _ => {}
            }
            db.insert(ty);
        }

        for i in 0..parents.len() {
            let ty = db.get_type(&class_name(i)).unwrap();
            let chain = expected_chain(&parents, i);
            let nearest = |wanted: &[u8]| {
                chain.iter().find(|name| {
                    let index: usize = name[1..].parse().unwrap();
                    wanted.contains(&members[index])
                })
            };

            let any = ty.find_first_symbol(&db, "Value", SymbolFilter::Any);
            prop_assert_eq!(any.as_ref().map(|s| s.containing_type()), nearest(&[1, 2]).map(String::as_str));

            let function = ty.find_first_symbol(&db, "Value", SymbolFilter::FunctionOnly);
            prop_assert!(function.iter().all(|s| matches!(s, DBSymbol::Method(_))));
            prop_assert_eq!(function.as_ref().map(|s| s.containing_type()), nearest(&[1]).map(String::as_str));

            let property = ty.find_first_symbol(&db, "Value", SymbolFilter::PropertyOnly);
            prop_assert!(property.iter().all(|s| matches!(s, DBSymbol::Property(_))));
            prop_assert_eq!(property.as_ref().map(|s| s.containing_type()), nearest(&[2]).map(String::as_str));
        }
    });
}

/// Property: written typenames resolve through qualifiers and template arguments
#[test]
fn prop_resolve_typename_ignores_decoration() {
    let names = prop::sample::select(vec!["int", "float", "FString", "FName", "bool"]);
    let decoration = prop::sample::select(vec![
        ("", ""),
        ("const ", ""),
        ("const ", "&"),
        ("", "&in"),
        ("const ", "&in"),
        ("", "&out"),
        ("", "@"),
    ]);
    proptest!(|(name in names, (prefix, suffix) in decoration)| {
        let db = TypeDatabase::new();
        let written = format!("{prefix}{name}{suffix}");
        let resolved = db.resolve_typename(&written);
        prop_assert_eq!(resolved.map(|t| t.typename.clone()), Some(name.to_string()));
    });
}
