// Property-Based Testing for the scope/statement tree
//
// Invariants that must hold for ANY text, well-formed or not:
// 1. Building never panics, including on every prefix of a valid module
// 2. Scopes and statements stay ordered, contained and in bounds
// 3. Statement content is exactly the source it spans
// 4. Offsets and editor positions convert back and forth without loss
// 5. Rebuilding the same text gives the same tree

use asls_core::analyze_source;
use asls_core::module::{Element, Module};
use proptest::prelude::*;

const VALID: &str = "\
import Game.Base;

UCLASS()
class AHero : ABase
{
    UPROPERTY()
    TArray<int> Scores;

    void Tick(float DeltaTime)
    {
        for (int i = 0; i < Scores.Num(); i++)
        {
            if (Scores[i] > 10)
                Scores[i] = 0;
        }
        switch (Mode)
        {
            case EMode::A:
                break;
            default:
        }
    }
}

enum EMode
{
    A,
    B = 2,
}

namespace Utils
{
    int Twice(int V) { return V * 2; }
}
";

/// Script-shaped noise: keywords, braces, separators and the odd multi-byte character.
fn script_like() -> impl Strategy<Value = String> {
    let piece = prop::sample::select(vec![
        "class A", "struct F", "enum E", "namespace N", "void F()", "int X", " = ", "1", ";", ":", "{", "}",
        "(", ")", "if (X)", "else", "for (;;)", "switch (E)", "case E::A:", "default:", "return", "auto",
        "\n", " ", "\t", "// note\n", "/* c */", "\"s\"", "日本", "é", "\r\n", "::", ".", ",",
    ]);
    prop::collection::vec(piece, 0..80).prop_map(|parts| parts.concat())
}

fn check_tree(module: &Module) -> Result<(), TestCaseError> {
    let text = module.text();
    for id in module.scope_ids() {
        let scope = module.scope(id);
        prop_assert!(scope.span.start <= scope.span.end && scope.span.end <= text.len());
        if let Some(parent) = scope.parent {
            let outer = module.scope(parent).span;
            prop_assert!(outer.start <= scope.span.start && scope.span.end <= outer.end);
        }
        let mut last_end = scope.span.start;
        for (i, child) in scope.children.iter().enumerate() {
            let span = module.element_span(*child);
            prop_assert!(span.start >= last_end, "{:?} starts before its sibling ends", child);
            prop_assert!(span.end <= scope.span.end, "{:?} leaks out of its scope", child);
            last_end = span.end;

            let expected_previous = i.checked_sub(1).map(|p| scope.children[p]);
            prop_assert_eq!(module.previous_element(*child), expected_previous);
            prop_assert_eq!(module.next_element(*child), scope.children.get(i + 1).copied());
        }
    }
    for id in module.statement_ids() {
        let stmt = module.statement(id);
        prop_assert_eq!(text.get(stmt.span.start..stmt.span.end), Some(stmt.content.as_str()));
        prop_assert!(module.scope(stmt.scope).children.contains(&Element::Statement(id)));
        prop_assert_eq!(stmt.ast.is_none(), stmt.error.is_some());
    }
    Ok(())
}

#[test]
fn prop_tree_invariants_on_noise() {
    proptest!(|(source in script_like())| {
        let module = Module::new("Noise", source.as_str());
        check_tree(&module)?;
    });
}

#[test]
fn prop_tree_invariants_on_any_text() {
    proptest!(|(source in "\\PC{0,400}")| {
        let module = Module::new("Any", source.as_str());
        check_tree(&module)?;
    });
}

/// Property: every prefix of a valid module builds, as it would mid-typing
#[test]
fn prop_truncated_module_builds() {
    let boundaries: Vec<usize> = (0..=VALID.len()).filter(|i| VALID.is_char_boundary(*i)).collect();
    proptest!(|(cut in prop::sample::select(boundaries))| {
        let module = Module::new("Typing", &VALID[..cut]);
        check_tree(&module)?;
        let _ = analyze_source("Typing", &VALID[..cut]);
    });
}

/// Property: offset → position → offset is the identity on char boundaries
#[test]
fn prop_positions_round_trip() {
    proptest!(|(source in script_like())| {
        let module = Module::new("Positions", source.as_str());
        for offset in (0..=source.len()).filter(|i| source.is_char_boundary(*i)) {
            let pos = module.position_at(offset);
            prop_assert_eq!(module.offset_at(pos), offset, "at {:?}", pos);
        }
    });
}

/// Property: the innermost scope at an offset contains it
#[test]
fn prop_scope_at_contains_offset() {
    proptest!(|(source in script_like())| {
        let module = Module::new("Lookup", source.as_str());
        for offset in (0..=source.len()).filter(|i| source.is_char_boundary(*i)) {
            let scope = module.scope_at(offset);
            prop_assert!(module.scope(scope).contains(offset));
            if let Some(stmt) = module.statement_at(offset) {
                let span = module.statement(stmt).span;
                prop_assert!(span.start <= offset && offset <= span.end);
            }
        }
    });
}

/// Property: building the same text twice gives the same tree
#[test]
fn prop_rebuild_is_identical() {
    proptest!(|(source in script_like())| {
        let first = Module::new("Again", source.as_str());
        let mut second = Module::new("Again", "");
        second.update(source.as_str());
        prop_assert_eq!(first.scope_ids().count(), second.scope_ids().count());
        prop_assert_eq!(first.statement_ids().count(), second.statement_ids().count());
        for id in first.scope_ids() {
            prop_assert_eq!(first.scope(id), second.scope(id));
        }
        for id in first.statement_ids() {
            prop_assert_eq!(first.statement(id), second.statement(id));
        }
    });
}
