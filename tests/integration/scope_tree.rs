//! Scope/statement tree construction and the module query surface.

use asls_core::module::{Element, Module, ScopeId, ScopeType};
use asls_core::parser::ast::NodeTag;
use insta::assert_snapshot;
use lsp_types::Position;

const ACTOR: &str = "\
import Gameplay.Weapons;

UCLASS()
class AHero : ACharacter
{
    UPROPERTY()
    float Speed = 300.f;

    void BeginPlay()
    {
        if (Speed > 0)
        {
            Speed = 0;
        }
        else
        {
            Speed = 1;
        }
    }
}

namespace HeroUtils
{
    int Twice(int Value)
    {
        return Value * 2;
    }
}
";

/// One line per scope: type, header node and nesting.
fn outline(module: &Module) -> String {
    fn walk(module: &Module, scope: ScopeId, depth: usize, out: &mut String) {
        let header = module.scope_declaration(scope).map(|n| format!(" {:?}", n.tag())).unwrap_or_default();
        out.push_str(&format!("{}{:?}{}\n", "  ".repeat(depth), module.scope(scope).scope_type, header));
        for child in module.scope(scope).subscopes() {
            walk(module, child, depth + 1, out);
        }
    }
    let mut out = String::new();
    walk(module, module.root(), 0, &mut out);
    out
}

#[test]
fn outline_of_a_typical_module() {
    let module = Module::new("Game.Hero", ACTOR);
    assert_snapshot!(outline(&module).trim_end(), @r"
    Global
      Class ClassDefinition
        Function FunctionDecl
          Other IfStatement
          Other ElseStatement
      Namespace NamespaceDefinition
        Function FunctionDecl
    ");
}

#[test]
fn children_are_ordered_and_contained() {
    let module = Module::new("Game.Hero", ACTOR);
    for id in module.scope_ids() {
        let scope = module.scope(id);
        let mut last_end = scope.span.start;
        for child in &scope.children {
            let span = module.element_span(*child);
            assert!(span.start >= last_end, "{child:?} starts before its previous sibling ends");
            assert!(span.end <= scope.span.end, "{child:?} leaks out of its scope");
            last_end = span.end;
        }
    }
}

#[test]
fn header_and_block_are_linked() {
    let module = Module::new("Game.Hero", ACTOR);
    let offset = ACTOR.find("Speed = 0").unwrap();
    let block = module.scope_at(offset);
    let header = module.scope(block).declaration.unwrap();
    assert_eq!(module.statement(header).next, Some(Element::Scope(block)));
    assert_eq!(module.previous_element(Element::Scope(block)), Some(Element::Statement(header)));
    assert_eq!(module.scope_declaration(block).unwrap().tag(), NodeTag::IfStatement);
}

#[test]
fn statement_at_resolves_innermost_statement() {
    let module = Module::new("Game.Hero", ACTOR);
    let offset = ACTOR.find("return Value").unwrap();
    let stmt = module.statement_at(offset).unwrap();
    assert_eq!(module.statement(stmt).ast.as_ref().unwrap().tag(), NodeTag::ReturnStatement);
    assert_eq!(module.scope(module.statement(stmt).scope).scope_type, ScopeType::Function);
    assert_eq!(module.namespace_path(module.statement(stmt).scope).as_deref(), Some("HeroUtils"));
}

#[test]
fn statements_keep_raw_text() {
    let module = Module::new("Game.Hero", ACTOR);
    let offset = ACTOR.find("float Speed").unwrap();
    let stmt = module.statement(module.statement_at(offset).unwrap());
    assert!(stmt.content.starts_with("\n    UPROPERTY()"));
    assert!(stmt.content.ends_with("300.f;"));
    assert_eq!(&ACTOR[stmt.span.start..stmt.span.end], stmt.content);
}

#[test]
fn macro_is_attached_to_the_declaration() {
    let module = Module::new("Game.Hero", ACTOR);
    let offset = ACTOR.find("float Speed").unwrap();
    let ast = module.statement(module.statement_at(offset).unwrap()).ast.clone().unwrap();
    assert_eq!(ast.tag(), NodeTag::VariableDecl);
    assert_eq!(ast.macro_node().map(|m| m.tag()), Some(NodeTag::Macro));
}

#[test]
fn positions_round_trip() {
    let module = Module::new("Game.Hero", ACTOR);
    let offset = ACTOR.find("BeginPlay").unwrap();
    let pos = module.position_at(offset);
    assert_eq!(pos, Position::new(8, 9));
    assert_eq!(module.offset_at(pos), offset);
    assert_eq!(module.line_text(8), "    void BeginPlay()");
    assert!(module.is_line_empty(1));
}

#[test]
fn reparsing_unchanged_text_is_identical() {
    let first = Module::new("Game.Hero", ACTOR);
    let mut second = first.clone();
    second.update(ACTOR);
    assert_eq!(first.scope_ids().count(), second.scope_ids().count());
    for id in first.scope_ids() {
        assert_eq!(first.scope(id), second.scope(id));
    }
    for id in first.statement_ids() {
        assert_eq!(first.statement(id), second.statement(id));
    }
}

#[test]
fn unicode_columns_are_utf16() {
    let module = Module::new("M", "FString S = \"日本\"; int X;");
    let offset = module.text().find("int X").unwrap();
    let pos = module.position_at(offset);
    assert_eq!(pos.line, 0);
    assert_eq!(pos.character, 18);
    assert_eq!(module.offset_at(pos), offset);
}
