//! Type database and expression resolution across modules, driven through a
//! workspace the way an editor session would.

use std::sync::Arc;

use asls_core::parser::ast::NodeKind;
use asls_core::resolve::{classify_conversion, resolve_expression, Conversion, ExprType};
use asls_core::typedb::{DBMethod, DBProperty, DBSymbol, DBType, SymbolFilter, TypeKind};
use asls_core::{Config, Workspace};

const HIERARCHY: &str = "\
class A
{
    int X;
    void Shared() {}
}

class B : A
{
    void F() {}
    float Shared;
}
";

fn workspace(modules: &[(&str, &str)]) -> Workspace {
    let mut ws = Workspace::new(Config::default());
    for (name, text) in modules {
        ws.open_module(name, *text);
    }
    ws
}

/// Resolve the initializer (or whole expression) of the statement containing `marker`.
fn resolve_at(ws: &Workspace, module: &str, marker: &str) -> ExprType {
    let module = ws.module(module).unwrap();
    let offset = module.text().find(marker).unwrap();
    let stmt = module.statement(module.statement_at(offset).unwrap());
    let ast = stmt.ast.as_ref().unwrap();
    let expr = match &ast.kind {
        NodeKind::VariableDecl(decl) => decl.init.as_deref().unwrap(),
        NodeKind::ReturnStatement(Some(value)) => &**value,
        _ => ast,
    };
    resolve_expression(module, ws.db(), stmt.scope, expr)
}

fn typename(ty: &ExprType) -> Option<&str> {
    ty.as_type().map(|t| t.typename.as_str())
}

#[test]
fn inheritance_walk_is_ordered_and_reflexive() {
    let ws = workspace(&[("Hierarchy", HIERARCHY)]);
    let b = ws.db().get_type("B").unwrap();
    assert!(b.inherits_from(ws.db(), "A"));
    assert!(b.inherits_from(ws.db(), "B"));
    let a = ws.db().get_type("A").unwrap();
    assert!(!a.inherits_from(ws.db(), "B"));

    let chain: Vec<String> = b.inheritance_types(ws.db()).map(|t| t.typename.clone()).collect();
    assert_eq!(chain, ["B", "A"]);
}

#[test]
fn derived_declarations_shadow_and_filters_apply() {
    let ws = workspace(&[("Hierarchy", HIERARCHY)]);
    let b = ws.db().get_type("B").unwrap();

    match b.find_first_symbol(ws.db(), "Shared", SymbolFilter::Any).unwrap() {
        DBSymbol::Property(prop) => assert_eq!(prop.containing_type, "B"),
        other => panic!("expected B's property, got {other:?}"),
    }
    match b.find_first_symbol(ws.db(), "Shared", SymbolFilter::FunctionOnly).unwrap() {
        DBSymbol::Method(method) => assert_eq!(method.containing_type, "A"),
        other => panic!("FunctionOnly returned {other:?}"),
    }
    assert!(b.find_first_symbol(ws.db(), "X", SymbolFilter::FunctionOnly).is_none());
    assert_eq!(b.get_property(ws.db(), "X").unwrap().containing_type, "A");
}

#[test]
fn upcast_across_modules() {
    let user = "\
import Hierarchy;

void Use()
{
    B x;
    A a = x;
}
";
    let ws = workspace(&[("Hierarchy", HIERARCHY), ("User", user)]);
    let source = resolve_at(&ws, "User", "A a = x");
    assert_eq!(typename(&source), Some("B"));

    let a = ws.db().get_type("A").unwrap();
    assert_eq!(classify_conversion(ws.db(), &source, &a), Some(Conversion::Implicit));
    let b = ws.db().get_type("B").unwrap();
    let base = ExprType::Type(a);
    assert_eq!(classify_conversion(ws.db(), &base, &b), Some(Conversion::Cast));
}

#[test]
fn expressions_through_members_calls_and_auto() {
    let text = "\
class AWeapon
{
    int Ammo;
    AWeapon Next;
    int GetDamage() { return 1; }
    float GetRange() property { return 1.f; }
}

void Use(AWeapon Gun, TArray<AWeapon> Rack)
{
    auto Chained = Gun.Next.Next;
    auto Damage = Gun.GetDamage();
    auto Range = Gun.Range;
    auto First = Rack[0];
    auto Mixed = Gun.Ammo * 2.0;
    bool Empty = Gun.Ammo == 0;
    auto Again = Chained;
    auto Missing = Gun.Nothing;
    AWeapon None = nullptr;
}
";
    let ws = workspace(&[("Weapons", text)]);
    assert_eq!(typename(&resolve_at(&ws, "Weapons", "Chained = ")), Some("AWeapon"));
    assert_eq!(typename(&resolve_at(&ws, "Weapons", "Damage = ")), Some("int"));
    assert_eq!(typename(&resolve_at(&ws, "Weapons", "Range = ")), Some("float"));
    assert_eq!(typename(&resolve_at(&ws, "Weapons", "First = ")), Some("AWeapon"));
    assert_eq!(typename(&resolve_at(&ws, "Weapons", "Mixed = ")), Some("double"));
    assert_eq!(typename(&resolve_at(&ws, "Weapons", "Empty = ")), Some("bool"));
    assert_eq!(typename(&resolve_at(&ws, "Weapons", "Again = ")), Some("AWeapon"));
    assert_eq!(resolve_at(&ws, "Weapons", "Missing = "), ExprType::Unknown);
    assert_eq!(resolve_at(&ws, "Weapons", "None = "), ExprType::Nullptr);
}

#[test]
fn namespace_members_and_enum_values() {
    let text = "\
enum EMode
{
    Idle,
    Busy,
}

namespace Tuning
{
    float Gravity = 9.8f;
    int Limit() { return 3; }
}

void Use()
{
    auto Mode = EMode::Busy;
    auto Gravity = Tuning::Gravity;
    auto Limit = Tuning::Limit();
}
";
    let ws = workspace(&[("Tuning", text)]);
    assert_eq!(typename(&resolve_at(&ws, "Tuning", "Mode = ")), Some("EMode"));
    assert_eq!(typename(&resolve_at(&ws, "Tuning", "Gravity = Tuning")), Some("float"));
    assert_eq!(typename(&resolve_at(&ws, "Tuning", "Limit = ")), Some("int"));

    let ns = ws.db().namespace("Tuning").unwrap();
    assert_eq!(ns.display_name(), "Tuning");
    assert!(ns.is_namespace_or_global());
}

#[test]
fn engine_types_feed_resolution() {
    let mut ws = Workspace::new(Config::default());
    let mut actor = DBType::new("AActor", TypeKind::Class);
    actor.is_unreal_type = true;
    actor.properties.push(Arc::new(DBProperty {
        name: "Tags".to_string(),
        typename: "TArray<FName>".to_string(),
        containing_type: "AActor".to_string(),
        ..DBProperty::default()
    }));
    actor.methods.push(Arc::new(DBMethod {
        name: "GetOwner".to_string(),
        return_type: "AActor".to_string(),
        containing_type: "AActor".to_string(),
        ..DBMethod::default()
    }));
    ws.db_mut().insert(actor);

    let text = "\
class AHero : AActor
{
    void BeginPlay()
    {
        auto Tag = Tags[0];
        auto Owner = GetOwner().Owner;
    }
}
";
    ws.open_module("Hero", text);
    assert_eq!(typename(&resolve_at(&ws, "Hero", "Tag = ")), Some("FName"));
    assert_eq!(typename(&resolve_at(&ws, "Hero", "Owner = ")), Some("AActor"));
    let hero = ws.db().get_type("AHero").unwrap();
    assert_eq!(hero.inheritance_types(ws.db()).count(), 2);
}

#[test]
fn closing_a_module_removes_its_types() {
    let mut ws = workspace(&[("Hierarchy", HIERARCHY)]);
    assert!(ws.db().get_type("B").is_some());
    ws.close_module("Hierarchy");
    assert!(ws.db().get_type("A").is_none());
    assert!(ws.db().get_type("B").is_none());
    assert!(ws.db().get_type("int").is_some());
}

#[test]
fn ternary_branches_meet_at_their_common_type() {
    let user = "\
import Hierarchy;

void Use(bool bFlag)
{
    B Derived;
    A Base;
    auto Upcast = bFlag ? Derived : Base;
    auto Reverse = bFlag ? Base : Derived;
    auto Same = bFlag ? Derived : Derived;
    auto Unrelated = bFlag ? 1 : \"text\";
    auto Widened = bFlag ? 1 : 2.5f;
    auto NullThen = bFlag ? nullptr : Derived;
    auto NullElse = bFlag ? Derived : nullptr;
}
";
    let ws = workspace(&[("Hierarchy", HIERARCHY), ("User", user)]);
    assert_eq!(typename(&resolve_at(&ws, "User", "Upcast = ")), Some("A"));
    assert_eq!(typename(&resolve_at(&ws, "User", "Reverse = ")), Some("A"));
    assert_eq!(typename(&resolve_at(&ws, "User", "Same = ")), Some("B"));
    assert_eq!(resolve_at(&ws, "User", "Unrelated = "), ExprType::Unknown);
    assert_eq!(typename(&resolve_at(&ws, "User", "Widened = ")), Some("float"));
    assert_eq!(typename(&resolve_at(&ws, "User", "NullThen = ")), Some("B"));
    assert_eq!(typename(&resolve_at(&ws, "User", "NullElse = ")), Some("B"));
}

#[test]
fn nullptr_converts_only_to_handles() {
    let text = "\
class AFoo {}
struct FBar {}
delegate void FOnHit(int Damage);
event void FOnDone();

void Use()
{
    AFoo Foo = nullptr;
}
";
    let ws = workspace(&[("Handles", text)]);
    let null = resolve_at(&ws, "Handles", "Foo = nullptr");
    assert_eq!(null, ExprType::Nullptr);

    let db = ws.db();
    for handle in ["AFoo", "FOnHit", "FOnDone"] {
        let target = db.get_type(handle).unwrap();
        assert_eq!(classify_conversion(db, &null, &target), Some(Conversion::Implicit), "{handle}");
    }
    for value in ["FBar", "int"] {
        let target = db.get_type(value).unwrap();
        assert_eq!(classify_conversion(db, &null, &target), Some(Conversion::Incompatible), "{value}");
    }
}
