//! Editor queries over an analyzed workspace: missing switch cases, cast
//! suggestions, override candidates, super calls, member promotion and `auto`
//! materialization.

use asls_core::queries::{
    auto_materializations, cast_suggestion, database_function, missing_super_call, missing_switch_cases,
    override_candidates_at, variable_promotion,
};
use asls_core::{Config, Workspace};

const GAME: &str = "\
enum EWeaponState
{
    Idle,
    Firing,
    Reloading,
    Jammed,
    Broken,
    EWeaponState_MAX,
}

class ABaseWeapon
{
    EWeaponState State;

    void Fire() {}
    void Reload() {}
    void Inspect() final {}
}

class ARifle : ABaseWeapon
{
    void Fire() {}

    void Tick()
    {
        switch (State)
        {
            case EWeaponState::Idle:
                break;
            case EWeaponState::Jammed:
                break;
            default:
                break;
        }
    }
}

ARifle Upgrade(ABaseWeapon Weapon)
{
    ARifle Rifle = Weapon;
    return Weapon;
}
";

fn workspace() -> Workspace {
    let mut ws = Workspace::new(Config::default());
    ws.open_module("Game", GAME);
    ws
}

#[test]
fn switch_reports_missing_values_in_declaration_order() {
    let ws = workspace();
    let module = ws.module("Game").unwrap();
    let offset = GAME.find("switch (State)").unwrap();
    let cases = missing_switch_cases(module, ws.db(), offset, ws.ignored_enum_values()).unwrap();
    assert_eq!(cases.enum_name, "EWeaponState");
    assert_eq!(
        cases.missing,
        ["EWeaponState::Firing", "EWeaponState::Reloading", "EWeaponState::Broken"]
    );
    assert!(cases.default_case.is_some());
    assert_eq!(module.statement(cases.switch_statement).next, Some(asls_core::module::Element::Scope(cases.block)));
}

#[test]
fn switch_query_works_from_inside_the_body() {
    let ws = workspace();
    let module = ws.module("Game").unwrap();
    let offset = GAME.find("case EWeaponState::Jammed").unwrap();
    let cases = missing_switch_cases(module, ws.db(), offset, &[]).unwrap();
    assert_eq!(cases.missing.len(), 4);
    assert_eq!(cases.missing.last().map(String::as_str), Some("EWeaponState::EWeaponState_MAX"));
}

#[test]
fn switch_query_outside_a_switch_is_none() {
    let ws = workspace();
    let module = ws.module("Game").unwrap();
    let offset = GAME.find("void Reload").unwrap();
    assert!(missing_switch_cases(module, ws.db(), offset, ws.ignored_enum_values()).is_none());
}

#[test]
fn downcasts_get_a_cast_suggestion() {
    let ws = workspace();
    let module = ws.module("Game").unwrap();

    let decl = module.statement_at(GAME.find("ARifle Rifle").unwrap()).unwrap();
    let suggestion = cast_suggestion(module, ws.db(), decl).unwrap();
    assert_eq!(suggestion.cast_to, "ARifle");
    let start = GAME.find("= Weapon;").unwrap() + 2;
    assert_eq!(&GAME[suggestion.expression.start..suggestion.expression.end], "Weapon");
    assert_eq!(suggestion.expression.start, start);

    let ret = module.statement_at(GAME.find("return Weapon").unwrap()).unwrap();
    assert_eq!(cast_suggestion(module, ws.db(), ret).unwrap().cast_to, "ARifle");
}

#[test]
fn overrides_skip_overridden_and_final_methods() {
    let ws = workspace();
    let module = ws.module("Game").unwrap();
    let offset = GAME.find("void Fire() {}\n\n    void Tick").unwrap();
    let names: Vec<String> =
        override_candidates_at(module, ws.db(), offset).iter().map(|m| m.name.clone()).collect();
    assert_eq!(names, ["Reload"]);
}

#[test]
fn enclosing_function_of_a_nested_statement() {
    let ws = workspace();
    let module = ws.module("Game").unwrap();
    let scope = module.scope_at(GAME.find("case EWeaponState::Idle").unwrap());
    let function = database_function(module, ws.db(), scope).unwrap();
    assert_eq!(function.name, "Tick");
    assert_eq!(function.containing_type, "ARifle");
}

#[test]
fn overrides_are_offered_from_a_method_header() {
    let ws = workspace();
    let module = ws.module("Game").unwrap();
    let inside_braces = GAME.find("void Fire() {}\n\n    void Tick").unwrap() + "void Fire() {".len();
    let names: Vec<String> =
        override_candidates_at(module, ws.db(), inside_braces).iter().map(|m| m.name.clone()).collect();
    assert_eq!(names, ["Reload"]);

    let in_body = GAME.find("switch (State)").unwrap();
    assert!(override_candidates_at(module, ws.db(), in_body).is_empty());
}

const ARMORY: &str = "\
class ABaseWeapon
{
    int Ammo;

    void Fire(int Shots) {}
    void Reload() {}
}

class APistol : ABaseWeapon
{
    void Fire(int Shots) override
    {
        Ammo -= Shots;
    }

    void Reload() override
    {
        Super::Reload();
        Clip = Ammo;
        Missing = Unknown;
    }

    void Aim()
    {
        auto Current = Ammo;
        Ammo = 3;
    }
}
";

fn armory() -> Workspace {
    let mut ws = Workspace::new(Config::default());
    ws.open_module("Armory", ARMORY);
    ws
}

#[test]
fn override_without_super_call_reports_the_parent_method() {
    let ws = armory();
    let module = ws.module("Armory").unwrap();
    let missing = missing_super_call(module, ws.db(), ARMORY.find("Ammo -= Shots").unwrap()).unwrap();
    assert_eq!(missing.method.name, "Fire");
    assert_eq!(missing.method.containing_type, "ABaseWeapon");
    assert_eq!(missing.arguments, ["Shots"]);
    let brace = ARMORY.find("override\n    {").unwrap() + "override\n    ".len();
    assert_eq!(missing.insert_at, brace + 1);
}

#[test]
fn super_call_is_not_suggested_twice_or_outside_overrides() {
    let ws = armory();
    let module = ws.module("Armory").unwrap();
    assert!(missing_super_call(module, ws.db(), ARMORY.find("Clip = Ammo").unwrap()).is_none());
    assert!(missing_super_call(module, ws.db(), ARMORY.find("auto Current").unwrap()).is_none());
}

#[test]
fn undeclared_assignment_promotes_to_a_member() {
    let ws = armory();
    let module = ws.module("Armory").unwrap();
    let assignment = module.statement_at(ARMORY.find("Clip = Ammo").unwrap()).unwrap();
    let promotion = variable_promotion(module, ws.db(), assignment).unwrap();
    assert_eq!(promotion.name, "Clip");
    assert_eq!(promotion.typename, "int");
    assert_eq!(promotion.class_scope, module.scope_at(ARMORY.find("void Aim").unwrap()));
}

#[test]
fn promotion_needs_an_unknown_name_and_a_known_value() {
    let ws = armory();
    let module = ws.module("Armory").unwrap();
    let unresolved_value = module.statement_at(ARMORY.find("Missing = Unknown").unwrap()).unwrap();
    assert!(variable_promotion(module, ws.db(), unresolved_value).is_none());
    let declared_name = module.statement_at(ARMORY.find("Ammo = 3").unwrap()).unwrap();
    assert!(variable_promotion(module, ws.db(), declared_name).is_none());
}

#[test]
fn auto_materializes_to_the_inferred_type() {
    let ws = armory();
    let module = ws.module("Armory").unwrap();
    let keyword = ARMORY.find("auto Current").unwrap();
    let autos = auto_materializations(module, ws.db(), keyword, keyword + 4);
    assert_eq!(autos.len(), 1);
    assert_eq!(autos[0].typename, "int");
    assert_eq!(autos[0].display_name, "int");
    assert_eq!(autos[0].keyword.start, keyword);
    assert_eq!(autos[0].keyword.len(), "auto".len());

    let elsewhere = ARMORY.find("Ammo = 3").unwrap();
    assert!(auto_materializations(module, ws.db(), elsewhere, elsewhere + 4).is_empty());
}
