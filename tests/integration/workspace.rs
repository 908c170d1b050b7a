//! Whole-project flows: discovering a project on disk, keeping the type
//! database in step with edits, and the symbols each module records.

use std::fs;
use std::path::Path;

use asls_core::module::SymbolKind;
use asls_core::{AnalysisError, Config, Workspace};
use lsp_types::{Position, Range};

const ENGINE_TYPES: &str = r#"{
    "types": [
        {
            "name": "AActor",
            "kind": "class",
            "methods": [
                { "name": "BeginPlay", "event": true },
                { "name": "GetActorLocation", "return_type": "FVector", "const": true }
            ]
        },
        { "name": "FVector", "kind": "struct" },
        { "name": "ACharacter", "supertype": "AActor" }
    ]
}"#;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    write(
        dir.path(),
        "asls.toml",
        "[project]\nname = \"Shooter\"\nscript_roots = [\"Script\", \"Plugins/Script\"]\nengine_types = \"Engine/types.json\"\n\n[analysis]\nignored_enum_values = [\"Count\"]\n",
    );
    write(dir.path(), "Engine/types.json", ENGINE_TYPES);
    write(
        dir.path(),
        "Script/Core/Health.as",
        "struct FHealth\n{\n    float Current = 100.f;\n}\n",
    );
    write(
        dir.path(),
        "Script/Game/Hero.as",
        "\
import Core.Health;

class AHero : ACharacter
{
    FHealth Health;

    void BeginPlay()
    {
        FVector Where = GetActorLocation();
        float Left = Health.Current;
    }
}
",
    );
    write(dir.path(), "Plugins/Script/Extra/Pickup.as", "class APickup : AActor\n{\n}\n");
    write(dir.path(), "Script/Game/readme.txt", "not a script");
    dir
}

#[test]
fn opens_a_project_from_a_nested_directory() {
    let dir = project();
    let nested = dir.path().join("Script").join("Game");
    let ws = Workspace::open_project(&nested).unwrap();

    assert_eq!(ws.config().project.name.as_deref(), Some("Shooter"));
    assert_eq!(ws.ignored_enum_values(), ["Count"]);
    let names: Vec<&str> = ws.modules().map(|m| m.name()).collect();
    assert_eq!(names, ["Core.Health", "Extra.Pickup", "Game.Hero"]);

    let hero = ws.db().get_type("AHero").unwrap();
    let chain: Vec<String> = hero.inheritance_types(ws.db()).map(|t| t.typename.clone()).collect();
    assert_eq!(chain, ["AHero", "ACharacter", "AActor"]);
    assert!(ws.db().get_type("APickup").unwrap().inherits_from(ws.db(), "AActor"));
}

#[test]
fn project_symbols_resolve_across_modules() {
    let dir = project();
    let ws = Workspace::open_project(dir.path()).unwrap();
    let hero = ws.module("Game.Hero").unwrap();

    let find = |name: &str, kind: SymbolKind| {
        hero.symbols().iter().find(|s| s.name == name && s.kind == kind).unwrap_or_else(|| {
            panic!("no {kind:?} symbol named {name}: {:#?}", hero.symbols())
        })
    };
    let health = find("FHealth", SymbolKind::Type);
    assert!(!health.is_unimported);
    let current = find("Current", SymbolKind::MemberVariable);
    assert_eq!(current.container_type.as_deref(), Some("FHealth"));
    let location = find("GetActorLocation", SymbolKind::MemberFunction);
    assert_eq!(location.container_type.as_deref(), Some("AActor"));
    find("Where", SymbolKind::LocalVariable);
    find("BeginPlay", SymbolKind::MemberFunction);
}

#[test]
fn missing_engine_dump_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    write(dir.path(), "asls.toml", "[project]\nengine_types = \"missing.json\"\n");
    let err = Workspace::open_project(dir.path()).err().unwrap();
    assert!(matches!(err, AnalysisError::Io { .. }), "{err}");
}

#[test]
fn broken_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    write(dir.path(), "asls.toml", "[project\nname = ");
    let err = Workspace::open_project(dir.path()).err().unwrap();
    assert!(matches!(err, AnalysisError::Config { .. }), "{err}");
}

#[test]
fn no_config_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    write(dir.path(), "Script/Solo.as", "int Answer() { return 42; }\n");
    let ws = Workspace::open_project(dir.path()).unwrap();
    assert_eq!(ws.ignored_enum_values(), ["MAX", "*_MAX"]);
    assert!(ws.module("Solo").is_some());
    assert!(ws.db().global_namespace().unwrap().local_method("Answer").is_some());
}

#[test]
fn edits_keep_dependents_in_step() {
    let mut ws = Workspace::new(Config::default());
    ws.open_module("Base", "class ABase\n{\n    int Ammo;\n}\n");
    ws.open_module("User", "import Base;\n\nvoid Use(ABase Thing)\n{\n    int A = Thing.Ammo;\n}\n");
    let has_ammo = |ws: &Workspace| ws.module("User").unwrap().symbols().iter().any(|s| s.name == "Ammo");
    assert!(has_ammo(&ws));

    // Rename the member in place: `Ammo` on line 2, columns 8..12.
    let range = Range::new(Position::new(2, 8), Position::new(2, 12));
    ws.apply_change("Base", range, "Rounds").unwrap();
    assert!(ws.db().get_type("ABase").unwrap().local_property("Rounds").is_some());

    ws.refresh_symbols();
    assert!(!has_ammo(&ws));
}

#[test]
fn diagnostics_follow_the_text() {
    let mut ws = Workspace::new(Config::default());
    ws.open_module("M", "void F()\n{\n    int A = ;\n}\n");
    let diagnostics = ws.diagnostics("M");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].source.as_deref(), Some("asls(syntax)"));
    assert_eq!(diagnostics[0].range.start.line, 2);

    ws.update_module("M", "void F()\n{\n    int A = 1;\n}\n").unwrap();
    assert!(ws.diagnostics("M").is_empty());
    assert!(ws.diagnostics("NotOpen").is_empty());
}
