//! Built-in primitive and core value types, and loading of engine type dumps.

use std::sync::Arc;

use serde::Deserialize;

use super::types::{DBArg, DBMethod, DBProperty, DBType, TypeKind};
use super::TypeDatabase;
use crate::diagnostics::AnalysisError;

/// Primitive typenames, narrowest first within each family.
const PRIMITIVES: &[&str] = &[
    "bool", "int8", "uint8", "int16", "uint16", "int32", "int", "uint32", "uint", "int64", "uint64", "float32",
    "float", "float64", "double", "void",
];

pub fn is_primitive_name(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Conversion rank for arithmetic promotion; the wider operand wins.
/// `None` for non-numeric types.
pub fn primitive_rank(name: &str) -> Option<u8> {
    Some(match name {
        "bool" => 0,
        "int8" | "uint8" => 1,
        "int16" | "uint16" => 2,
        "int" | "int32" | "uint" | "uint32" => 3,
        "int64" | "uint64" => 4,
        "float" | "float32" => 5,
        "double" | "float64" => 6,
        _ => return None,
    })
}

pub(crate) fn register_builtins(db: &mut TypeDatabase) {
    for name in PRIMITIVES {
        db.insert(DBType::new(*name, TypeKind::Primitive));
    }

    let text_methods: &[(&str, &str, &[(&str, &str)])] = &[
        ("Len", "int", &[]),
        ("IsEmpty", "bool", &[]),
        ("ToUpper", "FString", &[]),
        ("ToLower", "FString", &[]),
        ("Contains", "bool", &[("SubStr", "const FString&in")]),
        ("opAdd", "FString", &[("Other", "const FString&in")]),
        ("opAddAssign", "FString&", &[("Other", "const FString&in")]),
        ("opEquals", "bool", &[("Other", "const FString&in")]),
    ];
    db.insert(value_type("FString", text_methods));
    db.insert(value_type(
        "FName",
        &[("ToString", "FString", &[]), ("IsNone", "bool", &[]), ("opEquals", "bool", &[("Other", "const FName&in")])],
    ));
    db.insert(value_type("FText", &[("ToString", "FString", &[]), ("IsEmpty", "bool", &[])]));
}

type MethodSpec<'a> = (&'a str, &'a str, &'a [(&'a str, &'a str)]);

fn value_type(name: &str, methods: &[MethodSpec<'_>]) -> DBType {
    let mut ty = DBType::new(name, TypeKind::Struct);
    ty.is_unreal_type = true;
    ty.methods = methods
        .iter()
        .map(|(method, ret, args)| {
            Arc::new(DBMethod {
                name: method.to_string(),
                return_type: ret.to_string(),
                args: args
                    .iter()
                    .map(|(arg, typename)| DBArg {
                        name: Some(arg.to_string()),
                        typename: typename.to_string(),
                        default: None,
                    })
                    .collect(),
                containing_type: name.to_string(),
                is_const: true,
                ..DBMethod::default()
            })
        })
        .collect();
    ty
}

// ---- engine type dumps ----

#[derive(Debug, Deserialize)]
struct EngineDump {
    #[serde(default)]
    types: Vec<EngineType>,
}

#[derive(Debug, Deserialize)]
struct EngineType {
    name: String,
    #[serde(default)]
    supertype: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    methods: Vec<EngineMethod>,
    #[serde(default)]
    properties: Vec<EngineProperty>,
    #[serde(default)]
    delegate_return: Option<String>,
    #[serde(default)]
    delegate_args: Vec<EngineArg>,
}

#[derive(Debug, Deserialize)]
struct EngineMethod {
    name: String,
    #[serde(default = "void_type")]
    return_type: String,
    #[serde(default)]
    args: Vec<EngineArg>,
    #[serde(default, rename = "const")]
    is_const: bool,
    #[serde(default, rename = "event")]
    is_event: bool,
    #[serde(default, rename = "final")]
    is_final: bool,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default, rename = "property")]
    is_property: bool,
    #[serde(default, rename = "protected")]
    is_protected: bool,
}

#[derive(Debug, Deserialize)]
struct EngineArg {
    #[serde(default)]
    name: Option<String>,
    typename: String,
    #[serde(default)]
    default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EngineProperty {
    name: String,
    typename: String,
    #[serde(default, rename = "protected")]
    is_protected: bool,
}

fn void_type() -> String {
    "void".to_string()
}

fn engine_kind(kind: Option<&str>, name: &str) -> TypeKind {
    match kind {
        None | Some("class") => TypeKind::Class,
        Some("struct") => TypeKind::Struct,
        Some("enum") => TypeKind::Enum,
        Some("namespace") => TypeKind::Namespace,
        Some("delegate") => TypeKind::Delegate,
        Some("event") => TypeKind::Event,
        Some(other) => {
            log::warn!("engine type {name} has unknown kind {other:?}, treating it as a class");
            TypeKind::Class
        }
    }
}

fn engine_args(args: Vec<EngineArg>) -> Vec<DBArg> {
    args.into_iter().map(|a| DBArg { name: a.name, typename: a.typename, default: a.default }).collect()
}

impl TypeDatabase {
    /// Load engine-reflected types from a JSON dump. Returns how many types
    /// were added or extended. Namespace entries merge into existing namespaces.
    pub fn load_engine_types(&mut self, json: &str) -> Result<usize, AnalysisError> {
        let dump: EngineDump = serde_json::from_str(json)?;
        let count = dump.types.len();
        for entry in dump.types {
            let kind = engine_kind(entry.kind.as_deref(), &entry.name);
            let mut ty = if kind == TypeKind::Namespace {
                let existing = self.namespace(&entry.name);
                existing.map(|t| (*t).clone()).unwrap_or_else(|| DBType::namespace(&entry.name))
            } else {
                DBType::new(entry.name.clone(), kind)
            };
            let owner = ty.typename.clone();
            ty.supertype = entry.supertype.filter(|s| !s.is_empty());
            ty.is_unreal_type = true;
            ty.delegate_return = entry.delegate_return;
            ty.delegate_args = engine_args(entry.delegate_args);
            ty.methods.extend(entry.methods.into_iter().map(|m| {
                Arc::new(DBMethod {
                    name: m.name,
                    return_type: m.return_type,
                    args: engine_args(m.args),
                    containing_type: owner.clone(),
                    is_const: m.is_const,
                    is_event: m.is_event,
                    is_final: m.is_final,
                    is_static: m.is_static || kind == TypeKind::Namespace,
                    is_property: m.is_property,
                    is_protected: m.is_protected,
                    ..DBMethod::default()
                })
            }));
            ty.properties.extend(entry.properties.into_iter().map(|p| {
                Arc::new(DBProperty {
                    name: p.name,
                    typename: p.typename,
                    containing_type: owner.clone(),
                    is_protected: p.is_protected,
                    ..DBProperty::default()
                })
            }));
            self.insert(ty);
        }
        log::debug!("loaded {count} engine types");
        Ok(count)
    }
}
