//! Registry of every type the analysis knows about: built-in primitives,
//! engine types loaded from a dump and types declared by script modules.

pub mod builtins;
pub mod register;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

pub use builtins::{is_primitive_name, primitive_rank};
pub use register::{collect_declarations, ModuleDeclarations};
pub use types::{
    namespace_key, DBArg, DBMethod, DBProperty, DBSymbol, DBType, InheritanceTypes, SymbolFilter, TypeKind,
};

/// Entries are immutable `Arc`s swapped in whole, so a handle obtained from a
/// query never observes a half-registered type.
#[derive(Debug, Default)]
pub struct TypeDatabase {
    types: HashMap<String, Arc<DBType>>,
    /// Owned (non-namespace) types each module declared, kept so a name two
    /// modules declare falls back to the other declaration when one closes.
    module_types: HashMap<String, Vec<DBType>>,
}

impl TypeDatabase {
    /// Database holding the built-in primitive and core engine value types.
    pub fn new() -> Self {
        let mut db = Self::empty();
        builtins::register_builtins(&mut db);
        db
    }

    /// Database with only the global namespace.
    pub fn empty() -> Self {
        let mut db = Self::default();
        db.insert(DBType::namespace(""));
        db
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Exact-name lookup.
    pub fn get_type(&self, name: &str) -> Option<Arc<DBType>> {
        self.types.get(name).cloned()
    }

    /// Replace (or add) the entry for `ty.typename`.
    pub fn insert(&mut self, ty: DBType) -> Arc<DBType> {
        let ty = Arc::new(ty);
        self.types.insert(ty.typename.clone(), ty.clone());
        ty
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Arc<DBType>> {
        self.types.remove(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn global_namespace(&self) -> Option<Arc<DBType>> {
        self.get_type(&namespace_key(""))
    }

    pub fn namespace(&self, name: &str) -> Option<Arc<DBType>> {
        self.get_type(&namespace_key(name))
    }

    /// Lookup by a written typename: qualifiers (`const`, `&in`, `&out`,
    /// `&inout`, `&`, `@`, `?`) are ignored and template instantiations fall
    /// back to their template (`TArray<int>` → `TArray`).
    pub fn resolve_typename(&self, written: &str) -> Option<Arc<DBType>> {
        // `::Name` is a globally qualified type, not a namespace key.
        let name = normalize_typename(written).trim_start_matches("::");
        if name.is_empty() || name == "auto" {
            return None;
        }
        if let Some(ty) = self.get_type(name) {
            return Some(ty);
        }
        let base = name.split('<').next().unwrap_or(name).trim();
        if base != name {
            if let Some(ty) = self.get_type(base) {
                return Some(ty);
            }
        }
        // `Ns::FType` is registered under its plain name.
        let (_, last) = base.rsplit_once("::")?;
        self.get_type(last)
    }

    /// Modules that have declarations registered.
    pub fn registered_modules(&self) -> impl Iterator<Item = &str> {
        self.module_types.keys().map(String::as_str)
    }
}

/// Strip qualifiers and reference markers from a written typename.
pub fn normalize_typename(written: &str) -> &str {
    let mut name = written.trim();
    if let Some(rest) = name.strip_prefix("const ") {
        name = rest.trim_start();
    }
    loop {
        let before = name.len();
        for suffix in ["&inout", "&in", "&out", "&", "@", "?"] {
            if let Some(rest) = name.strip_suffix(suffix) {
                name = rest.trim_end();
            }
        }
        if let Some(rest) = name.strip_suffix(" const") {
            name = rest.trim_end();
        }
        if name.len() == before {
            return name;
        }
    }
}
