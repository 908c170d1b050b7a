use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::TypeDatabase;
use crate::span::Span;

/// Key prefix of namespace types; the global namespace is the empty namespace.
/// No declared typename can start with `::`.
pub const NAMESPACE_PREFIX: &str = "::";

/// Longest supertype chain walked before giving up, on top of the cycle guard.
const MAX_INHERITANCE_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Class,
    Struct,
    Enum,
    Namespace,
    Delegate,
    Event,
    Primitive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DBArg {
    pub name: Option<String>,
    pub typename: String,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DBMethod {
    pub name: String,
    pub return_type: String,
    pub args: Vec<DBArg>,
    pub containing_type: String,
    /// `None` for built-in and engine methods.
    pub declared_module: Option<String>,
    /// Absolute span of the name in the declaring module.
    pub declared_at: Option<Span>,
    pub is_const: bool,
    /// Overridable blueprint event.
    pub is_event: bool,
    pub is_final: bool,
    pub is_private: bool,
    pub is_protected: bool,
    pub is_property: bool,
    pub is_static: bool,
    pub is_mixin: bool,
}

impl DBMethod {
    /// Method with no arguments returning nothing.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.return_type == "void"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DBProperty {
    pub name: String,
    pub typename: String,
    pub containing_type: String,
    pub declared_module: Option<String>,
    pub declared_at: Option<Span>,
    pub is_private: bool,
    pub is_protected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DBType {
    pub typename: String,
    /// Parent type by name; looked up in the database on every walk.
    pub supertype: Option<String>,
    pub kind: TypeKind,
    pub methods: Vec<Arc<DBMethod>>,
    pub properties: Vec<Arc<DBProperty>>,
    pub is_unreal_type: bool,
    pub declared_module: Option<String>,
    pub declared_at: Option<Span>,
    pub delegate_return: Option<String>,
    pub delegate_args: Vec<DBArg>,
}

/// Which member kinds a lookup may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolFilter {
    Any,
    FunctionOnly,
    PropertyOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DBSymbol {
    Method(Arc<DBMethod>),
    Property(Arc<DBProperty>),
}

impl DBSymbol {
    pub fn name(&self) -> &str {
        match self {
            DBSymbol::Method(m) => &m.name,
            DBSymbol::Property(p) => &p.name,
        }
    }

    pub fn containing_type(&self) -> &str {
        match self {
            DBSymbol::Method(m) => &m.containing_type,
            DBSymbol::Property(p) => &p.containing_type,
        }
    }

    pub fn declared_module(&self) -> Option<&str> {
        match self {
            DBSymbol::Method(m) => m.declared_module.as_deref(),
            DBSymbol::Property(p) => p.declared_module.as_deref(),
        }
    }

    pub fn as_method(&self) -> Option<&Arc<DBMethod>> {
        match self {
            DBSymbol::Method(m) => Some(m),
            DBSymbol::Property(_) => None,
        }
    }
}

impl DBType {
    pub fn new(typename: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            typename: typename.into(),
            supertype: None,
            kind,
            methods: Vec::new(),
            properties: Vec::new(),
            is_unreal_type: false,
            declared_module: None,
            declared_at: None,
            delegate_return: None,
            delegate_args: Vec::new(),
        }
    }

    /// Empty namespace type; `""` names the global namespace.
    pub fn namespace(name: &str) -> Self {
        Self::new(namespace_key(name), TypeKind::Namespace)
    }

    pub fn is_struct(&self) -> bool {
        self.kind == TypeKind::Struct
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == TypeKind::Primitive
    }

    pub fn is_unreal_type(&self) -> bool {
        self.is_unreal_type
    }

    pub fn is_delegate(&self) -> bool {
        matches!(self.kind, TypeKind::Delegate | TypeKind::Event)
    }

    pub fn is_namespace_or_global(&self) -> bool {
        self.kind == TypeKind::Namespace
    }

    pub fn is_global_namespace(&self) -> bool {
        self.kind == TypeKind::Namespace && self.typename == NAMESPACE_PREFIX
    }

    /// Name as written in script; namespaces lose their key prefix.
    pub fn display_name(&self) -> &str {
        if self.kind == TypeKind::Namespace {
            self.typename.strip_prefix(NAMESPACE_PREFIX).unwrap_or(&self.typename)
        } else {
            &self.typename
        }
    }

    pub fn local_method(&self, name: &str) -> Option<&Arc<DBMethod>> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn local_property(&self, name: &str) -> Option<&Arc<DBProperty>> {
        self.properties.iter().find(|p| p.name == name)
    }

    fn find_local_symbol(&self, name: &str, filter: SymbolFilter) -> Option<DBSymbol> {
        if filter != SymbolFilter::PropertyOnly {
            if let Some(method) = self.local_method(name) {
                return Some(DBSymbol::Method(method.clone()));
            }
        }
        if filter != SymbolFilter::FunctionOnly {
            if let Some(prop) = self.local_property(name) {
                return Some(DBSymbol::Property(prop.clone()));
            }
        }
        None
    }

    /// Self first, then each supertype up to the root. Recomputed per call;
    /// stops at unregistered supertypes and at cycles.
    pub fn inheritance_types<'d>(self: &Arc<Self>, db: &'d TypeDatabase) -> InheritanceTypes<'d> {
        InheritanceTypes { db, next: Some(self.clone()), visited: HashSet::new() }
    }

    /// Reflexive and transitive.
    pub fn inherits_from(self: &Arc<Self>, db: &TypeDatabase, name: &str) -> bool {
        self.inheritance_types(db).any(|t| t.typename == name)
    }

    /// First member with this name walking from self to the root, so derived
    /// declarations shadow ancestor ones.
    pub fn find_first_symbol(self: &Arc<Self>, db: &TypeDatabase, name: &str, filter: SymbolFilter) -> Option<DBSymbol> {
        self.inheritance_types(db).find_map(|t| t.find_local_symbol(name, filter))
    }

    pub fn get_method(self: &Arc<Self>, db: &TypeDatabase, name: &str) -> Option<Arc<DBMethod>> {
        match self.find_first_symbol(db, name, SymbolFilter::FunctionOnly)? {
            DBSymbol::Method(method) => Some(method),
            DBSymbol::Property(_) => None,
        }
    }

    pub fn get_property(self: &Arc<Self>, db: &TypeDatabase, name: &str) -> Option<Arc<DBProperty>> {
        match self.find_first_symbol(db, name, SymbolFilter::PropertyOnly)? {
            DBSymbol::Property(prop) => Some(prop),
            DBSymbol::Method(_) => None,
        }
    }
}

/// Lazy walk up a supertype chain with a visited-set guard.
pub struct InheritanceTypes<'d> {
    db: &'d TypeDatabase,
    next: Option<Arc<DBType>>,
    visited: HashSet<String>,
}

impl Iterator for InheritanceTypes<'_> {
    type Item = Arc<DBType>;

    fn next(&mut self) -> Option<Arc<DBType>> {
        let current = self.next.take()?;
        if self.visited.len() >= MAX_INHERITANCE_DEPTH || !self.visited.insert(current.typename.clone()) {
            log::debug!("inheritance cycle through {}", current.typename);
            return None;
        }
        self.next = current.supertype.as_deref().and_then(|s| self.db.get_type(s));
        Some(current)
    }
}

pub fn namespace_key(name: &str) -> String {
    format!("{NAMESPACE_PREFIX}{name}")
}
