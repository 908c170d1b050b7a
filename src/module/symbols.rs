//! Identifier occurrences recorded for a module: every declaration and use of
//! a type, variable, function or enum value that resolves, plus the type an
//! `auto` declaration materializes to.
//!
//! The pass runs after the module's declarations are registered, so names from
//! other modules resolve too; those not reachable through an import are
//! flagged rather than dropped.

use std::sync::Arc;

use serde::Serialize;

use super::{Module, ScopeId, StatementId, VariableSite};
use crate::parser::ast::{Ident, Node, NodeKind, Parameter, TypeRef};
use crate::resolve::{
    enclosing_type, find_mixin, lookup_name, resolve_type_from_expression, resolve_written_type, template_argument,
    NameTarget,
};
use crate::span::Span;
use crate::typedb::{is_primitive_name, DBSymbol, DBType, SymbolFilter, TypeDatabase};
use crate::visit::{walk_module, walk_node, walk_statement, Visitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Type,
    Namespace,
    LocalVariable,
    Parameter,
    MemberVariable,
    MemberFunction,
    /// A property read through its `Get<Name>` method.
    MemberAccessor,
    GlobalVariable,
    GlobalFunction,
    EnumValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// Resolved name. For `auto` symbols, the inferred typename.
    pub name: String,
    /// Type or namespace the member belongs to.
    pub container_type: Option<String>,
    /// Absolute span of the identifier (or of the `auto` keyword).
    pub span: Span,
    pub is_auto: bool,
    /// Declared in a module this one does not import.
    pub is_unimported: bool,
}

impl Symbol {
    fn new(kind: SymbolKind, name: impl Into<String>, span: Span) -> Self {
        Self { kind, name: name.into(), container_type: None, span, is_auto: false, is_unimported: false }
    }

    fn in_container(mut self, container: Option<String>) -> Self {
        self.container_type = container;
        self
    }

    /// Inclusive overlap with `[start, end]`.
    pub fn overlaps_range(&self, start: usize, end: usize) -> bool {
        self.span.overlaps(start, end)
    }
}

/// Symbols of `module` in source order.
pub fn collect(module: &Module, db: &TypeDatabase) -> Vec<Symbol> {
    let mut collector = Collector { db, base: 0, scope: module.root(), own_scope: module.root(), symbols: Vec::new() };
    walk_module(&mut collector, module);
    let mut symbols = collector.symbols;
    symbols.sort_by_key(|s| (s.span.start, s.span.end));
    log::trace!("{}: {} symbols", module.name(), symbols.len());
    symbols
}

struct Collector<'d> {
    db: &'d TypeDatabase,
    /// Start of the statement being walked; node spans are relative to it.
    base: usize,
    /// Scope names are looked up in: a header's own block, so parameters and
    /// loop variables are visible, otherwise the statement's scope.
    scope: ScopeId,
    /// Scope the statement itself sits in.
    own_scope: ScopeId,
    symbols: Vec<Symbol>,
}

impl Visitor for Collector<'_> {
    fn visit_statement(&mut self, module: &Module, statement: StatementId) {
        let stmt = module.statement(statement);
        self.base = stmt.span.start;
        self.own_scope = stmt.scope;
        self.scope = headed_scope(module, statement).unwrap_or(stmt.scope);
        walk_statement(self, module, statement);
    }

    fn visit_node(&mut self, module: &Module, node: &Node) {
        match &node.kind {
            NodeKind::Identifier(name) => self.identifier(module, name, node.span),
            NodeKind::Typename(ty) => {
                self.typename(module, ty, node.span);
                walk_node(self, module, node);
            }
            NodeKind::MemberAccess { object, member } => {
                self.visit_node(module, object);
                if let Some(member) = member {
                    self.member(module, object, member);
                }
            }
            NodeKind::NamespaceAccess { namespace, member } => {
                let qualifier = match namespace {
                    Some(namespace) => self.qualifier(module, namespace),
                    None => self.db.global_namespace(),
                };
                if let (Some(qualifier), Some(member)) = (qualifier, member) {
                    self.qualified_member(module, &qualifier, member);
                }
            }
            NodeKind::ClassDefinition { name, superclass, .. } => {
                self.declared_type(name);
                if let Some(superclass) = superclass {
                    self.type_reference(module, &superclass.node, superclass.span);
                }
                walk_node(self, module, node);
            }
            NodeKind::StructDefinition { name, .. } | NodeKind::EnumDefinition { name, .. } => {
                self.declared_type(name);
                walk_node(self, module, node);
            }
            NodeKind::DelegateDecl(sig) | NodeKind::EventDecl(sig) => {
                self.declared_type(&sig.name);
                walk_node(self, module, node);
            }
            NodeKind::ConstructorDecl { name, .. } => {
                self.type_reference(module, &name.node, name.span);
                walk_node(self, module, node);
            }
            NodeKind::AssetDefinition { name, typename } => {
                self.type_reference(module, &typename.node, typename.span);
                let container = module.namespace_path(self.own_scope);
                self.push(Symbol::new(SymbolKind::GlobalVariable, &name.node, self.abs(name.span)).in_container(container));
            }
            NodeKind::NamespaceDefinition { name } => {
                self.push(Symbol::new(SymbolKind::Namespace, &name.node, self.abs(name.span)));
            }
            NodeKind::VariableDecl(decl) => {
                if let Some(macro_) = &decl.prefix.macro_ {
                    self.visit_node(module, macro_);
                }
                match decl.typename.as_typename() {
                    Some(ty) if ty.is_auto() => {
                        let inferred = decl.init.as_deref().and_then(|init| resolve_written_type(module, self.db, self.scope, init));
                        self.auto_symbol(module, inferred, decl.typename.span);
                    }
                    _ => self.visit_node(module, &decl.typename),
                }
                self.declared_variable(module, &decl.name);
                if let Some(init) = &decl.init {
                    self.visit_node(module, init);
                }
            }
            NodeKind::ForEachLoop { typename, name, iterable, body } => {
                match typename.as_typename() {
                    Some(ty) if ty.is_auto() => {
                        let inferred = resolve_written_type(module, self.db, self.scope, iterable)
                            .and_then(|container| template_argument(&container).map(str::to_string));
                        self.auto_symbol(module, inferred, typename.span);
                    }
                    _ => self.visit_node(module, typename),
                }
                self.declared_variable(module, name);
                self.visit_node(module, iterable);
                if let Some(body) = body {
                    self.visit_node(module, body);
                }
            }
            NodeKind::FunctionDecl(decl) => {
                if let Some(macro_) = &decl.prefix.macro_ {
                    self.visit_node(module, macro_);
                }
                self.visit_node(module, &decl.return_type);
                let symbol = match module.parent_type_scope(self.own_scope) {
                    Some(body) if module.scope(self.own_scope).scope_type.is_type_body() => {
                        Symbol::new(SymbolKind::MemberFunction, &decl.name.node, self.abs(decl.name.span))
                            .in_container(module.scope_type_name(body).map(str::to_string))
                    }
                    _ => Symbol::new(SymbolKind::GlobalFunction, &decl.name.node, self.abs(decl.name.span))
                        .in_container(module.namespace_path(self.own_scope)),
                };
                self.push(symbol);
                for param in &decl.params {
                    self.visit_node(module, param);
                }
            }
            NodeKind::Parameter(Parameter { typename, name, default }) => {
                self.visit_node(module, typename);
                if let Some(name) = name {
                    self.push(Symbol::new(SymbolKind::Parameter, &name.node, self.abs(name.span)));
                }
                if let Some(default) = default {
                    self.visit_node(module, default);
                }
            }
            NodeKind::EnumValue(value) => {
                let container = module.scope_type_name(self.own_scope).map(str::to_string);
                self.push(Symbol::new(SymbolKind::EnumValue, &value.name.node, self.abs(value.name.span)).in_container(container));
                walk_node(self, module, node);
            }
            _ => walk_node(self, module, node),
        }
    }
}

impl Collector<'_> {
    fn abs(&self, span: Span) -> Span {
        span.offset_by(self.base)
    }

    fn push(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    fn unimported(module: &Module, declared_module: Option<&str>) -> bool {
        declared_module.is_some_and(|m| !module.is_module_imported(m))
    }

    /// Display name of a member's owner; `None` for the global namespace.
    fn container_of(&self, containing_type: &str) -> Option<String> {
        let name = match self.db.get_type(containing_type) {
            Some(ty) => ty.display_name().to_string(),
            None => containing_type.to_string(),
        };
        (!name.is_empty()).then_some(name)
    }

    fn identifier(&mut self, module: &Module, name: &str, span: Span) {
        let span = self.abs(span);
        let symbol = match lookup_name(module, self.db, self.scope, name) {
            Some(NameTarget::Variable(site)) => self.variable_symbol(module, site, span),
            Some(NameTarget::Member(sym)) => self.db_symbol(module, &sym, name, span, false),
            Some(NameTarget::Global(sym)) => self.db_symbol(module, &sym, name, span, true),
            Some(NameTarget::Type(ty)) => self.type_symbol(module, &ty, span),
            Some(NameTarget::Namespace(ns)) => Symbol::new(SymbolKind::Namespace, ns.display_name(), span),
            None => return,
        };
        self.push(symbol);
    }

    fn variable_symbol(&self, module: &Module, site: &VariableSite, span: Span) -> Symbol {
        let (kind, container) = variable_kind(module, self.scope, site);
        Symbol::new(kind, &site.name, span).in_container(container)
    }

    fn declared_variable(&mut self, module: &Module, name: &Ident) {
        let span = self.abs(name.span);
        let symbol = match module.find_variable(self.scope, &name.node) {
            Some(site) => self.variable_symbol(module, site, span),
            None => Symbol::new(SymbolKind::LocalVariable, &name.node, span),
        };
        self.push(symbol);
    }

    /// Symbol for a database member reached by `written`, which may be the
    /// property name of a `Get<Name>` accessor.
    fn db_symbol(&self, module: &Module, sym: &DBSymbol, written: &str, span: Span, global: bool) -> Symbol {
        let kind = match (sym, global) {
            (DBSymbol::Property(_), false) => SymbolKind::MemberVariable,
            (DBSymbol::Property(_), true) => SymbolKind::GlobalVariable,
            (DBSymbol::Method(m), _) if m.is_mixin => SymbolKind::GlobalFunction,
            (DBSymbol::Method(m), false) if m.name != written => SymbolKind::MemberAccessor,
            (DBSymbol::Method(_), false) => SymbolKind::MemberFunction,
            (DBSymbol::Method(_), true) => SymbolKind::GlobalFunction,
        };
        let mut symbol = Symbol::new(kind, sym.name(), span).in_container(self.container_of(sym.containing_type()));
        symbol.is_unimported = Self::unimported(module, sym.declared_module());
        symbol
    }

    fn type_symbol(&self, module: &Module, ty: &Arc<DBType>, span: Span) -> Symbol {
        let mut symbol = Symbol::new(SymbolKind::Type, &ty.typename, span);
        symbol.is_unimported = Self::unimported(module, ty.declared_module.as_deref());
        symbol
    }

    fn declared_type(&mut self, name: &Ident) {
        self.push(Symbol::new(SymbolKind::Type, &name.node, self.abs(name.span)));
    }

    /// A type named by `written` at the relative `span`.
    fn type_reference(&mut self, module: &Module, written: &str, span: Span) {
        if is_primitive_name(written) {
            return;
        }
        if let Some(ty) = self.db.resolve_typename(written) {
            let symbol = self.type_symbol(module, &ty, self.abs(span));
            self.push(symbol);
        }
    }

    /// The name inside a typename node, which may also cover `const` and
    /// reference markers.
    fn typename(&mut self, module: &Module, ty: &TypeRef, span: Span) {
        if ty.is_auto() || is_primitive_name(&ty.name) {
            return;
        }
        let Some(resolved) = self.db.resolve_typename(&ty.name) else {
            return;
        };
        let Some(name_span) = self.find_in(module, span, &ty.name) else {
            return;
        };
        let symbol = self.type_symbol(module, &resolved, name_span);
        self.push(symbol);
    }

    fn auto_symbol(&mut self, module: &Module, inferred: Option<String>, span: Span) {
        let Some(inferred) = inferred else {
            return;
        };
        let Some(keyword) = self.find_in(module, span, "auto") else {
            return;
        };
        let mut symbol = Symbol::new(SymbolKind::Type, &inferred, keyword);
        symbol.is_auto = true;
        symbol.is_unimported = self
            .db
            .resolve_typename(&inferred)
            .is_some_and(|ty| Self::unimported(module, ty.declared_module.as_deref()));
        self.push(symbol);
    }

    /// Absolute span of `needle` within the relative `span`.
    fn find_in(&self, module: &Module, span: Span, needle: &str) -> Option<Span> {
        let abs = self.abs(span);
        let at = module.text().get(abs.start..abs.end)?.find(needle)?;
        Some(Span::new(abs.start + at, abs.start + at + needle.len()))
    }

    fn member(&mut self, module: &Module, object: &Node, member: &Ident) {
        let Some(ty) = resolve_type_from_expression(module, self.db, self.scope, object) else {
            return;
        };
        let name = member.node.as_str();
        let found = ty
            .find_first_symbol(self.db, name, SymbolFilter::Any)
            .or_else(|| ty.find_first_symbol(self.db, &format!("Get{name}"), SymbolFilter::FunctionOnly))
            .or_else(|| find_mixin(self.db, &ty, name).map(DBSymbol::Method));
        if let Some(sym) = found {
            let symbol = self.db_symbol(module, &sym, name, self.abs(member.span), false);
            self.push(symbol);
        }
    }

    /// Record the qualifier of `A::B` and return the type or namespace it names.
    fn qualifier(&mut self, module: &Module, node: &Node) -> Option<Arc<DBType>> {
        match &node.kind {
            NodeKind::Identifier(name) if name == "Super" => {
                let ty = enclosing_type(module, self.db, self.scope)?;
                self.db.get_type(ty.supertype.as_deref()?)
            }
            NodeKind::Identifier(name) => {
                let span = self.abs(node.span);
                if let Some(ty) = self.db.get_type(name) {
                    let symbol = self.type_symbol(module, &ty, span);
                    self.push(symbol);
                    return Some(ty);
                }
                let ns = self.db.namespace(name)?;
                self.push(Symbol::new(SymbolKind::Namespace, name, span));
                Some(ns)
            }
            NodeKind::NamespaceAccess { namespace, member: Some(member) } => {
                let outer = match namespace {
                    Some(namespace) => self.qualifier(module, namespace)?,
                    None => self.db.global_namespace()?,
                };
                if !outer.is_namespace_or_global() {
                    return None;
                }
                let path = match outer.display_name() {
                    "" => member.node.clone(),
                    outer => format!("{outer}::{}", member.node),
                };
                let span = self.abs(member.span);
                if let Some(ns) = self.db.namespace(&path) {
                    self.push(Symbol::new(SymbolKind::Namespace, &path, span));
                    return Some(ns);
                }
                let ty = self.db.get_type(&member.node)?;
                let symbol = self.type_symbol(module, &ty, span);
                self.push(symbol);
                Some(ty)
            }
            _ => {
                self.visit_node(module, node);
                None
            }
        }
    }

    fn qualified_member(&mut self, module: &Module, qualifier: &Arc<DBType>, member: &Ident) {
        let name = member.node.as_str();
        let span = self.abs(member.span);
        if qualifier.is_enum() {
            if qualifier.local_property(name).is_some() {
                let container = Some(qualifier.typename.clone());
                self.push(Symbol::new(SymbolKind::EnumValue, name, span).in_container(container));
            }
            return;
        }
        let global = qualifier.is_namespace_or_global();
        if let Some(sym) = qualifier.find_first_symbol(self.db, name, SymbolFilter::Any) {
            let symbol = self.db_symbol(module, &sym, name, span, global);
            self.push(symbol);
        } else if global {
            // `Ns::FType` used as a value, e.g. a constructor call.
            self.type_reference(module, name, member.span);
        }
    }
}

/// The block a header statement opens, if any.
fn headed_scope(module: &Module, statement: StatementId) -> Option<ScopeId> {
    match module.statement(statement).next {
        Some(super::Element::Scope(scope)) if module.scope(scope).declaration == Some(statement) => Some(scope),
        _ => None,
    }
}

/// Kind of a variable by where it is declared, with its owning type or namespace.
fn variable_kind(module: &Module, scope: ScopeId, site: &VariableSite) -> (SymbolKind, Option<String>) {
    if site.is_parameter {
        return (SymbolKind::Parameter, None);
    }
    let owner = module
        .scope_chain(scope)
        .find(|s| module.scope(*s).variables.get(&site.name).is_some_and(|v| v.span == site.span));
    let Some(owner) = owner else {
        return (SymbolKind::LocalVariable, None);
    };
    let scope_type = module.scope(owner).scope_type;
    if scope_type.is_type_body() {
        (SymbolKind::MemberVariable, module.scope_type_name(owner).map(str::to_string))
    } else if scope_type.is_code() {
        (SymbolKind::LocalVariable, None)
    } else {
        (SymbolKind::GlobalVariable, module.namespace_path(owner))
    }
}
