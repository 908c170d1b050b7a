//! Turning a module's scope tree into database entries, and swapping those
//! entries in and out as the module changes.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::types::{DBArg, DBMethod, DBProperty, DBType, TypeKind};
use super::TypeDatabase;
use crate::module::{Module, ScopeId, ScopeType, Statement};
use crate::parser::ast::{FunctionDecl, FunctionSignature, Node, NodeKind, Parameter, VariableDecl};

/// Everything one module contributes to the database.
#[derive(Debug, Clone, Default)]
pub struct ModuleDeclarations {
    pub module: String,
    /// Classes, structs, enums and delegates owned by the module.
    pub types: Vec<DBType>,
    /// Functions declared at global or namespace level, keyed by namespace
    /// path (`""` for the global namespace).
    pub namespace_methods: BTreeMap<String, Vec<DBMethod>>,
    pub namespace_properties: BTreeMap<String, Vec<DBProperty>>,
}

impl ModuleDeclarations {
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.typename.as_str())
    }
}

struct Collector<'m> {
    module: &'m Module,
    out: ModuleDeclarations,
}

/// Gather the declarations of every type body, namespace and the root scope.
pub fn collect_declarations(module: &Module) -> ModuleDeclarations {
    let mut collector = Collector {
        module,
        out: ModuleDeclarations { module: module.name().to_string(), ..ModuleDeclarations::default() },
    };
    for id in module.scope_ids() {
        match module.scope(id).scope_type {
            ScopeType::Class | ScopeType::Struct => collector.type_body(id),
            ScopeType::Enum => collector.enum_body(id),
            ScopeType::Global => collector.namespace_body(id, String::new()),
            ScopeType::Namespace => {
                let path = module.namespace_path(id).unwrap_or_default();
                collector.namespace_body(id, path);
            }
            _ => {}
        }
    }
    collector.out
}

/// Statements of a scope that parsed, with their trees.
fn parsed_statements(module: &Module, scope: ScopeId) -> impl Iterator<Item = (&Statement, &Node)> {
    module
        .scope(scope)
        .statements()
        .map(move |id| module.statement(id))
        .filter_map(|stmt| stmt.ast.as_ref().map(|ast| (stmt, ast)))
}

impl Collector<'_> {
    fn module_name(&self) -> Option<String> {
        Some(self.module.name().to_string())
    }

    fn text_of(&self, stmt: &Statement, node: &Node) -> String {
        let span = stmt.absolute(node.span);
        self.module.text().get(span.start..span.end).unwrap_or_default().to_string()
    }

    fn type_body(&mut self, id: ScopeId) {
        let Some(header) = self.module.scope(id).declaration.map(|s| self.module.statement(s)) else {
            return;
        };
        let mut ty = match header.ast.as_ref().map(|n| &n.kind) {
            Some(NodeKind::ClassDefinition { name, superclass, .. }) => {
                let mut ty = DBType::new(name.node.clone(), TypeKind::Class);
                ty.supertype = superclass.as_ref().map(|s| s.node.clone());
                ty.declared_at = Some(header.absolute(name.span));
                ty
            }
            Some(NodeKind::StructDefinition { name, .. }) => {
                let mut ty = DBType::new(name.node.clone(), TypeKind::Struct);
                ty.declared_at = Some(header.absolute(name.span));
                ty
            }
            _ => return,
        };
        ty.declared_module = self.module_name();

        for (stmt, ast) in parsed_statements(self.module, id) {
            match &ast.kind {
                NodeKind::FunctionDecl(decl) => {
                    let method = self.method(stmt, decl, &ty.typename);
                    ty.methods.push(Arc::new(method));
                }
                NodeKind::VariableDecl(decl) => ty.properties.push(Arc::new(self.property(stmt, decl, &ty.typename))),
                NodeKind::VariableDeclMulti(decls) => {
                    for decl in decls {
                        if let NodeKind::VariableDecl(decl) = &decl.kind {
                            ty.properties.push(Arc::new(self.property(stmt, decl, &ty.typename)));
                        }
                    }
                }
                _ => {}
            }
        }
        self.out.types.push(ty);
    }

    fn enum_body(&mut self, id: ScopeId) {
        let Some(header) = self.module.scope(id).declaration.map(|s| self.module.statement(s)) else {
            return;
        };
        let Some(NodeKind::EnumDefinition { name, .. }) = header.ast.as_ref().map(|n| &n.kind) else {
            return;
        };
        let mut ty = DBType::new(name.node.clone(), TypeKind::Enum);
        ty.declared_module = self.module_name();
        ty.declared_at = Some(header.absolute(name.span));

        for (stmt, ast) in parsed_statements(self.module, id) {
            let NodeKind::EnumValueList(values) = &ast.kind else { continue };
            for value in values {
                let NodeKind::EnumValue(value) = &value.kind else { continue };
                ty.properties.push(Arc::new(DBProperty {
                    name: value.name.node.clone(),
                    typename: ty.typename.clone(),
                    containing_type: ty.typename.clone(),
                    declared_module: self.module_name(),
                    declared_at: Some(stmt.absolute(value.name.span)),
                    ..DBProperty::default()
                }));
            }
        }
        self.out.types.push(ty);
    }

    fn namespace_body(&mut self, id: ScopeId, path: String) {
        let owner = super::namespace_key(&path);
        let mut methods = Vec::new();
        let mut properties = Vec::new();

        for (stmt, ast) in parsed_statements(self.module, id) {
            match &ast.kind {
                NodeKind::FunctionDecl(decl) => {
                    let mut method = self.method(stmt, decl, &owner);
                    method.is_static = true;
                    methods.push(method);
                }
                NodeKind::VariableDecl(decl) => properties.push(self.property(stmt, decl, &owner)),
                NodeKind::VariableDeclMulti(decls) => {
                    for decl in decls {
                        if let NodeKind::VariableDecl(decl) = &decl.kind {
                            properties.push(self.property(stmt, decl, &owner));
                        }
                    }
                }
                NodeKind::AssetDefinition { name, typename } => properties.push(DBProperty {
                    name: name.node.clone(),
                    typename: typename.node.clone(),
                    containing_type: owner.clone(),
                    declared_module: self.module_name(),
                    declared_at: Some(stmt.absolute(name.span)),
                    ..DBProperty::default()
                }),
                NodeKind::DelegateDecl(sig) => {
                    let ty = self.delegate(stmt, sig, TypeKind::Delegate);
                    self.out.types.push(ty);
                }
                NodeKind::EventDecl(sig) => {
                    let ty = self.delegate(stmt, sig, TypeKind::Event);
                    self.out.types.push(ty);
                }
                _ => {}
            }
        }

        if !methods.is_empty() {
            self.out.namespace_methods.entry(path.clone()).or_default().extend(methods);
        }
        if !properties.is_empty() {
            self.out.namespace_properties.entry(path).or_default().extend(properties);
        }
    }

    fn args(&self, stmt: &Statement, params: &[Node]) -> Vec<DBArg> {
        params
            .iter()
            .filter_map(|param| {
                let NodeKind::Parameter(Parameter { typename, name, default }) = &param.kind else {
                    return None;
                };
                Some(DBArg {
                    name: name.as_ref().map(|n| n.node.clone()),
                    typename: typename.as_typename().map(ToString::to_string)?,
                    default: default.as_ref().map(|d| self.text_of(stmt, d)),
                })
            })
            .collect()
    }

    fn method(&self, stmt: &Statement, decl: &FunctionDecl, owner: &str) -> DBMethod {
        // Overrides of blueprint events stay overridable from blueprint.
        let is_event = decl.prefix.macro_.as_ref().is_some_and(|m| {
            m.macro_has_specifier("BlueprintEvent") || m.macro_has_specifier("BlueprintOverride")
        });
        DBMethod {
            name: decl.name.node.clone(),
            return_type: decl.return_type.as_typename().map(ToString::to_string).unwrap_or_else(|| "void".to_string()),
            args: self.args(stmt, &decl.params),
            containing_type: owner.to_string(),
            declared_module: self.module_name(),
            declared_at: Some(stmt.absolute(decl.name.span)),
            is_const: decl.is_const,
            is_event,
            is_final: decl.is_final,
            is_private: decl.prefix.is_private,
            is_protected: decl.prefix.is_protected,
            is_property: decl.is_property,
            is_static: false,
            is_mixin: decl.is_mixin,
        }
    }

    fn property(&self, stmt: &Statement, decl: &VariableDecl, owner: &str) -> DBProperty {
        DBProperty {
            name: decl.name.node.clone(),
            typename: decl.typename.as_typename().map(ToString::to_string).unwrap_or_default(),
            containing_type: owner.to_string(),
            declared_module: self.module_name(),
            declared_at: Some(stmt.absolute(decl.name.span)),
            is_private: decl.prefix.is_private,
            is_protected: decl.prefix.is_protected,
        }
    }

    /// Delegates and events become types with their binding and invocation methods.
    fn delegate(&self, stmt: &Statement, sig: &FunctionSignature, kind: TypeKind) -> DBType {
        let mut ty = DBType::new(sig.name.node.clone(), kind);
        ty.declared_module = self.module_name();
        ty.declared_at = Some(stmt.absolute(sig.name.span));
        ty.delegate_return = sig.return_type.as_typename().map(ToString::to_string);
        ty.delegate_args = self.args(stmt, &sig.params);

        let bind_args = || {
            vec![
                DBArg { name: Some("Object".to_string()), typename: "UObject".to_string(), default: None },
                DBArg { name: Some("FunctionName".to_string()), typename: "FName".to_string(), default: None },
            ]
        };
        let invoke_name = if kind == TypeKind::Event { "Broadcast" } else { "ExecuteIfBound" };
        let mut members = vec![
            ("IsBound", "bool".to_string(), Vec::new()),
            ("Clear", "void".to_string(), Vec::new()),
            (invoke_name, "void".to_string(), ty.delegate_args.clone()),
        ];
        if kind == TypeKind::Event {
            members.push(("AddUFunction", "void".to_string(), bind_args()));
        } else {
            members.push(("BindUFunction", "void".to_string(), bind_args()));
            members.push((
                "Execute",
                ty.delegate_return.clone().unwrap_or_else(|| "void".to_string()),
                ty.delegate_args.clone(),
            ));
        }
        ty.methods = members
            .into_iter()
            .map(|(name, return_type, args)| {
                Arc::new(DBMethod {
                    name: name.to_string(),
                    return_type,
                    args,
                    containing_type: ty.typename.clone(),
                    ..DBMethod::default()
                })
            })
            .collect();
        ty
    }
}

impl TypeDatabase {
    /// Replace everything `decls.module` registered before with `decls`.
    pub fn register_module(&mut self, decls: ModuleDeclarations) {
        let module = decls.module.clone();
        self.remove_module(&module);

        for ty in &decls.types {
            self.insert(ty.clone());
        }
        let owned = decls.types;

        let mut namespaces: BTreeMap<String, (Vec<DBMethod>, Vec<DBProperty>)> = BTreeMap::new();
        for (path, methods) in decls.namespace_methods {
            namespaces.entry(path).or_default().0.extend(methods);
        }
        for (path, properties) in decls.namespace_properties {
            namespaces.entry(path).or_default().1.extend(properties);
        }
        for (path, (methods, properties)) in namespaces {
            let mut ns = self.namespace(&path).map(|t| (*t).clone()).unwrap_or_else(|| DBType::namespace(&path));
            ns.methods.extend(methods.into_iter().map(Arc::new));
            ns.properties.extend(properties.into_iter().map(Arc::new));
            self.insert(ns);
        }

        log::debug!("registered module {module}: {} types", owned.len());
        self.module_types.insert(module, owned);
    }

    /// Drop the types a module owns and its members of shared namespaces. A
    /// type another registered module also declares goes back to that
    /// module's declaration.
    pub fn remove_module(&mut self, module: &str) {
        let owned = self.module_types.remove(module).unwrap_or_default();
        for ty in &owned {
            let name = ty.typename.as_str();
            let still_ours = self.get_type(name).is_some_and(|t| t.declared_module.as_deref() == Some(module));
            if !still_ours {
                continue;
            }
            self.remove(name);
            if let Some(survivor) = self.surviving_declaration(name) {
                log::debug!("{name} falls back to {:?}", survivor.declared_module);
                self.insert(survivor);
            }
        }

        let touched: Vec<Arc<DBType>> = self
            .types
            .values()
            .filter(|t| t.kind == TypeKind::Namespace)
            .filter(|t| {
                t.methods.iter().any(|m| m.declared_module.as_deref() == Some(module))
                    || t.properties.iter().any(|p| p.declared_module.as_deref() == Some(module))
            })
            .cloned()
            .collect();
        for ns in touched {
            let mut ns = (*ns).clone();
            ns.methods.retain(|m| m.declared_module.as_deref() != Some(module));
            ns.properties.retain(|p| p.declared_module.as_deref() != Some(module));
            self.insert(ns);
        }

        if !owned.is_empty() {
            log::debug!("removed module {module}: {} types", owned.len());
        }
    }

    /// Declaration of `name` by some other registered module, picking the
    /// first module by name so the outcome does not depend on map order.
    fn surviving_declaration(&self, name: &str) -> Option<DBType> {
        self.module_types
            .iter()
            .filter_map(|(module, types)| Some((module, types.iter().find(|t| t.typename == name)?)))
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(_, ty)| ty.clone())
    }
}
