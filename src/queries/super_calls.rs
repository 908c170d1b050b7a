use std::sync::Arc;

use crate::module::{Module, ScopeId};
use crate::parser::ast::{Node, NodeKind};
use crate::resolve::enclosing_type;
use crate::typedb::{DBMethod, TypeDatabase};
use crate::visit::{walk_node, walk_scope, Visitor};

/// An override whose body never calls the method it replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingSuperCall {
    /// The overridden method, from the nearest ancestor declaring it.
    pub method: Arc<DBMethod>,
    /// Parameter names of the override, to forward in the call.
    pub arguments: Vec<String>,
    /// Offset right after the opening brace of the override's body.
    pub insert_at: usize,
}

/// For the `override` method whose body contains `offset`: the parent method
/// when one exists and `Super::Name(...)` appears nowhere in the body.
pub fn missing_super_call(module: &Module, db: &TypeDatabase, offset: usize) -> Option<MissingSuperCall> {
    let body = module.parent_function_scope(module.scope_at(offset))?;
    let NodeKind::FunctionDecl(decl) = &module.scope_declaration(body)?.kind else {
        return None;
    };
    if !decl.is_override {
        return None;
    }
    let ty = enclosing_type(module, db, body)?;
    let parent = db.get_type(ty.supertype.as_deref()?)?;
    let method = parent.get_method(db, &decl.name.node)?;
    if method.is_private || calls_super(module, body, &decl.name.node) {
        return None;
    }
    let arguments = decl
        .params
        .iter()
        .filter_map(|param| match &param.kind {
            NodeKind::Parameter(p) => p.name.as_ref().map(|n| n.node.clone()),
            _ => None,
        })
        .collect();
    Some(MissingSuperCall { method, arguments, insert_at: module.scope(body).span.start + 1 })
}

fn calls_super(module: &Module, body: ScopeId, name: &str) -> bool {
    let mut finder = SuperCallFinder { name, found: false };
    walk_scope(&mut finder, module, body);
    finder.found
}

struct SuperCallFinder<'n> {
    name: &'n str,
    found: bool,
}

impl Visitor for SuperCallFinder<'_> {
    fn visit_node(&mut self, module: &Module, node: &Node) {
        if let NodeKind::FunctionCall { callee, .. } = &node.kind {
            if let NodeKind::NamespaceAccess { namespace: Some(qualifier), member: Some(member) } = &callee.kind {
                if member.node == self.name && qualifier.value() == Some("Super") {
                    self.found = true;
                }
            }
        }
        if !self.found {
            walk_node(self, module, node);
        }
    }
}
