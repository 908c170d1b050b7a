//! Read-only traversal of a module: its scope tree, the statements in each
//! scope and the syntax tree of every parsed statement.
//!
//! ## Usage
//!
//! Implement [`Visitor`] for your pass, overriding only the methods you need.
//! Call the corresponding `walk_*` function inside your override to keep
//! recursing; leave it out to prune the subtree.
//!
//! ```rust
//! use asls_core::module::Module;
//! use asls_core::parser::ast::{Node, NodeKind};
//! use asls_core::visit::{walk_module, walk_node, Visitor};
//!
//! struct IdentCollector {
//!     names: Vec<String>,
//! }
//!
//! impl Visitor for IdentCollector {
//!     fn visit_node(&mut self, module: &Module, node: &Node) {
//!         if let NodeKind::Identifier(name) = &node.kind {
//!             self.names.push(name.clone());
//!         }
//!         walk_node(self, module, node); // Continue recursion
//!     }
//! }
//!
//! let module = Module::new("Demo", "int A = B + C;");
//! let mut collector = IdentCollector { names: vec![] };
//! walk_module(&mut collector, &module);
//! assert_eq!(collector.names, ["B", "C"]);
//! ```
//!
//! Statements are visited in source order, each before the scope it heads,
//! so a pass sees a function's declaration before the statements of its body.
//! Statements that failed to parse are visited but have no nodes to walk.

use crate::module::{Element, Module, ScopeId, StatementId};
use crate::parser::ast::Node;

pub trait Visitor: Sized {
    fn visit_scope(&mut self, module: &Module, scope: ScopeId) {
        walk_scope(self, module, scope);
    }

    fn visit_statement(&mut self, module: &Module, statement: StatementId) {
        walk_statement(self, module, statement);
    }

    fn visit_node(&mut self, module: &Module, node: &Node) {
        walk_node(self, module, node);
    }
}

/// Visit every scope of `module`, starting at the root.
pub fn walk_module<V: Visitor>(v: &mut V, module: &Module) {
    v.visit_scope(module, module.root());
}

pub fn walk_scope<V: Visitor>(v: &mut V, module: &Module, scope: ScopeId) {
    for child in &module.scope(scope).children {
        match *child {
            Element::Statement(id) => v.visit_statement(module, id),
            Element::Scope(id) => v.visit_scope(module, id),
        }
    }
}

pub fn walk_statement<V: Visitor>(v: &mut V, module: &Module, statement: StatementId) {
    if let Some(ast) = &module.statement(statement).ast {
        v.visit_node(module, ast);
    }
}

pub fn walk_node<V: Visitor>(v: &mut V, module: &Module, node: &Node) {
    for child in node.children() {
        v.visit_node(module, child);
    }
}
