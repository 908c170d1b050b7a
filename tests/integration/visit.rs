/// Tests for the module visitor infrastructure.
///
/// These tests build modules from source text and check that the visitor
/// traits and walk functions reach every scope, statement and node.
use asls_core::module::{Module, ScopeId, ScopeType, StatementId};
use asls_core::parser::ast::{Node, NodeKind, NodeTag};
use asls_core::visit::{walk_module, walk_node, walk_scope, walk_statement, Visitor};

const SOURCE: &str = "\
class AGun
{
    int Ammo = 30;
    void Fire(int Count)
    {
        for (int i = 0; i < Count; i++)
        {
            Ammo -= 1;
        }
        return;
    }
}
";

#[test]
fn test_visitor_visits_nested_expressions() {
    let module = Module::new("Gun", SOURCE);

    struct IdentCounter {
        count: usize,
    }

    impl Visitor for IdentCounter {
        fn visit_node(&mut self, module: &Module, node: &Node) {
            if matches!(node.kind, NodeKind::Identifier(_)) {
                self.count += 1;
            }
            walk_node(self, module, node); // Continue recursion
        }
    }

    let mut counter = IdentCounter { count: 0 };
    walk_module(&mut counter, &module);

    // i, Count, i, Ammo
    assert!(counter.count >= 4, "Expected at least 4 identifiers, found {}", counter.count);
}

#[test]
fn test_visitor_can_collect_specific_nodes() {
    let module = Module::new("Gun", SOURCE);

    struct LiteralCollector {
        values: Vec<String>,
    }

    impl Visitor for LiteralCollector {
        fn visit_node(&mut self, module: &Module, node: &Node) {
            if let NodeKind::ConstInteger(value) = &node.kind {
                self.values.push(value.clone());
            }
            walk_node(self, module, node);
        }
    }

    let mut collector = LiteralCollector { values: vec![] };
    walk_module(&mut collector, &module);
    assert_eq!(collector.values, ["30", "0", "1"]);
}

#[test]
fn test_visitor_can_prune_subtree() {
    let module = Module::new("Gun", SOURCE);

    struct LoopPruner {
        found_loop_body: bool,
    }

    impl Visitor for LoopPruner {
        fn visit_scope(&mut self, module: &Module, scope: ScopeId) {
            // Don't descend into loop bodies
            if module.scope(scope).scope_type == ScopeType::Loop {
                return;
            }
            walk_scope(self, module, scope);
        }

        fn visit_node(&mut self, module: &Module, node: &Node) {
            if node.tag() == NodeTag::CompoundAssignment {
                self.found_loop_body = true;
            }
            walk_node(self, module, node);
        }
    }

    let mut visitor = LoopPruner { found_loop_body: false };
    walk_module(&mut visitor, &module);
    assert!(!visitor.found_loop_body, "Should not find statements inside the pruned loop");
}

#[test]
fn test_visitor_sees_headers_before_their_bodies() {
    let module = Module::new("Gun", SOURCE);

    struct Order {
        tags: Vec<NodeTag>,
    }

    impl Visitor for Order {
        fn visit_statement(&mut self, module: &Module, statement: StatementId) {
            if let Some(ast) = &module.statement(statement).ast {
                self.tags.push(ast.tag());
            }
            walk_statement(self, module, statement);
        }
    }

    let mut order = Order { tags: vec![] };
    walk_module(&mut order, &module);
    assert_eq!(
        order.tags,
        [
            NodeTag::ClassDefinition,
            NodeTag::VariableDecl,
            NodeTag::FunctionDecl,
            NodeTag::ForLoop,
            NodeTag::CompoundAssignment,
            NodeTag::ReturnStatement,
        ]
    );
}

#[test]
fn test_visitor_skips_statements_without_ast() {
    let module = Module::new("Broken", "void F()\n{\n    int = ;\n    Call();\n}\n");

    struct Calls {
        count: usize,
        statements: usize,
    }

    impl Visitor for Calls {
        fn visit_statement(&mut self, module: &Module, statement: StatementId) {
            self.statements += 1;
            walk_statement(self, module, statement);
        }

        fn visit_node(&mut self, module: &Module, node: &Node) {
            if node.tag() == NodeTag::FunctionCall {
                self.count += 1;
            }
            walk_node(self, module, node);
        }
    }

    let mut calls = Calls { count: 0, statements: 0 };
    walk_module(&mut calls, &module);
    assert_eq!(calls.count, 1);
    assert!(calls.statements >= 3);
}
