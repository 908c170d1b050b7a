use std::sync::Arc;

use super::database_function;
use crate::module::{Module, StatementId};
use crate::parser::ast::{Node, NodeKind};
use crate::resolve::{classify_conversion, resolve_expression, resolve_type_from_expression, Conversion, ExprType};
use crate::span::Span;
use crate::typedb::{DBType, TypeDatabase};

/// An expression that needs `Cast<T>()` to fit its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastSuggestion {
    pub cast_to: String,
    /// Absolute span of the expression to wrap.
    pub expression: Span,
}

/// For an assignment, initialized declaration or return statement whose value
/// is a base class of its destination, the cast that would make it valid.
pub fn cast_suggestion(module: &Module, db: &TypeDatabase, id: StatementId) -> Option<CastSuggestion> {
    let stmt = module.statement(id);
    let scope = stmt.scope;
    let (target, value): (Option<Arc<DBType>>, &Node) = match &stmt.ast.as_ref()?.kind {
        NodeKind::Assignment { lhs, rhs } => (resolve_type_from_expression(module, db, scope, lhs), &**rhs),
        NodeKind::VariableDecl(decl) => {
            let target = decl.typename.as_typename().and_then(|t| db.resolve_typename(&t.display_name()));
            (target, decl.init.as_deref()?)
        }
        NodeKind::ReturnStatement(Some(value)) => {
            let function = database_function(module, db, scope)?;
            (db.resolve_typename(&function.return_type), &**value)
        }
        _ => return None,
    };
    let target = target?;
    let source = resolve_expression(module, db, scope, value);
    let ExprType::Type(source_type) = &source else {
        return None;
    };
    if target.is_primitive() || source_type.is_primitive() || target.is_struct() || source_type.is_struct() {
        return None;
    }
    match classify_conversion(db, &source, &target)? {
        Conversion::Cast => Some(CastSuggestion { cast_to: target.typename.clone(), expression: stmt.absolute(value.span) }),
        Conversion::Identity | Conversion::Implicit | Conversion::Incompatible => None,
    }
}
