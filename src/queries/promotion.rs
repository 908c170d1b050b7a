use crate::module::{Module, ScopeId, StatementId};
use crate::parser::ast::NodeKind;
use crate::resolve::{lookup_name, resolve_written_type};
use crate::typedb::TypeDatabase;

/// An assignment to a name nothing declares, which could become a member of
/// the enclosing class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePromotion {
    pub name: String,
    /// Type of the assigned value, as it would be written in the declaration.
    pub typename: String,
    /// Body of the class the member would be added to.
    pub class_scope: ScopeId,
}

/// `Name = Value;` inside a method, where `Name` does not resolve and the
/// type of `Value` does.
pub fn variable_promotion(module: &Module, db: &TypeDatabase, id: StatementId) -> Option<VariablePromotion> {
    let stmt = module.statement(id);
    let NodeKind::Assignment { lhs, rhs } = &stmt.ast.as_ref()?.kind else {
        return None;
    };
    let NodeKind::Identifier(name) = &lhs.kind else {
        return None;
    };
    module.parent_function_scope(stmt.scope)?;
    let class_scope = module.parent_type_scope(stmt.scope)?;
    if lookup_name(module, db, stmt.scope, name).is_some() {
        return None;
    }
    let typename = resolve_written_type(module, db, stmt.scope, rhs)?;
    db.resolve_typename(&typename)?;
    Some(VariablePromotion { name: name.clone(), typename, class_scope })
}
