//! Questions editor features ask about a module once it is parsed and its
//! declarations are registered. These compute answers only; turning them
//! into edits is up to the caller.

pub mod autos;
pub mod casts;
pub mod overrides;
pub mod promotion;
pub mod super_calls;
pub mod switch_cases;

use std::sync::Arc;

pub use autos::{auto_materializations, AutoMaterialization};
pub use casts::{cast_suggestion, CastSuggestion};
pub use overrides::{override_candidates, override_candidates_at};
pub use promotion::{variable_promotion, VariablePromotion};
pub use super_calls::{missing_super_call, MissingSuperCall};
pub use switch_cases::{missing_switch_cases, SwitchCases};

use crate::module::{Module, ScopeId};
use crate::parser::ast::NodeKind;
use crate::resolve::{enclosing_type, namespace_chain};
use crate::typedb::{DBMethod, TypeDatabase};

/// Database entry of the function whose body encloses `scope`.
pub fn database_function(module: &Module, db: &TypeDatabase, scope: ScopeId) -> Option<Arc<DBMethod>> {
    let body = module.parent_function_scope(scope)?;
    let NodeKind::FunctionDecl(decl) = &module.scope_declaration(body)?.kind else {
        return None;
    };
    let name = decl.name.node.as_str();
    if let Some(ty) = enclosing_type(module, db, body) {
        return ty.local_method(name).cloned();
    }
    namespace_chain(module, db, body).into_iter().find_map(|ns| ns.local_method(name).cloned())
}
