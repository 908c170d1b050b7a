use std::collections::HashSet;
use std::sync::Arc;

use crate::module::{Module, ScopeId, ScopeType};
use crate::parser::ast::NodeKind;
use crate::resolve::enclosing_type;
use crate::typedb::{DBMethod, DBType, SymbolFilter, TypeDatabase};

/// Ancestor methods `ty` could override: not yet overridden, not private and
/// not final. Engine types only offer their blueprint events. Nearest
/// declaration first; each name appears once.
pub fn override_candidates(db: &TypeDatabase, ty: &Arc<DBType>) -> Vec<Arc<DBMethod>> {
    let mut out = Vec::new();
    if ty.supertype.is_none() {
        return out;
    }
    let mut seen: HashSet<String> = HashSet::new();
    for ancestor in ty.inheritance_types(db) {
        for method in &ancestor.methods {
            if ancestor.is_unreal_type() && !method.is_event {
                continue;
            }
            if seen.contains(&method.name) {
                continue;
            }
            let Some(existing) = ty.find_first_symbol(db, &method.name, SymbolFilter::FunctionOnly) else {
                continue;
            };
            if existing.containing_type() == ty.typename || method.is_private {
                continue;
            }
            seen.insert(method.name.clone());
            if !method.is_final {
                out.push(method.clone());
            }
        }
    }
    out
}

/// Override candidates for the class body containing `offset`, or for the
/// class of a method when `offset` is on that method's header line, as in
/// `void Tick() {|}`.
pub fn override_candidates_at(module: &Module, db: &TypeDatabase, offset: usize) -> Vec<Arc<DBMethod>> {
    let scope = module.scope_at(offset);
    let class_body = match module.scope(scope).scope_type {
        ScopeType::Class => Some(scope),
        ScopeType::Function => method_header_class(module, scope, offset),
        _ => None,
    };
    match class_body.and_then(|body| enclosing_type(module, db, body)) {
        Some(ty) => override_candidates(db, &ty),
        None => Vec::new(),
    }
}

/// Class body owning the method `body`, when `offset` sits on the lines
/// between the method's header and its opening brace.
fn method_header_class(module: &Module, body: ScopeId, offset: usize) -> Option<ScopeId> {
    let parent = module.scope(body).parent?;
    if module.scope(parent).scope_type != ScopeType::Class {
        return None;
    }
    let header = module.statement(module.scope(body).declaration?);
    let NodeKind::FunctionDecl(_) = &header.ast.as_ref()?.kind else {
        return None;
    };
    let header_start = header.absolute(header.ast.as_ref()?.span).start;
    let line = module.position_at(offset).line;
    let first = module.position_at(header_start).line;
    let brace = module.position_at(module.scope(body).span.start).line;
    (first..=brace).contains(&line).then_some(parent)
}
