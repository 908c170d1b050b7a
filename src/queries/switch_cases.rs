use crate::module::{Element, Module, ScopeId, StatementId};
use crate::parser::ast::{Node, NodeKind};
use crate::resolve::resolve_type_from_expression;
use crate::typedb::TypeDatabase;

/// Enum values a switch does not handle yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchCases {
    /// Display name of the enum switched on.
    pub enum_name: String,
    /// `EMode::Value` labels, in declaration order.
    pub missing: Vec<String>,
    pub switch_statement: StatementId,
    pub block: ScopeId,
    /// Where new cases go before, if the switch has a `default:`.
    pub default_case: Option<StatementId>,
}

/// Whether an enum value name matches one of the ignore patterns. A leading
/// `*` matches any prefix: `*_MAX` ignores `Mode_MAX`.
pub fn is_ignored_enum_value(name: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| match pattern.strip_prefix('*') {
        Some(suffix) => name.ends_with(suffix),
        None => name == pattern,
    })
}

/// Missing cases of the switch over an enum whose header or body contains `offset`.
pub fn missing_switch_cases(
    module: &Module,
    db: &TypeDatabase,
    offset: usize,
    ignored: &[String],
) -> Option<SwitchCases> {
    let (switch_statement, block) = find_switch(module, offset)?;
    let header = module.statement(switch_statement);
    let NodeKind::SwitchStatement(subject) = &header.ast.as_ref()?.kind else {
        return None;
    };
    let ty = resolve_type_from_expression(module, db, header.scope, subject)?;
    if !ty.is_enum() {
        return None;
    }

    let mut implemented = Vec::new();
    let mut default_case = None;
    for id in module.scope(block).statements() {
        match module.statement(id).ast.as_ref().map(|n| &n.kind) {
            Some(NodeKind::DefaultCaseStatement) => default_case = Some(id),
            Some(NodeKind::CaseStatement(label)) => implemented.extend(case_label(label)),
            _ => {}
        }
    }

    let enum_name = ty.display_name().to_string();
    let missing = ty
        .properties
        .iter()
        .filter(|value| !is_ignored_enum_value(&value.name, ignored))
        .map(|value| format!("{enum_name}::{}", value.name))
        .filter(|label| !implemented.contains(label))
        .collect();

    Some(SwitchCases { enum_name, missing, switch_statement, block, default_case })
}

/// The switch header at `offset`, or the switch whose block contains it.
fn find_switch(module: &Module, offset: usize) -> Option<(StatementId, ScopeId)> {
    let is_switch = |id: StatementId| {
        matches!(module.statement(id).ast.as_ref().map(|n| &n.kind), Some(NodeKind::SwitchStatement(_)))
    };
    if let Some(id) = module.statement_at(offset).filter(|id| is_switch(*id)) {
        if let Some(Element::Scope(block)) = module.statement(id).next {
            return Some((id, block));
        }
    }
    let scope = module.scope_at(offset);
    match module.scope(scope).previous {
        Some(Element::Statement(id)) if is_switch(id) => Some((id, scope)),
        _ => None,
    }
}

/// `EMode::Value` for a qualified case label.
fn case_label(label: &Node) -> Option<String> {
    let NodeKind::NamespaceAccess { namespace: Some(namespace), member: Some(member) } = &label.kind else {
        return None;
    };
    Some(format!("{}::{}", namespace.value()?, member.node))
}
