//! Indentation inference for generated code.

use super::{Element, Module, ScopeId, StatementId};

/// Leading whitespace of the first non-blank line of a statement. `None` when
/// the statement is blank or that line is a preprocessor directive.
pub fn indent_for_statement(module: &Module, id: StatementId) -> Option<String> {
    let content = &module.statement(id).content;
    let line = content.split('\n').find(|line| !line.chars().all(|c| matches!(c, ' ' | '\t' | '\r')))?;
    let mut indent = String::new();
    for c in line.chars() {
        match c {
            ' ' | '\t' => indent.push(c),
            '\r' => continue,
            '#' => return None,
            _ => break,
        }
    }
    Some(indent)
}

/// Indentation of statements inside a block: taken from its first statement
/// that has one, or one level deeper than the header when the block is empty.
pub fn indent_for_block(module: &Module, id: ScopeId) -> Option<String> {
    let scope = module.scope(id);
    let mut statements = scope.statements().peekable();
    if statements.peek().is_some() {
        return statements.find_map(|stmt| indent_for_statement(module, stmt));
    }
    match scope.previous {
        Some(Element::Statement(header)) => indent_for_statement(module, header).map(|i| extend_indent(&i)),
        _ => None,
    }
}

/// One level deeper, in the style the indent already uses.
pub fn extend_indent(indent: &str) -> String {
    if indent.is_empty() {
        "\t".to_string()
    } else if indent.contains('\t') {
        format!("{indent}\t")
    } else {
        format!("{indent}    ")
    }
}
