//! Snapshot tests for parse error messages and where they land.
//!
//! Uses insta to capture error messages and detect regressions.
//! Run `cargo insta review` to review changes.

use asls_core::diagnostics::render_errors;
use asls_core::{Config, Module, Workspace};
use insta::assert_snapshot;

const BROKEN: &str = "\
int X = 1 2;
void F()
{
    int A = ;
    Call(1, 2;
}
";

/// One line per diagnostic: zero-based line and column, then the message.
fn diagnostic_lines(source: &str) -> String {
    let mut ws = Workspace::new(Config::default());
    ws.open_module("Broken", source);
    ws.diagnostics("Broken")
        .iter()
        .map(|d| format!("{}:{} {}", d.range.start.line, d.range.start.character, d.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn diagnostics_of_a_broken_module() {
    assert_snapshot!(diagnostic_lines(BROKEN), @r"
    0:10 unexpected integer after end of statement
    3:11 expected an expression
    4:13 expected ')'
    ");
}

#[test]
fn error_display_names_the_kind() {
    let module = Module::new("Broken", BROKEN);
    let messages: Vec<String> = module.parse_errors().iter().map(ToString::to_string).collect();
    assert_snapshot!(messages.join("\n"), @r"
    Syntax error: unexpected integer after end of statement
    Syntax error: unexpected end of statement, expected an expression
    Syntax error: unexpected end of statement, expected ')'
    ");
}

#[test]
fn rendered_report_points_into_the_source() {
    let module = Module::new("Broken", BROKEN);
    let rendered = render_errors(module.text(), &module.parse_errors());
    assert_eq!(rendered.matches("syntax error").count(), 3);
    assert!(rendered.contains("int X = 1 2;"));
    assert!(rendered.contains("expected ')'"));
}

#[test]
fn clean_module_has_no_diagnostics() {
    assert_snapshot!(diagnostic_lines("class A\n{\n    int X = 1;\n}\n"), @"");
}
