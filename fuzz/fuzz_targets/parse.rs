#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// Script-shaped fragments; random bytes rarely reach past the first statement.
#[derive(Arbitrary, Debug)]
enum Fragment {
    Ident,
    TypeName,
    IntLit,
    FloatLit,
    StringLit,
    Operator,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Semicolon,
    Colon,
    ColonColon,
    Dot,
    Comma,
    Class,
    Enum,
    Namespace,
    If,
    Else,
    For,
    Switch,
    Case,
    Return,
    Auto,
    Macro,
    Import,
    Newline,
    Raw(String),
}

impl Fragment {
    fn text(&self) -> &str {
        match self {
            Fragment::Ident => "Value",
            Fragment::TypeName => "TArray<AActor>",
            Fragment::IntLit => "42",
            Fragment::FloatLit => "1.5f",
            Fragment::StringLit => "\"str\"",
            Fragment::Operator => " + ",
            Fragment::LeftParen => "(",
            Fragment::RightParen => ")",
            Fragment::LeftBrace => "{",
            Fragment::RightBrace => "}",
            Fragment::Semicolon => ";",
            Fragment::Colon => ":",
            Fragment::ColonColon => "::",
            Fragment::Dot => ".",
            Fragment::Comma => ",",
            Fragment::Class => "class A : B ",
            Fragment::Enum => "enum E ",
            Fragment::Namespace => "namespace N ",
            Fragment::If => "if ",
            Fragment::Else => "else ",
            Fragment::For => "for ",
            Fragment::Switch => "switch ",
            Fragment::Case => "case ",
            Fragment::Return => "return ",
            Fragment::Auto => "auto ",
            Fragment::Macro => "UFUNCTION() ",
            Fragment::Import => "import ",
            Fragment::Newline => "\n",
            Fragment::Raw(s) => s,
        }
    }
}

fuzz_target!(|fragments: Vec<Fragment>| {
    let source: String = fragments.iter().map(Fragment::text).collect();
    // The whole pipeline must survive: tree, declarations, symbols, queries
    let workspace = asls_core::analyze_source("Fuzz", &source);
    if let Some(module) = workspace.module("Fuzz") {
        for offset in [0, source.len() / 2, source.len()] {
            let _ = asls_core::queries::missing_switch_cases(module, workspace.db(), offset, &[]);
            let _ = asls_core::queries::override_candidates_at(module, workspace.db(), offset);
        }
    }
});
