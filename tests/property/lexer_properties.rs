// Property-Based Testing for the script lexer
//
// Property-based testing validates INVARIANTS (properties that should ALWAYS hold)
// across randomly generated inputs, rather than testing specific examples.
//
// This file covers:
// 1. Basic properties (safety, determinism)
// 2. Structural properties (span ordering, bounds, coverage of the source)
// 3. Literal and identifier generators

use asls_core::lexer::{is_keyword, lex, token::Token, Lexed};
use asls_core::span::Span;
use proptest::prelude::*;

/// Every span the lexer produced, tokens and trivia together, in source order.
fn all_spans(lexed: &Lexed) -> Vec<Span> {
    let mut spans: Vec<Span> = lexed.tokens.iter().map(|t| t.span).chain(lexed.comments.iter().copied()).collect();
    spans.sort_by_key(|s| (s.start, s.end));
    spans
}

/// Source text with some of the shapes that trip lexers up: open strings,
/// open block comments, preprocessor lines and multi-byte characters.
fn script_like() -> impl Strategy<Value = String> {
    let piece = prop::sample::select(vec![
        "class", "AActor", " ", "\n", "{", "}", ";", "::", "\"open", "\"closed\"", "n\"Name\"", "f\"{X}\"",
        "/*", "*/", "//", "#if EDITOR", "1.5f", "0x1F", ".5", "3e2", "日本", "é", "\t", "\\", "@", "<", ">>=",
    ]);
    prop::collection::vec(piece, 0..60).prop_map(|parts| parts.concat())
}

// =============================================================================
// SECTION 1: BASIC PROPERTIES - Safety & Determinism
// =============================================================================

/// Property: Lexer NEVER panics, even on garbage input
#[test]
fn prop_lexer_never_panics() {
    proptest!(|(source in "\\PC{0,1000}")| {
        let _ = lex(&source);
    });
}

#[test]
fn prop_lexer_never_panics_on_script_fragments() {
    proptest!(|(source in script_like())| {
        let _ = lex(&source);
    });
}

/// Property: Lexing is deterministic
#[test]
fn prop_lexing_is_deterministic() {
    proptest!(|(source in "\\PC{0,500}")| {
        let first = lex(&source);
        let second = lex(&source);
        prop_assert_eq!(first.tokens.len(), second.tokens.len());
        for (a, b) in first.tokens.iter().zip(second.tokens.iter()) {
            prop_assert_eq!(a.node, b.node);
            prop_assert_eq!(a.span, b.span);
        }
        prop_assert_eq!(first.comments, second.comments);
    });
}

/// Edge case: lexing an empty string yields nothing at all.
#[test]
fn prop_empty_input_is_empty() {
    let lexed = lex("");
    assert!(lexed.tokens.is_empty());
    assert!(lexed.comments.is_empty());
}

// =============================================================================
// SECTION 2: STRUCTURAL PROPERTIES - Spans
// =============================================================================

/// Property: spans are non-empty, inside the source and on char boundaries
#[test]
fn prop_spans_within_bounds_and_aligned() {
    proptest!(|(source in script_like())| {
        let lexed = lex(&source);
        for span in all_spans(&lexed) {
            prop_assert!(span.start < span.end, "empty span {:?}", span);
            prop_assert!(span.end <= source.len(), "span {:?} past end {}", span, source.len());
            prop_assert!(source.is_char_boundary(span.start));
            prop_assert!(source.is_char_boundary(span.end));
        }
    });
}

/// Property: tokens come out in order and never overlap each other or a comment
#[test]
fn prop_spans_never_overlap() {
    proptest!(|(source in script_like())| {
        let lexed = lex(&source);
        for pair in lexed.tokens.windows(2) {
            prop_assert!(pair[0].span.end <= pair[1].span.start, "{:?} then {:?}", pair[0], pair[1]);
        }
        for pair in all_spans(&lexed).windows(2) {
            prop_assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    });
}

/// Property: only whitespace falls between spans, so nothing in the source is
/// silently dropped. Unrecognized characters surface as `Unknown` tokens.
#[test]
fn prop_gaps_are_whitespace() {
    proptest!(|(source in script_like())| {
        let lexed = lex(&source);
        let mut pos = 0;
        for span in all_spans(&lexed) {
            let gap = &source[pos..span.start];
            prop_assert!(gap.chars().all(|c| " \t\r\n\u{c}".contains(c)), "gap {:?} before {:?}", gap, span);
            pos = span.end;
        }
        prop_assert!(source[pos..].chars().all(|c| " \t\r\n\x0C".contains(c)));
    });
}

/// Property: strings never run past the end of their line
#[test]
fn prop_strings_stop_at_newline() {
    proptest!(|(body in "[a-zA-Z0-9 ]{0,40}", rest in "[a-zA-Z ]{0,20}")| {
        let source = format!("\"{body}\n{rest}");
        let lexed = lex(&source);
        let string = lexed.tokens.first().unwrap();
        prop_assert_eq!(string.node, Token::StringLit);
        prop_assert_eq!(string.span.end, body.len() + 1);
    });
}

// =============================================================================
// SECTION 3: GENERATORS - Literals & Identifiers
// =============================================================================

fn kinds(source: &str) -> Vec<Token> {
    lex(source).tokens.into_iter().map(|t| t.node).collect()
}

fn valid_identifiers() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,30}")
        .expect("valid regex")
        .prop_filter("not a keyword", |s| !is_keyword(s))
}

#[test]
fn prop_identifiers_lex_as_one_token() {
    proptest!(|(ident in valid_identifiers())| {
        prop_assert_eq!(kinds(&ident), vec![Token::Ident]);
    });
}

#[test]
fn prop_integers_lex_as_one_token() {
    proptest!(|(n in 0u64..=u64::MAX)| {
        prop_assert_eq!(kinds(&n.to_string()), vec![Token::IntLit]);
        prop_assert_eq!(kinds(&format!("0x{n:X}")), vec![Token::HexLit]);
    });
}

/// Property: a trailing `f` decides between float and double literals
#[test]
fn prop_float_suffix_picks_the_literal_kind() {
    proptest!(|(whole in 0u32..100_000, frac in 0u32..100_000)| {
        prop_assert_eq!(kinds(&format!("{whole}.{frac}f")), vec![Token::FloatLit]);
        prop_assert_eq!(kinds(&format!("{whole}.{frac}")), vec![Token::DoubleLit]);
    });
}

/// Property: comments vanish from the token stream but keep their spans
#[test]
fn prop_comments_are_trivia() {
    proptest!(|(text in "[a-zA-Z0-9 ;{}]{0,40}", ident in valid_identifiers())| {
        let source = format!("{ident} // {text}\n/* {text} */ {ident}");
        let lexed = lex(&source);
        prop_assert_eq!(lexed.tokens.len(), 2);
        prop_assert_eq!(lexed.comments.len(), 2);
    });
}
