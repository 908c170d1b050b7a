pub mod token;
pub use token::{is_keyword, Token};

use crate::span::{Span, Spanned};
use logos::Logos;

/// Result of lexing a whole module. Comments and preprocessor lines are kept
/// aside so indentation heuristics can still see them.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Spanned<Token>>,
    pub comments: Vec<Span>,
}

/// Tokenize source text. Never fails: unrecognized characters become
/// `Token::Unknown` and unterminated literals/comments are closed early.
pub fn lex(source: &str) -> Lexed {
    let mut lexed = Lexed::default();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end);
        match result {
            Ok(tok) if tok.is_trivia() => lexed.comments.push(span),
            Ok(tok) => lexed.tokens.push(Spanned::new(tok, span)),
            Err(()) => {
                // Unknown tokens cover whole characters.
                let char_end = source[range.start..].chars().next().map_or(range.end, |c| range.start + c.len_utf8());
                if char_end > range.end {
                    lexer.bump(char_end - range.end);
                }
                let end = range.end.max(char_end);
                lexed.tokens.push(Spanned::new(Token::Unknown, Span::new(range.start, end)));
            }
        }
    }

    lexed
}
