use crate::span::Span;
use std::path::PathBuf;
use thiserror::Error;

/// A recoverable failure to parse one statement. Never escapes the tree builder
/// as an `Err`: it is stored next to the statement whose AST is absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Syntax error: {msg}")]
    Syntax { msg: String, span: Span },

    #[error("Syntax error: unexpected end of statement, {msg}")]
    Incomplete { msg: String, span: Span },
}

impl ParseError {
    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span }
    }

    pub fn incomplete(msg: impl Into<String>, span: Span) -> Self {
        Self::Incomplete { msg: msg.into(), span }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::Syntax { span, .. } | ParseError::Incomplete { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Syntax { msg, .. } | ParseError::Incomplete { msg, .. } => msg,
        }
    }

    /// Re-anchor a statement-relative error at an absolute module offset.
    pub fn offset_by(self, base: usize) -> Self {
        match self {
            ParseError::Syntax { msg, span } => ParseError::Syntax { msg, span: span.offset_by(base) },
            ParseError::Incomplete { msg, span } => {
                ParseError::Incomplete { msg, span: span.offset_by(base) }
            }
        }
    }
}

/// Failures of the outer surfaces: reading a project manifest or an engine type dump.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Engine type dump error: {0}")]
    EngineTypes(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn config(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Config { path: path.into(), source }
    }
}

/// Render parse errors with ariadne into plain (uncolored) text.
pub fn render_errors(source: &str, errors: &[ParseError]) -> String {
    use ariadne::{Config, Label, Report, ReportKind, Source};

    let mut out = Vec::new();
    for err in errors {
        let span = err.span();
        let start = span.start.min(source.len());
        let end = span.end.clamp(start, source.len());
        let result = Report::build(ReportKind::Error, (), start)
            .with_config(Config::default().with_color(false))
            .with_message("syntax error")
            .with_label(Label::new(start..end).with_message(err.message()))
            .finish()
            .write(Source::from(source), &mut out);
        if result.is_err() {
            out.extend_from_slice(format!("error: {err}\n").as_bytes());
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
