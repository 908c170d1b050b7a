pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod module;
pub mod typedb;
pub mod resolve;
pub mod queries;
pub mod visit;
pub mod config;
pub mod workspace;

pub use config::Config;
pub use diagnostics::{AnalysisError, ParseError};
pub use module::Module;
pub use typedb::TypeDatabase;
pub use workspace::Workspace;

/// Analyze one source string on its own (lex → statement tree → declarations → symbols).
/// No file I/O. Useful for tests, benchmarks and fuzzing.
pub fn analyze_source(name: &str, source: &str) -> Workspace {
    let mut workspace = Workspace::new(Config::default());
    workspace.open_module(name, source);
    workspace
}
