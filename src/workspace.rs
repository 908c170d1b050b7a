//! The set of open modules and the type database they share.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lsp_types::{Diagnostic, DiagnosticSeverity, Range};

use crate::config::Config;
use crate::diagnostics::{AnalysisError, ParseError};
use crate::module::{symbols, Module};
use crate::typedb::{collect_declarations, TypeDatabase};

pub const SCRIPT_EXTENSION: &str = "as";

pub struct Workspace {
    config: Config,
    db: TypeDatabase,
    modules: BTreeMap<String, Module>,
}

impl Workspace {
    pub fn new(config: Config) -> Self {
        Self { config, db: TypeDatabase::new(), modules: BTreeMap::new() }
    }

    /// Workspace for the project containing `dir`: discovers the config,
    /// loads the engine type dump it names and every script under the script roots.
    pub fn open_project(dir: &Path) -> Result<Self, AnalysisError> {
        let mut workspace = Self::new(Config::discover(dir)?);
        if let Some(path) = workspace.config.engine_types_path() {
            workspace.load_engine_types(&path)?;
        }
        workspace.load_scripts()?;
        Ok(workspace)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &TypeDatabase {
        &self.db
    }

    /// For seeding engine types directly. Open modules keep their symbols
    /// until the next [`Workspace::refresh_symbols`].
    pub fn db_mut(&mut self) -> &mut TypeDatabase {
        &mut self.db
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Patterns for enum values missing-case reports skip.
    pub fn ignored_enum_values(&self) -> &[String] {
        &self.config.analysis.ignored_enum_values
    }

    pub fn load_engine_types(&mut self, path: &Path) -> Result<usize, AnalysisError> {
        let json = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let count = self.db.load_engine_types(&json)?;
        log::debug!("loaded {count} engine types from {}", path.display());
        Ok(count)
    }

    /// Open every script file under the configured script roots, then resolve
    /// symbols once all declarations are known. Returns the number of modules.
    pub fn load_scripts(&mut self) -> Result<usize, AnalysisError> {
        let mut files = Vec::new();
        for root in self.config.script_roots() {
            if root.is_dir() {
                collect_script_files(&root, &mut files)?;
            }
        }
        files.sort();
        let mut count = 0;
        for file in files {
            let Some(name) = self.config.module_name_for(&file) else {
                continue;
            };
            let text = std::fs::read_to_string(&file).map_err(|e| AnalysisError::io(&file, e))?;
            self.insert_module(Module::new(name, text));
            count += 1;
        }
        self.refresh_symbols();
        Ok(count)
    }

    /// Parse `text` as module `name`, replacing any previous version, and
    /// register its declarations.
    pub fn open_module(&mut self, name: &str, text: &str) -> &Module {
        self.insert_module(Module::new(name, text));
        self.refresh_module_symbols(name);
        &self.modules[name]
    }

    /// Replace the whole text of an open module. `None` if it is not open.
    pub fn update_module(&mut self, name: &str, text: &str) -> Option<&Module> {
        self.modules.get_mut(name)?.update(text);
        self.reregister(name);
        self.modules.get(name)
    }

    /// Splice an editor change into an open module.
    pub fn apply_change(&mut self, name: &str, range: Range, new_text: &str) -> Option<&Module> {
        self.modules.get_mut(name)?.apply_change(range, new_text);
        self.reregister(name);
        self.modules.get(name)
    }

    /// Close a module and drop its declarations from the database.
    pub fn close_module(&mut self, name: &str) -> Option<Module> {
        let module = self.modules.remove(name)?;
        self.db.remove_module(name);
        log::debug!("closed module {name}");
        Some(module)
    }

    /// Recompute the symbol list of every open module.
    pub fn refresh_symbols(&mut self) {
        let names: Vec<String> = self.modules.keys().cloned().collect();
        for name in names {
            self.refresh_module_symbols(&name);
        }
    }

    /// Parse errors of a module as editor diagnostics.
    pub fn diagnostics(&self, name: &str) -> Vec<Diagnostic> {
        let Some(module) = self.modules.get(name) else {
            return Vec::new();
        };
        module.parse_errors().iter().map(|error| parse_error_to_diagnostic(module, error)).collect()
    }

    fn insert_module(&mut self, module: Module) {
        let name = module.name().to_string();
        self.db.register_module(collect_declarations(&module));
        self.modules.insert(name, module);
    }

    fn reregister(&mut self, name: &str) {
        if let Some(module) = self.modules.get(name) {
            self.db.register_module(collect_declarations(module));
        }
        self.refresh_module_symbols(name);
    }

    fn refresh_module_symbols(&mut self, name: &str) {
        let Some(module) = self.modules.get(name) else {
            return;
        };
        let symbols = symbols::collect(module, &self.db);
        if let Some(module) = self.modules.get_mut(name) {
            module.set_symbols(symbols);
        }
    }
}

fn parse_error_to_diagnostic(module: &Module, error: &ParseError) -> Diagnostic {
    Diagnostic {
        range: module.range_of(error.span()),
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some("asls(syntax)".to_string()),
        message: error.message().to_string(),
        ..Default::default()
    }
}

fn collect_script_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), AnalysisError> {
    let entries = std::fs::read_dir(dir).map_err(|e| AnalysisError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| AnalysisError::io(dir, e))?.path();
        if path.is_dir() {
            collect_script_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION) {
            out.push(path);
        }
    }
    Ok(())
}
