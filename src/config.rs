use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::diagnostics::AnalysisError;

pub const CONFIG_FILE: &str = "asls.toml";

/// Project settings from `asls.toml`. Every field has a default, so a project
/// without a config file behaves like one with an empty file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub analysis: AnalysisConfig,
    /// Directory the config was read from; relative paths resolve against it.
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: Option<String>,
    pub script_roots: Vec<PathBuf>,
    /// JSON dump of the engine's reflected types.
    pub engine_types: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: None, script_roots: vec![PathBuf::from("Script")], engine_types: None }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Enum values left out of missing-case reports. `*` prefix matches a suffix.
    pub ignored_enum_values: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { ignored_enum_values: vec!["MAX".to_string(), "*_MAX".to_string()] }
    }
}

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, AnalysisError> {
        let mut config: Config = toml::from_str(text).map_err(|e| AnalysisError::config(path, e))?;
        config.root = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_toml(&text, path)
    }

    /// Config for the project containing `start_dir`, or defaults rooted at
    /// `start_dir` when there is none.
    pub fn discover(start_dir: &Path) -> Result<Self, AnalysisError> {
        match find_config_walk(start_dir) {
            Some(path) => {
                log::debug!("using config {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self { root: Some(start_dir.to_path_buf()), ..Self::default() }),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn script_roots(&self) -> Vec<PathBuf> {
        self.project.script_roots.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn engine_types_path(&self) -> Option<PathBuf> {
        self.project.engine_types.as_deref().map(|p| self.resolve(p))
    }

    /// Dotted module name of a script file under one of the script roots:
    /// `Script/Game/Actor.as` → `Game.Actor`.
    pub fn module_name_for(&self, file: &Path) -> Option<String> {
        let relative = self.script_roots().into_iter().find_map(|root| file.strip_prefix(&root).ok().map(Path::to_path_buf))?;
        let relative = relative.with_extension("");
        let parts: Vec<&str> = relative.components().filter_map(|c| c.as_os_str().to_str()).collect();
        if parts.is_empty() {
            return None;
        }
        Some(parts.join("."))
    }
}

/// Walk from start_dir up to .git or FS root, looking for asls.toml.
fn find_config_walk(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            return None;
        }
        if !dir.pop() {
            return None;
        }
    }
}
