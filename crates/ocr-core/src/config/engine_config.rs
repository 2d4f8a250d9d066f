//! Serde-backed on-disk configuration shape (§4.5, §6.2), distinct from
//! the runtime [`ConfigStore`](super::ConfigStore) it is applied onto.

use crate::enums::{OcrEngineMode, PageSegMode};
use crate::error::{OcrError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration, loadable from TOML/YAML/JSON and
/// mergeable with CLI-supplied `-c key=value` overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub languages: Vec<String>,
    pub tessdata_dir: Option<String>,
    pub page_seg_mode: PageSegMode,
    pub engine_mode: OcrEngineMode,
    pub dpi: Option<u32>,
    pub user_words_file: Option<String>,
    pub user_patterns_file: Option<String>,
    /// Extra `key=value` pairs applied through the `ConfigStore` filter,
    /// in file order, before any `-c` CLI overrides (§4.5).
    pub variables: Vec<(String, String)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            languages: vec!["eng".to_string()],
            tessdata_dir: None,
            page_seg_mode: PageSegMode::default(),
            engine_mode: OcrEngineMode::default(),
            dpi: None,
            user_words_file: None,
            user_patterns_file: None,
            variables: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| OcrError::config(format!("invalid TOML in {}: {e}", path.display())))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content).map_err(|e| OcrError::config(format!("invalid YAML in {}: {e}", path.display())))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| OcrError::config(format!("invalid JSON in {}: {e}", path.display())))
    }

    /// Loads a config file, auto-detecting format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| OcrError::config(format!("no extension on config path {}", path.display())))?;
        match extension.to_lowercase().as_str() {
            "toml" => Self::from_toml_file(path),
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            other => Err(OcrError::config(format!("unsupported config format: .{other}"))),
        }
    }

    /// Searches the current directory and its ancestors for `ocr.toml`,
    /// returning the first one found, mirroring the upward-discovery
    /// convention the CLI uses for project-local configuration.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir()?;
        loop {
            let candidate = current.join("ocr.toml");
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok(None),
            }
        }
    }

    /// Applies this config's `variables` onto a `ConfigStore` in file
    /// order, going through the same constraint filter a config file's
    /// literal `key=value` lines would.
    pub fn apply_to(&self, store: &mut super::ConfigStore) {
        for (key, value) in &self.variables {
            let assignment = format!("{key}={value}");
            store.apply_cli_override(&assignment);
        }
    }
}
