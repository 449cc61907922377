//! Built-in defaults and glob pattern file loading.

use crate::error::{LeanError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

// Embed the defaults directly in the binary at compile time
const DEFAULTS_TOML: &str = include_str!("../defaults.toml");

/// Settings describing the manifest file itself
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestConfig {
    /// File name of the manifest at the repository root (".gitattributes")
    pub file_name: String,
    /// Header line emitted above the export-ignore entries
    pub header: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatternConfig {
    /// Pattern applied when the caller supplies none
    pub default: String,
}

/// Configuration injected into the generator and comparators
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub manifest: ManifestConfig,
    pub patterns: PatternConfig,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| LeanError::Config(e.to_string()))?;

        if config.manifest.file_name.is_empty() || config.manifest.file_name.contains('/') {
            return Err(LeanError::Config(format!(
                "manifest file name '{}' must be a plain file name",
                config.manifest.file_name
            )));
        }

        Ok(config)
    }

    /// Load the embedded defaults
    pub fn load() -> Result<Self> {
        Self::from_toml_str(DEFAULTS_TOML)
    }
}

/// Read a glob pattern file and fold its entries into a single pattern.
///
/// One alternative per line; blank lines and lines starting with `#` are
/// skipped. Several entries become `{a,b,...}`, a lone entry is used as-is.
pub fn load_pattern_file(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|source| LeanError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    pattern_from_lines(&content).ok_or_else(|| {
        LeanError::Config(format!("glob pattern file {} has no entries", path.display()))
    })
}

fn pattern_from_lines(content: &str) -> Option<String> {
    let entries: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    match entries.as_slice() {
        [] => None,
        [single] => Some(single.to_string()),
        _ => Some(format!("{{{}}}", entries.join(","))),
    }
}
