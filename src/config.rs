//! Display configuration from `completion-tree.toml`

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const CONFIG_FILE: &str = "completion-tree.toml";

const DEFAULT_MAX_LABEL_LEN: usize = 15;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read completion-tree.toml: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse completion-tree.toml: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    display: Option<DisplaySection>,
}

#[derive(Debug, Deserialize, Default)]
struct DisplaySection {
    max_label_len: Option<usize>,
    collapse_repeated: Option<bool>,
    vocab: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Token labels longer than this are truncated
    pub max_label_len: usize,
    /// Print repeated subtrees once and reference them afterwards
    pub collapse_repeated: bool,
    /// Vocabulary JSON for decoding token ids
    pub vocab: Option<PathBuf>,
    /// The file these settings came from, if any
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_label_len: DEFAULT_MAX_LABEL_LEN,
            collapse_repeated: true,
            vocab: None,
            source: None,
        }
    }
}

impl Config {
    /// Search the current directory and its parents for a config file,
    /// falling back to defaults when none exists
    pub fn discover() -> Result<Self, ConfigError> {
        let current_dir = std::env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    pub fn discover_from(start: &Path) -> Result<Self, ConfigError> {
        match find_config_file(start) {
            Some(path) => Self::load(&path),
            None => {
                debug!(start = %start.display(), "no {} found, using defaults", CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    /// Load a config file. A relative `vocab` path is taken relative to
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content)?;
        let display = file.display.unwrap_or_default();

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let vocab = display.vocab.map(|v| base.join(v));

        debug!(path = %path.display(), "loaded config");

        Ok(Self {
            max_label_len: display.max_label_len.unwrap_or(DEFAULT_MAX_LABEL_LEN),
            collapse_repeated: display.collapse_repeated.unwrap_or(true),
            vocab,
            source: Some(path.to_path_buf()),
        })
    }
}

fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover_from(dir.path()).unwrap();
        assert_eq!(config.max_label_len, 15);
        assert!(config.collapse_repeated);
        assert!(config.vocab.is_none());
    }

    #[test]
    fn test_found_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[display]\nmax_label_len = 8\ncollapse_repeated = false\nvocab = \"vocab.json\"\n",
        )
        .unwrap();
        let nested = dir.path().join("runs").join("a");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::discover_from(&nested).unwrap();
        assert_eq!(config.max_label_len, 8);
        assert!(!config.collapse_repeated);
        assert_eq!(config.vocab, Some(dir.path().join("vocab.json")));
        assert_eq!(config.source, Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn test_partial_display_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[display]\nmax_label_len = 30\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_label_len, 30);
        assert!(config.collapse_repeated);
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[display\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
