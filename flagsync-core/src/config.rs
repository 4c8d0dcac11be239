//! Workspace config: `flagsync.yaml` at the repository root.
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(root: &Path, …)` — explicit root; used in tests with `TempDir`
//! - `fn(…)` — derives the root from the current directory, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::EnvironmentId;

pub const CONFIG_FILE: &str = "flagsync.yaml";

/// A target environment: a named remote-config endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvironmentId,
    /// Base URL of the remote-config REST endpoint for this environment.
    pub api_url: String,
}

/// Root of the flagsync YAML config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote project identifier, interpolated into API paths.
    pub project_id: String,
    /// Token endpoint used to mint short-lived access tokens.
    pub token_url: String,
    #[serde(default)]
    pub environments: Vec<Environment>,
    /// Directories scanned (recursively) for markdown documents.
    #[serde(default)]
    pub doc_roots: Vec<PathBuf>,
    /// `owner/repo` for tracker issue lookup; `None` disables issue closing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_repo: Option<String>,
}

impl Config {
    /// Resolve a declared environment by id.
    pub fn environment(&self, id: &EnvironmentId) -> Result<&Environment, ConfigError> {
        self.environments.iter().find(|e| &e.id == id).ok_or_else(|| {
            ConfigError::UnknownEnvironment {
                id: id.to_string(),
                known: self
                    .environments
                    .iter()
                    .map(|e| e.id.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })
    }
}

/// `<root>/flagsync.yaml` — pure, no I/O.
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load the config rooted at `root`.
pub fn load_at(root: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(root);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// `load_at` convenience wrapper rooted at the current directory.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&std::env::current_dir()?)
}

/// Save the config rooted at `root` with a `.tmp` + rename write.
pub fn save_at(root: &Path, config: &Config) -> Result<(), ConfigError> {
    let path = config_path_at(root);
    let yaml = serde_yaml::to_string(config)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml)?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
