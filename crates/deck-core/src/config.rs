//! User configuration
//!
//! Stored in `~/.config/deck/config.yaml`. Every field is optional; a missing
//! file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::workload::DEFAULT_NAMESPACE;

/// Environment variable overriding the helm executable
pub const HELM_ENV: &str = "DECK_HELM";

/// Environment variable overriding the git executable
pub const GIT_ENV: &str = "DECK_GIT";

/// Deck configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckConfig {
    /// External executables
    #[serde(default)]
    pub tools: ToolPaths,

    /// Namespace used when neither a source nor its deck sets one
    #[serde(default = "default_namespace")]
    pub default_namespace: String,
}

/// Names or paths of the external tools Deck shells out to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPaths {
    #[serde(default = "default_helm")]
    pub helm: String,

    #[serde(default = "default_git")]
    pub git: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_helm() -> String {
    "helm".to_string()
}

fn default_git() -> String {
    "git".to_string()
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            helm: default_helm(),
            git: default_git(),
        }
    }
}

impl ToolPaths {
    /// Map a logical program name (`helm`, `git`) to its configured executable
    pub fn executable<'a>(&'a self, program: &'a str) -> &'a str {
        match program {
            "helm" => &self.helm,
            "git" => &self.git,
            other => other,
        }
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            default_namespace: default_namespace(),
        }
    }
}

impl DeckConfig {
    /// Load configuration from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        let config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::InvalidDeckfile {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("deck").join("config.yaml"))
    }

    /// Apply `DECK_HELM` / `DECK_GIT`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(HELM_ENV).ok(),
            std::env::var(GIT_ENV).ok(),
        )
    }

    fn with_overrides(mut self, helm: Option<String>, git: Option<String>) -> Self {
        if let Some(helm) = helm.filter(|h| !h.is_empty()) {
            self.tools.helm = helm;
        }
        if let Some(git) = git.filter(|g| !g.is_empty()) {
            self.tools.git = git;
        }
        self
    }
}
