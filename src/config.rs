use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};

/// branch created by `init` unless the config says otherwise
pub const DEFAULT_BRANCH: &str = "master";

/// repository configuration stored in config.toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// branch created by init and checked out initially
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// working tree settings
    #[serde(default)]
    pub worktree: WorktreeConfig,
}

/// working tree settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeConfig {
    /// glob patterns for files twig never treats as untracked
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }

    /// add an ignore pattern, validating it first
    pub fn add_ignore(&mut self, pattern: impl Into<String>) -> Result<()> {
        let pattern = pattern.into();
        glob::Pattern::new(&pattern)?;
        if !self.worktree.ignore.contains(&pattern) {
            self.worktree.ignore.push(pattern);
        }
        Ok(())
    }

    /// compiled ignore patterns
    pub fn ignore_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.worktree
            .ignore
            .iter()
            .map(|p| glob::Pattern::new(p).map_err(Into::into))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            worktree: WorktreeConfig::default(),
        }
    }
}
