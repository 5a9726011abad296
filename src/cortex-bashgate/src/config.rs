//! Pattern configuration as loaded from disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tier::Tier;

/// Environment variable naming an explicit pattern file.
pub const CONFIG_ENV_VAR: &str = "CORTEX_BASHGATE_CONFIG";

/// File name looked up in project and user configuration directories.
pub const CONFIG_FILE_NAME: &str = "bash-patterns.toml";

const BUILTIN_PATTERNS: &str = include_str!("../bash-patterns.toml");

/// One raw pattern definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternEntry {
    /// Regular expression matched anywhere in the effective command.
    pub pattern: String,

    /// Human-readable explanation reported when the pattern matches.
    pub reason: String,
}

impl PatternEntry {
    pub fn new(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Uncompiled three-tier pattern configuration.
///
/// Entry order within a tier is preserved; the first matching entry supplies
/// the reason for a decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    #[serde(default)]
    pub deny: Vec<PatternEntry>,

    #[serde(default)]
    pub ask: Vec<PatternEntry>,

    #[serde(default)]
    pub allow: Vec<PatternEntry>,
}

impl PatternConfig {
    /// Parse a configuration from TOML text.
    ///
    /// `origin` is only used to label errors.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content, path)?;
        tracing::debug!(
            path = %path.display(),
            deny = config.deny.len(),
            ask = config.ask.len(),
            allow = config.allow.len(),
            "loaded pattern config"
        );
        Ok(config)
    }

    /// The pattern set shipped with this crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUILTIN_PATTERNS, Path::new("<builtin>"))
    }

    /// Load the first configuration found by [`PatternConfig::discover`],
    /// falling back to the built-in set.
    pub fn load_default(cwd: &Path) -> Result<Self, ConfigError> {
        match Self::discover(cwd) {
            Some(path) => Self::load(&path),
            None => {
                tracing::debug!("no pattern config found, using built-in patterns");
                Self::builtin()
            }
        }
    }

    /// Locate a pattern file.
    ///
    /// Checks `$CORTEX_BASHGATE_CONFIG`, then `<cwd>/.cortex/bash-patterns.toml`,
    /// then `<user config dir>/cortex/bash-patterns.toml`. The environment
    /// variable is returned even if the file does not exist so that a typo
    /// surfaces as a read error instead of a silent fallback.
    pub fn discover(cwd: &Path) -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(explicit));
        }

        let project = cwd.join(".cortex").join(CONFIG_FILE_NAME);
        if project.is_file() {
            return Some(project);
        }

        dirs::config_dir()
            .map(|dir| dir.join("cortex").join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
    }

    /// Entries for a single tier.
    pub fn entries(&self, tier: Tier) -> &[PatternEntry] {
        match tier {
            Tier::Deny => &self.deny,
            Tier::Ask => &self.ask,
            Tier::Allow => &self.allow,
        }
    }

    /// Total number of entries across all tiers.
    pub fn len(&self) -> usize {
        self.deny.len() + self.ask.len() + self.allow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
