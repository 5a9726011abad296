//! Error types for loading and compiling pattern configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::tier::Tier;

/// Errors raised while turning pattern configuration into a [`PolicySet`].
///
/// Classification itself never fails; every variant here is a startup error.
///
/// [`PolicySet`]: crate::PolicySet
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A pattern string is not a valid regular expression.
    #[error("invalid {} pattern #{index} `{pattern}`: {source}", .tier.as_str())]
    InvalidPattern {
        tier: Tier,
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An empty pattern would match every command.
    #[error("{} pattern #{index} is empty", .tier.as_str())]
    EmptyPattern { tier: Tier, index: usize },

    /// The configuration file could not be read.
    #[error("failed to read pattern config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("failed to parse pattern config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
