//! Cortex Bashgate CLI.
//!
//! - `hook` - answer PreToolUse requests on stdin/stdout
//! - `check` - classify a command from the command line
//! - `validate-config` - compile the configured patterns

pub mod check;
pub mod cli;
pub mod hook;
pub mod logging;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cortex_bashgate::{Decision, PatternConfig, PolicySet, Tier};

use crate::cli::{Cli, Commands};

/// Exit code for failures of the gate itself, distinct from the 0/1/2 used
/// for allow/ask/deny.
pub const EXIT_ERROR: u8 = 3;

/// Where the active pattern configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found by [`PatternConfig::discover`].
    Discovered(PathBuf),
    /// Compiled into the library.
    Builtin,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => {
                write!(f, "{}", path.display())
            }
            ConfigSource::Builtin => write!(f, "built-in patterns"),
        }
    }
}

/// Resolve and load the pattern configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<(PatternConfig, ConfigSource)> {
    let source = match explicit {
        Some(path) => ConfigSource::Explicit(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("Failed to determine current directory")?;
            PatternConfig::discover(&cwd).map_or(ConfigSource::Builtin, ConfigSource::Discovered)
        }
    };

    let config = match &source {
        ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => PatternConfig::load(path)?,
        ConfigSource::Builtin => PatternConfig::builtin()?,
    };
    Ok((config, source))
}

/// Load and compile the pattern configuration.
pub fn load_policy(explicit: Option<&Path>) -> Result<PolicySet> {
    let (config, source) = load_config(explicit)?;
    let policy = PolicySet::compile(&config)
        .with_context(|| format!("Failed to compile patterns from {source}"))?;
    tracing::debug!(%source, patterns = config.len(), "pattern set ready");
    Ok(policy)
}

/// Record one classification in the audit log.
pub fn audit(origin: &str, command: &str, decision: &Decision) {
    tracing::info!(
        origin,
        tier = decision.tier.as_str(),
        reason = %decision.reason,
        pattern = decision.pattern.as_deref().unwrap_or(""),
        command,
        "classified command"
    );
}

/// Run the selected subcommand and return the process exit code.
pub fn dispatch(cli: &Cli) -> Result<u8> {
    match &cli.command {
        Commands::Hook => {
            // Errors are turned into an `ask` answer instead of a failed hook.
            let policy = load_policy(cli.config.as_deref());
            hook::run(&policy, std::io::stdin().lock(), std::io::stdout().lock())?;
            Ok(0)
        }
        Commands::Check(args) => {
            let policy = load_policy(cli.config.as_deref())?;
            check::run(&policy, args, std::io::stdout().lock())
        }
        Commands::ValidateConfig => validate_config(cli.config.as_deref()),
    }
}

fn validate_config(explicit: Option<&Path>) -> Result<u8> {
    let (config, source) = load_config(explicit)?;
    PolicySet::compile(&config).with_context(|| format!("Invalid patterns in {source}"))?;

    println!("Pattern config: {source}");
    for tier in Tier::BY_PRECEDENCE {
        println!("  {}: {}", tier.as_str(), config.entries(tier).len());
    }
    println!("OK");
    Ok(0)
}
