//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Log verbosity level, ordered from quietest to most verbose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show one audit line per classified command
    Info,
    /// Show the final decision of every evaluation
    Debug,
    /// Show every segment transformation
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Cortex Bashgate - allow/ask/deny gate for agent shell commands
#[derive(Debug, Parser)]
#[command(name = "cortex-bashgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pattern file to use instead of the discovered one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log verbosity (overrides CORTEX_BASHGATE_LOG)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Append an audit log to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level from flags, falling back to `env_level` and then the default.
    pub fn effective_log_level(&self, env_level: Option<&str>) -> LogLevel {
        match self.verbose {
            0 => {}
            1 => return LogLevel::Debug,
            _ => return LogLevel::Trace,
        }
        self.log_level
            .or_else(|| env_level.and_then(LogLevel::from_str_loose))
            .unwrap_or_default()
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Answer a PreToolUse hook request read from stdin
    Hook,

    /// Classify a command given on the command line
    Check(CheckArgs),

    /// Compile the configured patterns and report per-tier counts
    ValidateConfig,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Print the decision as JSON
    #[arg(long)]
    pub json: bool,

    /// Show how each segment was normalized and classified
    #[arg(long)]
    pub explain: bool,

    /// The command to classify; multiple arguments are joined with spaces
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl CheckArgs {
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}
