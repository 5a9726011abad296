#![allow(
    clippy::missing_errors_doc,
    clippy::uninlined_format_args,
    clippy::doc_markdown
)]
//! Cortex Bashgate - three-tier pattern gate for agent shell commands.
//!
//! Every command string an agent wants to run is classified as:
//! - `Allow` - run without confirmation
//! - `Ask` - require human confirmation
//! - `Deny` - block
//!
//! The hard part is not the matching but making sure the text that gets
//! matched is the command that would actually run. Quoting, variable
//! indirection, chaining and `bash -c` wrappers are all normalized away
//! first, conservatively: anything that cannot be proven simple is left in
//! place for the patterns to see.
//!
//! # Pipeline
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │  raw command                                │
//! └────────────────────┬───────────────────────┘
//!                      │ strip \<newline>, split on && || ;
//!                      ▼
//! ┌────────────────────────────────────────────┐
//! │  for each segment (left to right):          │
//! │    capture literal FOO=bar assignments      │
//! │    clean: ( ), { }, then/do/fi, FOO=bar     │
//! │    resolve leading $VAR from earlier        │
//! │    unwrap simple bash -c "..."              │
//! └────────────────────┬───────────────────────┘
//!                      │ effective text (empty => skipped)
//!                      ▼
//! ┌────────────────────────────────────────────┐
//! │  deny pattern?  ──► DENY                    │
//! │  ask pattern?   ──► ASK                     │
//! │  otherwise      ──► ALLOW                   │
//! └────────────────────┬───────────────────────┘
//!                      │ most restrictive segment wins
//!                      ▼
//!                  (tier, reason)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cortex_bashgate::{PolicySet, Tier};
//!
//! let policy = PolicySet::builtin()?;
//! let decision = policy.validate("RUFF=/opt/ruff && $RUFF format src/");
//! assert_eq!(decision.tier, Tier::Allow);
//! ```


mod assign;
mod config;
mod decision;
mod engine;
mod error;
mod normalize;
mod pattern;
mod substitute;
mod tier;
mod wrapper;

// Re-export all public types
pub use assign::{VarEnv, extract_assignments};
pub use config::{CONFIG_ENV_VAR, CONFIG_FILE_NAME, PatternConfig, PatternEntry};
pub use decision::{
    Decision, EMPTY_COMMAND_REASON, Evaluation, NO_MATCH_REASON, SegmentTrace,
    UNTERMINATED_QUOTE_REASON,
};
pub use engine::validate_command;
pub use error::ConfigError;
pub use normalize::{
    clean_segment, has_unterminated_quote, split_commands, strip_control_flow_keyword,
    strip_env_vars, strip_line_continuations,
};
pub use pattern::{Pattern, PatternSet, PolicySet};
pub use substitute::substitute_known_vars;
pub use tier::Tier;
pub use wrapper::strip_bash_c_wrapper;

// ============================================================================
// Convenience Functions
// ============================================================================

/// Compile a pattern configuration. Equivalent to [`PolicySet::compile`].
pub fn compile_patterns(config: &PatternConfig) -> Result<PolicySet, ConfigError> {
    PolicySet::compile(config)
}

/// Classify a command against the built-in patterns.
///
/// Compiles the built-in set on every call; hold a [`PolicySet`] instead when
/// classifying more than one command.
pub fn evaluate_with_builtin(command: &str) -> Result<Decision, ConfigError> {
    Ok(PolicySet::builtin()?.validate(command))
}
