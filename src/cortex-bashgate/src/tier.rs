//! Restrictiveness tiers for classified commands.

use serde::{Deserialize, Serialize};

/// How strictly a command is gated.
///
/// Variants are declared from least to most restrictive so that the derived
/// ordering matches `Deny > Ask > Allow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Run without confirmation.
    Allow,
    /// Requires human confirmation.
    Ask,
    /// Blocked outright.
    Deny,
}

impl Tier {
    /// All tiers, most restrictive first. This is the order patterns are checked in.
    pub const BY_PRECEDENCE: [Tier; 3] = [Tier::Deny, Tier::Ask, Tier::Allow];

    /// Returns true if the command may run (possibly after confirmation).
    pub fn allows_execution(&self) -> bool {
        matches!(self, Tier::Allow | Tier::Ask)
    }

    /// Returns true if a human must confirm the command first.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Tier::Ask)
    }

    /// Returns true if the command is blocked.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Tier::Deny)
    }

    /// Combine two tiers, keeping the most restrictive.
    pub fn combine(self, other: Tier) -> Tier {
        self.max(other)
    }

    /// Lowercase name as used in configuration files and hook output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Allow => "allow",
            Tier::Ask => "ask",
            Tier::Deny => "deny",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Allow => write!(f, "ALLOW"),
            Tier::Ask => write!(f, "ASK"),
            Tier::Deny => write!(f, "DENY"),
        }
    }
}
