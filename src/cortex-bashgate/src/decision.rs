//! Classification results.

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Reason reported when no pattern matched any segment.
pub const NO_MATCH_REASON: &str = "No matching rule";

/// Reason reported when the command contains nothing to run.
pub const EMPTY_COMMAND_REASON: &str = "Empty command";

/// Reason reported for a segment left inside an open quote.
pub const UNTERMINATED_QUOTE_REASON: &str =
    "Unterminated quote; command could not be parsed reliably";

/// A tier together with the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub tier: Tier,
    pub reason: String,

    /// Source of the pattern that produced this decision, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Decision {
    pub fn new(tier: Tier, reason: impl Into<String>) -> Self {
        Self {
            tier,
            reason: reason.into(),
            pattern: None,
        }
    }

    /// Builder: record the pattern that matched.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn is_blocked(&self) -> bool {
        self.tier.is_blocked()
    }

    pub fn requires_confirmation(&self) -> bool {
        self.tier.requires_confirmation()
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.tier, self.reason)
    }
}

/// How one segment of a compound command was processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentTrace {
    /// The segment as split from the command.
    pub raw: String,

    /// Text after cleaning, substitution and unwrapping. Empty if the
    /// segment runs nothing.
    pub effective: String,

    /// `None` for empty segments, which are not classified. A block
    /// terminator whose redirect matches a deny or ask pattern is the one
    /// empty segment that carries a decision.
    pub decision: Option<Decision>,
}

/// The overall decision plus the per-segment trail that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub decision: Decision,
    pub segments: Vec<SegmentTrace>,
}
