//! Compiled patterns.

use regex::Regex;

use crate::config::{PatternConfig, PatternEntry};
use crate::error::ConfigError;
use crate::tier::Tier;

/// A compiled regular expression with the reason reported when it matches.
///
/// Patterns are unanchored: they match anywhere in the effective command
/// unless the expression itself uses `^` or `$`.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    reason: String,
}

impl Pattern {
    pub fn new(pattern: &str, reason: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            reason: reason.into(),
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The source expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Ordered patterns belonging to one tier.
#[derive(Debug, Clone)]
pub struct PatternSet {
    tier: Tier,
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// An empty set for `tier`.
    pub fn empty(tier: Tier) -> Self {
        Self {
            tier,
            patterns: Vec::new(),
        }
    }

    /// Compile raw entries, preserving their order.
    ///
    /// Fails on the first entry that is empty or does not compile.
    pub fn compile(tier: Tier, entries: &[PatternEntry]) -> Result<Self, ConfigError> {
        let patterns = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                if entry.pattern.is_empty() {
                    return Err(ConfigError::EmptyPattern { tier, index });
                }
                Pattern::new(&entry.pattern, entry.reason.clone()).map_err(|source| {
                    ConfigError::InvalidPattern {
                        tier,
                        index,
                        pattern: entry.pattern.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tier, patterns })
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// The first pattern matching `text`, in insertion order.
    pub fn first_match(&self, text: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.is_match(text))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The compiled deny, ask and allow sets.
///
/// Immutable once built, so a single instance can be shared across threads
/// and passed to every evaluation.
#[derive(Debug, Clone)]
pub struct PolicySet {
    pub(crate) deny: PatternSet,
    pub(crate) ask: PatternSet,
    pub(crate) allow: PatternSet,
}

impl PolicySet {
    /// Compile all three tiers of `config`.
    pub fn compile(config: &PatternConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            deny: PatternSet::compile(Tier::Deny, &config.deny)?,
            ask: PatternSet::compile(Tier::Ask, &config.ask)?,
            allow: PatternSet::compile(Tier::Allow, &config.allow)?,
        })
    }

    /// Compile the built-in pattern set.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::compile(&PatternConfig::builtin()?)
    }

    /// Assemble from already compiled sets.
    pub fn from_sets(deny: PatternSet, ask: PatternSet, allow: PatternSet) -> Self {
        Self { deny, ask, allow }
    }

    pub fn tier(&self, tier: Tier) -> &PatternSet {
        match tier {
            Tier::Deny => &self.deny,
            Tier::Ask => &self.ask,
            Tier::Allow => &self.allow,
        }
    }
}
