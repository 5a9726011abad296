//! Segment-by-segment evaluation of a command against a policy.

use crate::assign::{VarEnv, extract_assignments};
use crate::decision::{
    Decision, EMPTY_COMMAND_REASON, Evaluation, NO_MATCH_REASON, SegmentTrace,
    UNTERMINATED_QUOTE_REASON,
};
use crate::normalize::{
    clean_segment, has_unterminated_quote, split_commands, strip_line_continuations,
    terminator_redirect,
};
use crate::pattern::{PatternSet, PolicySet};
use crate::substitute::substitute_known_vars;
use crate::tier::Tier;
use crate::wrapper::unwrap_shell_c;

impl PolicySet {
    /// Classify `command`.
    pub fn validate(&self, command: &str) -> Decision {
        self.evaluate(command).decision
    }

    /// Classify `command` and keep the per-segment trace.
    pub fn evaluate(&self, command: &str) -> Evaluation {
        evaluate_with(command, &self.deny, &self.ask, &self.allow)
    }
}

/// Classify `command` against explicitly supplied pattern sets.
///
/// Total over all input: malformed shell never errors, it is classified
/// conservatively instead.
pub fn validate_command(
    command: &str,
    deny: &PatternSet,
    ask: &PatternSet,
    allow: &PatternSet,
) -> Decision {
    evaluate_with(command, deny, ask, allow).decision
}

fn evaluate_with(command: &str, deny: &PatternSet, ask: &PatternSet, allow: &PatternSet) -> Evaluation {
    let joined = strip_line_continuations(command);
    let mut env = VarEnv::new();
    let mut segments = Vec::new();

    for raw in split_commands(&joined) {
        let assignments = extract_assignments(raw);
        let cleaned = clean_segment(raw);
        // A segment cannot see the variables it defines itself.
        let substituted = substitute_known_vars(&cleaned, &env);
        env.merge(assignments);
        let effective = unwrap_wrappers(substituted);

        let decision = if effective.is_empty() {
            terminator_redirect(raw).and_then(|redirect| classify_redirect(redirect, deny, ask))
        } else {
            Some(classify_segment(&effective, has_unterminated_quote(raw), deny, ask, allow))
        };
        tracing::trace!(
            raw,
            effective = %effective,
            tier = ?decision.as_ref().map(|d| d.tier),
            "evaluated segment"
        );

        segments.push(SegmentTrace {
            raw: raw.to_string(),
            effective,
            decision,
        });
    }

    let decision = most_restrictive(&segments)
        .cloned()
        .unwrap_or_else(|| Decision::new(Tier::Allow, EMPTY_COMMAND_REASON));
    tracing::debug!(tier = %decision.tier, reason = %decision.reason, "classified command");

    Evaluation { decision, segments }
}

/// Peel simple `bash -c` wrappers until none remain.
///
/// Each unwrapped body is cleaned again, so `bash -c 'FOO=1 cmd'` ends up as
/// `cmd`. Every pass strictly shortens the text.
fn unwrap_wrappers(segment: String) -> String {
    let mut effective = segment.trim().to_string();
    while let Some(body) = unwrap_shell_c(&effective) {
        let next = clean_segment(body);
        tracing::trace!(from = %effective, to = %next, "unwrapped shell wrapper");
        effective = next;
    }
    effective
}

fn classify_segment(
    effective: &str,
    unterminated: bool,
    deny: &PatternSet,
    ask: &PatternSet,
    allow: &PatternSet,
) -> Decision {
    if let Some(pattern) = deny.first_match(effective) {
        return Decision::new(Tier::Deny, pattern.reason()).with_pattern(pattern.as_str());
    }
    if let Some(pattern) = ask.first_match(effective) {
        return Decision::new(Tier::Ask, pattern.reason()).with_pattern(pattern.as_str());
    }
    if unterminated {
        return Decision::new(Tier::Ask, UNTERMINATED_QUOTE_REASON);
    }
    // Allow patterns never gate; they only make the audit reason specific.
    match allow.first_match(effective) {
        Some(pattern) => {
            Decision::new(Tier::Allow, pattern.reason()).with_pattern(pattern.as_str())
        }
        None => Decision::new(Tier::Allow, NO_MATCH_REASON),
    }
}

/// Check the redirect of a `done`/`fi`/`esac` against deny and ask patterns.
///
/// Only a restrictive match counts; otherwise the terminator stays an empty
/// segment that contributes nothing.
fn classify_redirect(redirect: &str, deny: &PatternSet, ask: &PatternSet) -> Option<Decision> {
    [deny, ask].into_iter().find_map(|set| {
        set.first_match(redirect)
            .map(|pattern| Decision::new(set.tier(), pattern.reason()).with_pattern(pattern.as_str()))
    })
}

/// The first decision with the highest tier, in segment order.
fn most_restrictive(segments: &[SegmentTrace]) -> Option<&Decision> {
    segments
        .iter()
        .filter_map(|segment| segment.decision.as_ref())
        .fold(None, |best: Option<&Decision>, candidate| match best {
            Some(best) if best.tier >= candidate.tier => Some(best),
            _ => Some(candidate),
        })
}
