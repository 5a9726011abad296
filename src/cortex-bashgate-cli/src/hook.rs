//! PreToolUse hook protocol.
//!
//! Reads one JSON request from stdin and answers with a permission decision
//! on stdout. Anything that cannot be read or understood is answered with
//! `ask`, never silently allowed.

use std::io::{self, Read, Write};

use anyhow::Result;
use cortex_bashgate::{Decision, PolicySet, Tier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest request accepted on stdin.
pub const MAX_HOOK_INPUT_BYTES: usize = 1024 * 1024;

/// The only tool whose requests are classified.
pub const BASH_TOOL_NAME: &str = "Bash";

const HOOK_EVENT_NAME: &str = "PreToolUse";

/// Incoming hook request.
#[derive(Debug, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub tool_name: Option<String>,

    #[serde(default)]
    pub tool_input: Option<ToolInput>,
}

#[derive(Debug, Deserialize)]
pub struct ToolInput {
    /// Kept as a raw value so that a non-string command is ignored rather
    /// than rejected.
    #[serde(default)]
    pub command: Option<serde_json::Value>,
}

/// Outgoing hook response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_specific_output: HookSpecificOutput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: &'static str,
    pub permission_decision: Tier,
    pub permission_decision_reason: String,
}

impl HookOutput {
    pub fn new(tier: Tier, reason: impl Into<String>) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: HOOK_EVENT_NAME,
                permission_decision: tier,
                permission_decision_reason: reason.into(),
            },
        }
    }

    pub fn from_decision(decision: &Decision) -> Self {
        Self::new(decision.tier, decision.reason.clone())
    }

    /// An `ask` response for requests that could not be evaluated.
    pub fn fail_closed(reason: impl Into<String>) -> Self {
        Self::new(Tier::Ask, reason)
    }
}

#[derive(Debug, Error)]
pub enum HookReadError {
    #[error("failed to read hook input: {0}")]
    Io(#[from] io::Error),

    #[error("hook input is {size} bytes, limit is {limit}")]
    InputTooLarge { size: usize, limit: usize },

    #[error("invalid hook input JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read and parse one hook request, refusing more than `max_bytes`.
pub fn read_hook_input(reader: impl Read, max_bytes: usize) -> Result<HookInput, HookReadError> {
    let mut input = String::with_capacity(256);
    // Read up to limit + 1 to detect overflow
    reader
        .take(max_bytes as u64 + 1)
        .read_to_string(&mut input)?;

    if input.len() > max_bytes {
        return Err(HookReadError::InputTooLarge {
            size: input.len(),
            limit: max_bytes,
        });
    }

    Ok(serde_json::from_str(&input)?)
}

/// The command of a `Bash` request, if it has a non-empty one.
#[must_use]
pub fn extract_command(input: &HookInput) -> Option<&str> {
    if input.tool_name.as_deref() != Some(BASH_TOOL_NAME) {
        return None;
    }

    match input.tool_input.as_ref()?.command.as_ref()? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Decide the response for one request, or `None` if it should be ignored.
///
/// A policy that failed to load is reported as `ask` for every Bash request
/// rather than letting commands through unchecked.
pub fn respond(
    policy: &Result<PolicySet>,
    request: Result<HookInput, HookReadError>,
) -> Option<HookOutput> {
    let request = match request {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "rejecting unreadable hook input");
            return Some(HookOutput::fail_closed(format!(
                "Hook input could not be parsed ({err}); confirm manually"
            )));
        }
    };

    let Some(command) = extract_command(&request) else {
        tracing::debug!(tool = ?request.tool_name, "ignoring request without a Bash command");
        return None;
    };

    match policy {
        Ok(policy) => {
            let decision = policy.validate(command);
            crate::audit("hook", command, &decision);
            Some(HookOutput::from_decision(&decision))
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "pattern configuration unavailable");
            Some(HookOutput::fail_closed(format!(
                "Pattern configuration could not be loaded ({err:#}); confirm manually"
            )))
        }
    }
}

/// Run the hook against the given streams.
pub fn run(policy: &Result<PolicySet>, input: impl Read, mut output: impl Write) -> Result<()> {
    let request = read_hook_input(input, MAX_HOOK_INPUT_BYTES);
    if let Some(response) = respond(policy, request) {
        serde_json::to_writer(&mut output, &response)?;
        writeln!(output)?;
        output.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> Result<PolicySet> {
        Ok(PolicySet::builtin()?)
    }

    fn run_to_string(policy: &Result<PolicySet>, input: &str) -> String {
        let mut out = Vec::new();
        run(policy, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    // =========================================================================
    // Tests for read_hook_input()
    // =========================================================================

    #[test]
    fn test_read_valid_request() {
        let input = r#"{"tool_name":"Bash","tool_input":{"command":"ls -la"}}"#;
        let parsed = read_hook_input(input.as_bytes(), MAX_HOOK_INPUT_BYTES).unwrap();
        assert_eq!(extract_command(&parsed), Some("ls -la"));
    }

    #[test]
    fn test_read_rejects_oversized_input() {
        let input = format!(
            r#"{{"tool_name":"Bash","tool_input":{{"command":"{}"}}}}"#,
            "a".repeat(64)
        );
        let err = read_hook_input(input.as_bytes(), 16).unwrap_err();
        assert!(matches!(err, HookReadError::InputTooLarge { size: 17, limit: 16 }));
    }

    #[test]
    fn test_read_rejects_malformed_json() {
        let err = read_hook_input("{not json".as_bytes(), MAX_HOOK_INPUT_BYTES).unwrap_err();
        assert!(matches!(err, HookReadError::Json(_)));
    }

    // =========================================================================
    // Tests for extract_command()
    // =========================================================================

    #[test]
    fn test_extract_ignores_other_tools() {
        let input = r#"{"tool_name":"Write","tool_input":{"command":"rm -rf /"}}"#;
        let parsed = read_hook_input(input.as_bytes(), MAX_HOOK_INPUT_BYTES).unwrap();
        assert_eq!(extract_command(&parsed), None);
    }

    #[test]
    fn test_extract_ignores_missing_or_non_string_command() {
        for input in [
            r#"{"tool_name":"Bash"}"#,
            r#"{"tool_name":"Bash","tool_input":{}}"#,
            r#"{"tool_name":"Bash","tool_input":{"command":42}}"#,
            r#"{"tool_name":"Bash","tool_input":{"command":"   "}}"#,
        ] {
            let parsed = read_hook_input(input.as_bytes(), MAX_HOOK_INPUT_BYTES).unwrap();
            assert_eq!(extract_command(&parsed), None, "input: {input}");
        }
    }

    // =========================================================================
    // Tests for run()
    // =========================================================================

    #[test]
    fn test_run_emits_decision() {
        let out = run_to_string(
            &builtin(),
            r#"{"tool_name":"Bash","tool_input":{"command":"rm -rf /"}}"#,
        );
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let specific = &value["hookSpecificOutput"];
        assert_eq!(specific["hookEventName"], "PreToolUse");
        assert_eq!(specific["permissionDecision"], "deny");
        assert!(specific["permissionDecisionReason"].is_string());
    }

    #[test]
    fn test_run_is_silent_for_other_tools() {
        let out = run_to_string(&builtin(), r#"{"tool_name":"Read","tool_input":{}}"#);
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_fails_closed_on_bad_input() {
        let out = run_to_string(&builtin(), "garbage");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["hookSpecificOutput"]["permissionDecision"], "ask");
    }

    #[test]
    fn test_run_fails_closed_without_policy() {
        let policy: Result<PolicySet> = Err(anyhow::anyhow!("broken config"));
        let out = run_to_string(
            &policy,
            r#"{"tool_name":"Bash","tool_input":{"command":"ls"}}"#,
        );
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["hookSpecificOutput"]["permissionDecision"], "ask");
        assert!(
            value["hookSpecificOutput"]["permissionDecisionReason"]
                .as_str()
                .unwrap()
                .contains("broken config")
        );
    }
}
