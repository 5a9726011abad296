//! The `check` subcommand.

use std::io::Write;

use anyhow::Result;
use cortex_bashgate::{Evaluation, PolicySet, Tier};

use crate::cli::CheckArgs;

/// Process exit code for a tier: 0 allow, 1 ask, 2 deny. Errors use
/// [`crate::EXIT_ERROR`].
pub fn exit_code(tier: Tier) -> u8 {
    match tier {
        Tier::Allow => 0,
        Tier::Ask => 1,
        Tier::Deny => 2,
    }
}

/// Classify the command in `args`, print the result and return the exit code.
pub fn run(policy: &PolicySet, args: &CheckArgs, mut out: impl Write) -> Result<u8> {
    let command = args.command_line();
    let evaluation = policy.evaluate(&command);
    crate::audit("check", &command, &evaluation.decision);

    match (args.json, args.explain) {
        (true, true) => writeln!(out, "{}", serde_json::to_string_pretty(&evaluation)?)?,
        (true, false) => writeln!(
            out,
            "{}",
            serde_json::to_string_pretty(&evaluation.decision)?
        )?,
        (false, true) => write_explanation(&evaluation, &mut out)?,
        (false, false) => writeln!(out, "{}", evaluation.decision)?,
    }

    Ok(exit_code(evaluation.decision.tier))
}

/// Human-readable per-segment trace followed by the overall decision.
fn write_explanation(evaluation: &Evaluation, out: &mut impl Write) -> Result<()> {
    for (index, segment) in evaluation.segments.iter().enumerate() {
        writeln!(out, "segment {}: {:?}", index + 1, segment.raw)?;
        writeln!(out, "  effective: {:?}", segment.effective)?;
        match &segment.decision {
            Some(decision) => {
                writeln!(out, "  {decision}")?;
                if let Some(pattern) = &decision.pattern {
                    writeln!(out, "  pattern: {pattern}")?;
                }
            }
            None => writeln!(out, "  skipped (nothing to run)")?,
        }
    }
    writeln!(out, "{}", evaluation.decision)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: &[&str], json: bool, explain: bool) -> CheckArgs {
        CheckArgs {
            json,
            explain,
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn check(command: &[&str], json: bool, explain: bool) -> (u8, String) {
        let policy = PolicySet::builtin().unwrap();
        let mut out = Vec::new();
        let code = run(&policy, &args(command, json, explain), &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(Tier::Allow), 0);
        assert_eq!(exit_code(Tier::Ask), 1);
        assert_eq!(exit_code(Tier::Deny), 2);
    }

    #[test]
    fn test_error_code_is_distinct_from_tiers() {
        for tier in Tier::BY_PRECEDENCE {
            assert_ne!(exit_code(tier), crate::EXIT_ERROR);
        }
    }

    #[test]
    fn test_arguments_are_joined() {
        let (code, out) = check(&["rm", "-rf", "/"], false, false);
        assert_eq!(code, 2);
        assert!(out.starts_with("DENY: "), "output: {out}");
    }

    #[test]
    fn test_json_output() {
        let (code, out) = check(&["git status"], true, false);
        assert_eq!(code, 0);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["tier"], "allow");
    }

    #[test]
    fn test_explain_shows_effective_text() {
        let (_, out) = check(&["RUFF=/path/to/ruff && $RUFF format src/"], false, true);
        assert!(out.contains("skipped (nothing to run)"), "output: {out}");
        assert!(out.contains("\"/path/to/ruff format src/\""), "output: {out}");
    }

    #[test]
    fn test_json_explain_includes_segments() {
        let (_, out) = check(&["ls && git push"], true, true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["segments"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["decision"]["tier"], "ask");
    }
}
