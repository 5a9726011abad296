//! Unwrapping of `bash -c` / `sh -c` invocations.

use std::sync::LazyLock;

use regex::Regex;

/// `bash -c ` or `sh -c `, bare or by absolute path.
static SHELL_C_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:/[^\s'"]*/)?(?:bash|sh)\s+-c\s+"#).expect("Invalid shell wrapper regex")
});

/// Anything that could make the wrapped body compound, redirected or dynamic.
const UNSAFE_BODY_SEQUENCES: &[&str] = &[
    "&&", "||", ";", "|", "&", "$(", "`", ">", "<", "(", ")", "\n", "\r", "\\",
];

/// Return the body of `bash -c "<body>"` if it is provably one simple command.
///
/// The quoted argument must span the rest of the segment, contain no quote
/// of its own kind, and contain none of the operators above. In every other
/// case the segment is returned unchanged.
pub fn strip_bash_c_wrapper(segment: &str) -> String {
    unwrap_shell_c(segment)
        .map(str::to_string)
        .unwrap_or_else(|| segment.to_string())
}

pub(crate) fn unwrap_shell_c(segment: &str) -> Option<&str> {
    let prefix = SHELL_C_PREFIX.find(segment)?;
    let quoted = &segment[prefix.end()..];
    let quote = quoted.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    if quoted.len() < 2 || !quoted.ends_with(quote) {
        return None;
    }

    let body = &quoted[1..quoted.len() - 1];
    if body.contains(quote) || UNSAFE_BODY_SEQUENCES.iter().any(|seq| body.contains(seq)) {
        return None;
    }
    Some(body.trim())
}
