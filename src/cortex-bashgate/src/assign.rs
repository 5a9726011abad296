//! Literal variable assignments carried along one command chain.

use std::collections::HashMap;

use crate::normalize::scan_assignment;

/// Variables assigned earlier in the chain being evaluated.
///
/// Only ever holds values proven to be literal strings. Scoped to a single
/// evaluation and never shared between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarEnv {
    vars: HashMap<String, String>,
}

impl VarEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Apply assignments from a later segment; later values win.
    pub fn merge(&mut self, assignments: HashMap<String, String>) {
        self.vars.extend(assignments);
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VarEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Capture the literal `NAME=VALUE` words at the start of a segment.
///
/// Words are recognized exactly as [`strip_env_vars`] recognizes them, with an
/// optional leading `export`. A value is captured only if it is provably a
/// fixed string:
/// - unquoted with no `$`, backtick, quote or backslash;
/// - single-quoted with no embedded single quote;
/// - double-quoted, terminated, with no `$` or backtick inside.
///
/// Anything else is skipped, never guessed.
///
/// [`strip_env_vars`]: crate::strip_env_vars
pub fn extract_assignments(segment: &str) -> HashMap<String, String> {
    let mut captured = HashMap::new();
    let mut rest = segment.trim_start();
    if let Some(after) = rest.strip_prefix("export")
        && after.starts_with(char::is_whitespace)
    {
        rest = after.trim_start();
    }

    while let Some(token) = scan_assignment(rest) {
        if token.executes {
            break;
        }
        match literal_value(token.value) {
            Some(value) => {
                captured.insert(token.name.to_string(), value);
            }
            None => tracing::trace!(name = token.name, "skipping non-literal assignment"),
        }
        rest = rest[token.len..].trim_start();
    }

    captured
}

fn literal_value(raw: &str) -> Option<String> {
    if let Some(quoted) = raw.strip_prefix('\'') {
        let inner = quoted.strip_suffix('\'')?;
        return (!inner.contains('\'')).then(|| inner.to_string());
    }

    if let Some(quoted) = raw.strip_prefix('"') {
        let inner = quoted.strip_suffix('"')?;
        if inner.contains(['$', '`']) {
            return None;
        }
        return unescape_double_quoted(inner);
    }

    if raw.contains(['$', '`', '\'', '"', '\\']) {
        return None;
    }
    Some(raw.to_string())
}

/// Resolve `\"` and `\\` escapes; fails on a bare `"` (the value was not one
/// simple double-quoted string).
fn unescape_double_quoted(inner: &str) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => out.push(escaped),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => return None,
            },
            '"' => return None,
            _ => out.push(ch),
        }
    }
    Some(out)
}
