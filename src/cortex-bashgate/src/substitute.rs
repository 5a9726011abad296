//! Resolution of a variable used as the command name.

use crate::assign::VarEnv;
use crate::normalize::is_valid_name;

/// Replace a leading `$NAME` or `${NAME}` with its value from `env`.
///
/// Only the command position is resolved, and only when the reference is a
/// whole word. Unknown names and references anywhere else are left as they
/// are.
pub fn substitute_known_vars(segment: &str, env: &VarEnv) -> String {
    match leading_reference(segment) {
        Some((name, rest)) => match env.get(name) {
            Some(value) => format!("{value}{rest}"),
            None => segment.to_string(),
        },
        None => segment.to_string(),
    }
}

/// Split `$NAME rest` or `${NAME} rest` into the name and the remainder.
fn leading_reference(segment: &str) -> Option<(&str, &str)> {
    let body = segment.strip_prefix('$')?;
    let (name, rest) = match body.strip_prefix('{') {
        Some(braced) => {
            let close = braced.find('}')?;
            (&braced[..close], &braced[close + 1..])
        }
        None => {
            let end = body
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(body.len());
            body.split_at(end)
        }
    };

    if !is_valid_name(name) || !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    Some((name, rest))
}
