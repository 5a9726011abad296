//! Lexical normalization of shell command text.
//!
//! This is not a shell parser. Every transform here is a narrow,
//! quote-aware string rewrite that can only remove syntax the gate does not
//! care about (grouping, control-flow keywords, environment prefixes). When
//! the input is malformed the text is left in place so patterns still see it.

use std::sync::LazyLock;

use regex::Regex;

/// Keywords that precede a command inside compound statements.
static PREFIX_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:then|else|elif|do|if|while|until)(?:\s+|$)")
        .expect("Invalid prefix keyword regex")
});

/// A bare block terminator, optionally followed by redirects.
static TERMINATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:done|fi|esac)(?:\s*[0-9]*(?:<|>>|>)&?\s*[^\s;&|<>]+)*\s*$")
        .expect("Invalid terminator regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteState {
    Unquoted,
    Single,
    Double,
}

/// One character of input and whether it is shell syntax.
///
/// `literal` is set for quote characters, everything between quotes, and
/// characters escaped by a backslash. Only non-literal characters can act as
/// separators or grouping.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScannedChar {
    pub offset: usize,
    pub ch: char,
    pub literal: bool,
}

pub(crate) struct Scan {
    pub chars: Vec<ScannedChar>,
    pub end_state: QuoteState,
}

/// Walk `text` tracking quote state.
///
/// Backslashes only ever suppress a quote transition; they never hide a
/// separator, so `\;` and `\&&` are still seen as operators.
pub(crate) fn scan(text: &str) -> Scan {
    let mut chars = Vec::with_capacity(text.len());
    let mut state = QuoteState::Unquoted;
    let mut iter = text.char_indices().peekable();

    while let Some((offset, ch)) = iter.next() {
        let literal = match state {
            QuoteState::Single => {
                if ch == '\'' {
                    state = QuoteState::Unquoted;
                }
                true
            }
            QuoteState::Double => {
                if ch == '"' {
                    state = QuoteState::Unquoted;
                }
                true
            }
            QuoteState::Unquoted => match ch {
                '\'' => {
                    state = QuoteState::Single;
                    true
                }
                '"' => {
                    state = QuoteState::Double;
                    true
                }
                '\\' => true,
                _ => false,
            },
        };
        chars.push(ScannedChar {
            offset,
            ch,
            literal,
        });

        // An escaped quote or backslash is copied through without touching state.
        if ch == '\\' && state != QuoteState::Single {
            let escapable: &[char] = match state {
                QuoteState::Double => &['"', '\\'],
                _ => &['"', '\'', '\\'],
            };
            if let Some(&(next_offset, next)) = iter.peek()
                && escapable.contains(&next)
            {
                chars.push(ScannedChar {
                    offset: next_offset,
                    ch: next,
                    literal: true,
                });
                iter.next();
            }
        }
    }

    Scan {
        chars,
        end_state: state,
    }
}

/// True if `text` ends inside an open single or double quote.
pub fn has_unterminated_quote(text: &str) -> bool {
    scan(text).end_state != QuoteState::Unquoted
}

/// Replace every backslash-newline pair with a single space.
pub fn strip_line_continuations(text: &str) -> String {
    text.replace("\\\n", " ")
}

/// Split a compound command on top-level `&&`, `||` and `;`.
///
/// Separators inside quotes are ignored and `;;` (the `case` arm terminator)
/// is kept as content. Always returns at least one element; segments may be
/// empty or whitespace-only.
pub fn split_commands(text: &str) -> Vec<&str> {
    let scan = scan(text);
    let chars = &scan.chars;
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let current = chars[i];
        if current.literal {
            i += 1;
            continue;
        }
        let next = chars.get(i + 1).filter(|c| !c.literal).map(|c| c.ch);

        match (current.ch, next) {
            (';', Some(';')) => i += 2,
            (';', _) => {
                segments.push(&text[start..current.offset]);
                start = current.offset + 1;
                i += 1;
            }
            ('&', Some('&')) | ('|', Some('|')) => {
                segments.push(&text[start..current.offset]);
                start = current.offset + 2;
                i += 2;
            }
            _ => i += 1,
        }
    }

    segments.push(&text[start..]);
    segments
}

/// True for a shell variable name: `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// A leading `NAME=VALUE` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AssignmentToken<'a> {
    pub name: &'a str,
    /// The value exactly as written, quotes included.
    pub value: &'a str,
    /// Byte length of the whole token.
    pub len: usize,
    /// The value runs a command substitution (`$(...)` or backticks).
    pub executes: bool,
}

/// Recognize a `NAME=VALUE` word at the very start of `text`.
///
/// The value ends at the first whitespace outside quotes and outside any
/// `$(...)` or backtick substitution. Returns `None` if `text` does not start
/// with a valid name followed by `=`, or if the value leaves a quote or
/// substitution open.
pub(crate) fn scan_assignment(text: &str) -> Option<AssignmentToken<'_>> {
    let eq = text.find('=')?;
    let name = &text[..eq];
    if !is_valid_name(name) {
        return None;
    }

    let value_start = eq + 1;
    let mut state = QuoteState::Unquoted;
    let mut depth = 0usize;
    let mut in_backtick = false;
    let mut executes = false;
    let mut end = text.len();
    let mut iter = text[value_start..].char_indices().peekable();

    while let Some((offset, ch)) = iter.next() {
        match state {
            QuoteState::Single => {
                if ch == '\'' {
                    state = QuoteState::Unquoted;
                }
            }
            QuoteState::Double => match ch {
                '\\' => {
                    iter.next();
                }
                '"' => state = QuoteState::Unquoted,
                '`' => executes = true,
                '$' if iter.peek().is_some_and(|&(_, c)| c == '(') => executes = true,
                _ => {}
            },
            QuoteState::Unquoted => match ch {
                c if c.is_whitespace() && depth == 0 && !in_backtick => {
                    end = value_start + offset;
                    break;
                }
                '\\' => {
                    iter.next();
                }
                '\'' => state = QuoteState::Single,
                '"' => state = QuoteState::Double,
                '`' => {
                    executes = true;
                    in_backtick = !in_backtick;
                }
                '$' if iter.peek().is_some_and(|&(_, c)| c == '(') => {
                    executes = true;
                    depth += 1;
                    iter.next();
                }
                '(' if depth > 0 => depth += 1,
                ')' if depth > 0 => depth -= 1,
                _ => {}
            },
        }
    }

    if state != QuoteState::Unquoted || depth > 0 || in_backtick {
        return None;
    }

    Some(AssignmentToken {
        name,
        value: &text[value_start..end],
        len: end,
        executes,
    })
}

/// Remove a leading run of `NAME=VALUE` words.
///
/// Stops at the first word that is not an assignment, or whose value runs a
/// command substitution; that word and everything after it is kept.
pub fn strip_env_vars(text: &str) -> &str {
    let mut rest = text.trim_start();
    while let Some(token) = scan_assignment(rest) {
        if token.executes {
            break;
        }
        rest = rest[token.len..].trim_start();
    }
    rest
}

/// Strip leading control-flow keywords, or blank out a bare terminator.
///
/// `then echo hi` becomes `echo hi`; `done < input.txt` becomes the empty
/// string. Keywords only match as whole words followed by whitespace, so
/// `thermal` and `do-release-upgrade` are left alone.
pub fn strip_control_flow_keyword(text: &str) -> &str {
    let rest = strip_prefix_keywords(text.trim());
    if TERMINATOR.is_match(rest) {
        return "";
    }
    rest
}

fn strip_prefix_keywords(text: &str) -> &str {
    let mut rest = text;
    while let Some(keyword) = PREFIX_KEYWORD.find(rest) {
        rest = rest[keyword.end()..].trim_start();
    }
    rest
}

/// The redirect clause of a bare block terminator, if it has one.
///
/// `fi > /etc/cron.d/job` cleans to the empty string, but the redirect still
/// applies to the output of the whole block.
pub(crate) fn terminator_redirect(text: &str) -> Option<&str> {
    let rest = strip_prefix_keywords(strip_leading_syntax(text));
    if !TERMINATOR.is_match(rest) {
        return None;
    }
    let redirect = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim();
    (!redirect.is_empty()).then_some(redirect)
}

fn is_opener(ch: char) -> bool {
    matches!(ch, '(' | '{')
}

fn is_closer(ch: char) -> bool {
    matches!(ch, ')' | '}')
}

/// The inside of `text` if the whole of it is one `(...)` or `{...}` group.
fn enclosing_group(text: &str) -> Option<&str> {
    let scan = scan(text);
    let first = scan.chars.first()?;
    let last = scan.chars.last()?;
    if scan.chars.len() < 2
        || first.literal
        || last.literal
        || !is_opener(first.ch)
        || !is_closer(last.ch)
    {
        return None;
    }

    let mut depth = 0usize;
    for (index, c) in scan.chars.iter().enumerate() {
        if c.literal {
            continue;
        }
        if is_opener(c.ch) {
            depth += 1;
        } else if is_closer(c.ch) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return (index == scan.chars.len() - 1).then(|| &text[1..last.offset]);
            }
        }
    }
    None
}

/// Drop a leading opener or trailing closer that has no partner.
///
/// Splitting `(cd src && ls)` leaves `(cd src` and `ls)`; this turns them
/// into `cd src` and `ls`.
fn strip_unmatched_grouping(text: &str) -> &str {
    let mut text = text.trim();
    loop {
        let scan = scan(text);
        let mut open: Vec<usize> = Vec::new();
        let mut last_unmatched_closer = None;

        for (index, c) in scan.chars.iter().enumerate() {
            if c.literal {
                continue;
            }
            if is_opener(c.ch) {
                open.push(index);
            } else if is_closer(c.ch) && open.pop().is_none() {
                last_unmatched_closer = Some(index);
            }
        }

        let strip_leading = open.first() == Some(&0);
        let strip_trailing = scan.chars.len().checked_sub(1).is_some_and(|last| {
            last_unmatched_closer == Some(last)
        });
        if !strip_leading && !strip_trailing {
            return text;
        }

        let start = if strip_leading { 1 } else { 0 };
        let end = match (strip_trailing, scan.chars.last()) {
            (true, Some(last)) => last.offset,
            _ => text.len(),
        };
        if start >= end {
            return "";
        }
        text = text[start..end].trim();
    }
}

/// Strip one enclosing subshell/group pair, then any unmatched grouping.
fn strip_grouping(text: &str) -> &str {
    let text = text.trim();
    strip_unmatched_grouping(enclosing_group(text).unwrap_or(text))
}

/// Strip grouping and any leading line continuations.
fn strip_leading_syntax(text: &str) -> &str {
    let mut rest = strip_grouping(text);
    while let Some(after) = rest.strip_prefix("\\\n") {
        rest = after.trim_start();
    }
    rest
}

/// Full per-segment normalization.
///
/// Trims, strips one enclosing `( )` or `{ }` group, a leading line
/// continuation, control-flow keywords and environment prefixes. Returns the
/// empty string for segments that carry no command (`done`, `fi`, `FOO=bar`).
pub fn clean_segment(text: &str) -> String {
    let rest = strip_control_flow_keyword(strip_leading_syntax(text));
    let rest = strip_env_vars(rest);
    rest.trim().to_string()
}
