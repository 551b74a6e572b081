use regex::Regex;

use crate::util::{Result, Status};

/// Translates a glob pattern (`*`, `?`, `[...]`, `\` escapes) into an
/// anchored regular expression matched against the full key text.
///
/// `[!...]` negates a character class, following glob convention. An
/// unterminated character class is a compile error; the scan path recovers
/// from that by treating the pattern as matching nothing.
pub fn compile(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push_str("(?s)^");

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => push_literal(&mut re, escaped),
                None => push_literal(&mut re, '\\'),
            },
            '[' => translate_class(&mut re, &mut chars)?,
            other => push_literal(&mut re, other),
        }
    }

    re.push('$');
    Regex::new(&re).map_err(|e| Status::syntax(format!("bad pattern '{pattern}': {e}")))
}

fn translate_class(re: &mut String, chars: &mut std::str::Chars<'_>) -> Result<()> {
    let mut members = String::new();
    let mut negated = false;
    let mut first = true;
    let mut closed = false;

    while let Some(c) = chars.next() {
        match c {
            '!' if first => negated = true,
            ']' if !first || !members.is_empty() => {
                closed = true;
                break;
            }
            '\\' => {
                let escaped = chars.next().unwrap_or('\\');
                push_class_member(&mut members, escaped);
                first = false;
                continue;
            }
            ']' => {
                // ']' as the first member is a literal
                members.push_str("\\]");
            }
            '^' => members.push_str("\\^"),
            other => members.push(other),
        }
        first = false;
    }

    if !closed {
        return Err(Status::syntax("unterminated character class"));
    }

    re.push('[');
    if negated {
        re.push('^');
    }
    re.push_str(&members);
    re.push(']');
    Ok(())
}

fn push_class_member(members: &mut String, c: char) {
    // Set operators and class delimiters need escaping; anything else is
    // literal inside a class.
    if matches!(c, '\\' | ']' | '[' | '^' | '-' | '&' | '~') {
        members.push('\\');
    }
    members.push(c);
}

fn push_literal(re: &mut String, c: char) {
    let mut buf = [0u8; 4];
    re.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}
