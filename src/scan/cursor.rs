use crate::util::{Result, Status};

/// Parses a client-supplied cursor, taking its absolute value.
///
/// The cursor must be a decimal integer whose magnitude fits an unsigned
/// 64-bit value; anything else, including values above 2^64-1, is a cursor
/// error.
pub fn parse_cursor(text: &str) -> Result<u64> {
    let digits = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Status::cursor(format!("invalid cursor '{text}'")));
    }
    digits
        .parse::<u64>()
        .map_err(|_| Status::cursor(format!("cursor '{text}' out of range")))
}
