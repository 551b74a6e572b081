use regex::Regex;

use crate::util::{ByteSequence, Result, Status};

/// Page-size hint used when the client omits COUNT.
pub const DEFAULT_COUNT: usize = 10;

/// Parsed `[MATCH <pattern>] [COUNT <count>]` tail of a SCAN command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub match_pattern: Option<String>,
    pub count: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            match_pattern: None,
            count: DEFAULT_COUNT,
        }
    }
}

impl ScanOptions {
    /// Walks the keyword arguments in pairs. Keywords are case-insensitive;
    /// an unknown keyword or a keyword missing its argument is a syntax
    /// error, a COUNT that does not parse is an integer error, and a COUNT
    /// below one is a syntax error.
    pub fn parse(args: &[ByteSequence]) -> Result<ScanOptions> {
        let mut options = ScanOptions::default();
        let mut i = 0;
        while i < args.len() {
            let keyword = args[i].as_text();
            let argument = args
                .get(i + 1)
                .ok_or_else(|| Status::syntax(format!("'{keyword}' requires an argument")))?;

            if keyword.eq_ignore_ascii_case("MATCH") {
                options.match_pattern = Some(argument.as_text());
            } else if keyword.eq_ignore_ascii_case("COUNT") {
                let count = argument
                    .as_text()
                    .parse::<i64>()
                    .map_err(|_| Status::not_integer("COUNT is not an integer"))?;
                if count < 1 {
                    return Err(Status::syntax("COUNT must be positive"));
                }
                options.count = count as usize;
            } else {
                return Err(Status::syntax(format!("unknown keyword '{keyword}'")));
            }
            i += 2;
        }
        Ok(options)
    }
}

/// One page of a resumable keyspace scan: the cursor to present on the next
/// call (0 when the traversal is complete) and the keys matched on this page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub cursor: u64,
    pub keys: Vec<ByteSequence>,
}

impl ScanResult {
    pub fn empty() -> Self {
        ScanResult {
            cursor: 0,
            keys: Vec::new(),
        }
    }
}

/// Bounded walk over a snapshot of the keyspace iteration order.
///
/// The cursor is an ordinal position: the walk skips `cursor` entries, then
/// collects keys matching `pattern` until `count` matches are found or the
/// snapshot is exhausted. The returned cursor is one past the last entry
/// examined, or 0 at exhaustion.
///
/// Because the live keyspace may be mutated between calls, a multi-call scan
/// promises only termination and at-least-once delivery of keys present for
/// its whole duration; no per-call lock is taken.
pub fn scan_keys(
    keys: &[ByteSequence],
    pattern: Option<&Regex>,
    count: usize,
    cursor: u64,
) -> ScanResult {
    let mut page = Vec::new();
    let size = keys.len();
    let mut skipped: u64 = 0;
    let mut matched = 0usize;
    let mut last_examined: Option<usize> = None;

    for (i, key) in keys.iter().enumerate() {
        last_examined = Some(i);
        if skipped < cursor {
            skipped += 1;
            continue;
        }

        let include = match pattern {
            Some(re) => re.is_match(&key.as_text()),
            None => true,
        };
        if include {
            page.push(key.clone());
            matched += 1;
        }
        if matched == count {
            break;
        }
    }

    let next_cursor = match last_examined {
        Some(i) if i + 1 < size => (i + 1) as u64,
        _ => 0,
    };

    ScanResult {
        cursor: next_cursor,
        keys: page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::glob;

    fn keys(names: &[&str]) -> Vec<ByteSequence> {
        names.iter().map(|n| ByteSequence::from(*n)).collect()
    }

    #[test]
    fn test_options_defaults() {
        let options = ScanOptions::parse(&[]).unwrap();
        assert_eq!(options, ScanOptions::default());
        assert_eq!(options.count, DEFAULT_COUNT);
    }

    #[test]
    fn test_options_match_and_count() {
        let args = keys(&["MATCH", "f*", "count", "25"]);
        let options = ScanOptions::parse(&args).unwrap();
        assert_eq!(options.match_pattern.as_deref(), Some("f*"));
        assert_eq!(options.count, 25);
    }

    #[test]
    fn test_options_missing_argument_is_syntax_error() {
        let err = ScanOptions::parse(&keys(&["MATCH"])).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_options_unknown_keyword_is_syntax_error() {
        let err = ScanOptions::parse(&keys(&["BOGUS", "1"])).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_options_bad_count() {
        let err = ScanOptions::parse(&keys(&["COUNT", "abc"])).unwrap_err();
        assert_eq!(err.code(), crate::util::Code::NotInteger);

        let err = ScanOptions::parse(&keys(&["COUNT", "0"])).unwrap_err();
        assert!(err.is_syntax());

        let err = ScanOptions::parse(&keys(&["COUNT", "-3"])).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_scan_single_page_exhausts() {
        let all = keys(&["a", "b", "c"]);
        let result = scan_keys(&all, None, 10, 0);
        assert_eq!(result.cursor, 0);
        assert_eq!(result.keys, all);
    }

    #[test]
    fn test_scan_pages_never_exceed_count() {
        let all = keys(&["a", "b", "c", "d", "e"]);
        let mut cursor = 0;
        let mut seen = Vec::new();
        loop {
            let result = scan_keys(&all, None, 2, cursor);
            assert!(result.keys.len() <= 2);
            seen.extend(result.keys);
            cursor = result.cursor;
            if cursor == 0 {
                break;
            }
        }
        assert_eq!(seen, all);
    }

    #[test]
    fn test_scan_cursor_resumes_by_ordinal() {
        let all = keys(&["a", "b", "c", "d"]);
        let first = scan_keys(&all, None, 2, 0);
        assert_eq!(first.cursor, 2);
        assert_eq!(first.keys, keys(&["a", "b"]));

        let second = scan_keys(&all, None, 2, first.cursor);
        assert_eq!(second.cursor, 0);
        assert_eq!(second.keys, keys(&["c", "d"]));
    }

    #[test]
    fn test_scan_count_reached_at_final_entry_returns_zero() {
        let all = keys(&["a", "b"]);
        let result = scan_keys(&all, None, 2, 0);
        assert_eq!(result.cursor, 0);
    }

    #[test]
    fn test_scan_with_pattern_filters_but_still_pages() {
        let all = keys(&["foo", "bar", "faz"]);
        let re = glob::compile("f*").unwrap();
        let mut cursor = 0;
        let mut seen = Vec::new();
        loop {
            let result = scan_keys(&all, Some(&re), 1, cursor);
            seen.extend(result.keys);
            cursor = result.cursor;
            if cursor == 0 {
                break;
            }
        }
        seen.sort();
        assert_eq!(seen, keys(&["faz", "foo"]));
    }

    #[test]
    fn test_scan_cursor_past_end_returns_empty_complete_page() {
        let all = keys(&["a", "b"]);
        let result = scan_keys(&all, None, 10, 100);
        assert_eq!(result.cursor, 0);
        assert!(result.keys.is_empty());
    }

    #[test]
    fn test_scan_empty_keyspace() {
        let result = scan_keys(&[], None, 10, 0);
        assert_eq!(result, ScanResult::empty());
    }
}
