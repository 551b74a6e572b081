use log::warn;

use crate::command::reply::{self, ERROR_CURSOR, ERROR_NOT_INTEGER, Reply};
use crate::command::session::Session;
use crate::keyspace::Keyspace;
use crate::scan::{ScanOptions, parse_cursor, scan_keys};
use crate::util::{ByteSequence, glob};

/// SCAN <cursor> [MATCH <pattern>] [COUNT <count>]
pub fn scan(keyspace: &Keyspace, session: &mut Session, args: &[ByteSequence]) -> Reply {
    let cursor = match parse_cursor(&args[0].as_text()) {
        Ok(cursor) => cursor,
        Err(_) => return Reply::Error(ERROR_CURSOR.to_string()),
    };
    // A cursor that is not the one last issued to this session belongs to a
    // different or expired traversal; restart silently instead of failing.
    let cursor = if cursor == session.scan_cursor() {
        cursor
    } else {
        0
    };

    let options = match ScanOptions::parse(&args[1..]) {
        Ok(options) => options,
        Err(status) => return reply::status_reply(&status),
    };

    let pattern = match &options.match_pattern {
        None => None,
        Some(glob_pattern) => match glob::compile(glob_pattern) {
            Ok(re) => Some(re),
            Err(status) => {
                warn!(
                    "could not compile the pattern '{glob_pattern}': {status}; \
                     SCAN will return an empty list"
                );
                session.set_scan_cursor(0);
                return Reply::scan(0, Vec::new());
            }
        },
    };

    let keys = keyspace.keys();
    let result = scan_keys(&keys, pattern.as_ref(), options.count, cursor);
    session.set_scan_cursor(result.cursor);
    Reply::scan(result.cursor, result.keys)
}

/// DEL <key> [key ...]
pub fn del(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let mut removed = 0;
    for key in args {
        keyspace.remove_expired(key, now_ms);
        if keyspace.remove(key).is_some() {
            removed += 1;
        }
    }
    Reply::Integer(removed)
}

/// EXISTS <key> [key ...]
pub fn exists(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let present = args
        .iter()
        .filter(|key| keyspace.contains_key(key, now_ms))
        .count();
    Reply::Integer(present as i64)
}

/// PEXPIREAT <key> <ms-timestamp>
pub fn pexpireat(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let key = &args[0];
    let at_ms = match args[1].as_text().parse::<i64>() {
        Ok(at) => at,
        Err(_) => return Reply::Error(ERROR_NOT_INTEGER.to_string()),
    };

    // A timestamp in the past deletes the key outright.
    if at_ms <= now_ms {
        return if keyspace.contains_key(key, now_ms) && keyspace.remove(key).is_some() {
            Reply::Integer(1)
        } else {
            Reply::Integer(0)
        };
    }

    match keyspace.update_string_if_present(key, now_ms, |s| {
        s.set_expiration_timestamp(at_ms);
        Ok(())
    }) {
        Ok(Some(())) => Reply::Integer(1),
        Ok(None) => Reply::Integer(0),
        // Expiration on non-string values is not carried by this core.
        Err(status) if status.is_wrong_type() => Reply::Integer(0),
        Err(status) => reply::status_reply(&status),
    }
}

/// PTTL <key>
pub fn pttl(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    match keyspace.get_clone(&args[0], now_ms) {
        None => Reply::Integer(-2),
        Some(value) => match value.as_string() {
            Ok(string) => match string.expire_at_ms() {
                Some(at_ms) => Reply::Integer(at_ms - now_ms),
                None => Reply::Integer(-1),
            },
            Err(_) => Reply::Integer(-1),
        },
    }
}
