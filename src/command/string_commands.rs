use crate::command::reply::{self, ERROR_NOT_A_VALID_FLOAT, ERROR_NOT_INTEGER, Reply};
use crate::data::{RedisString, RedisValue};
use crate::keyspace::Keyspace;
use crate::util::ByteSequence;

/// GET <key>
pub fn get(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    match keyspace.get_clone(&args[0], now_ms) {
        None => Reply::Nil,
        Some(value) => match value.as_string() {
            Ok(string) => Reply::Bulk(string.get().clone()),
            Err(status) => reply::status_reply(&status),
        },
    }
}

/// SET <key> <value> — unconditional wholesale replace; any previous
/// expiration goes with the old entry.
pub fn set(keyspace: &Keyspace, args: &[ByteSequence]) -> Reply {
    keyspace.put(
        args[0].clone(),
        RedisValue::Str(RedisString::new(args[1].clone())),
    );
    Reply::ok()
}

/// GETSET <key> <value>
pub fn getset(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let key = &args[0];
    // Check the resident type first: GETSET against a hash must fail without
    // replacing anything.
    if let Some(previous) = keyspace.get_clone(key, now_ms) {
        if let Err(status) = previous.as_string() {
            return reply::status_reply(&status);
        }
    }
    let previous = keyspace.replace(
        key.clone(),
        RedisValue::Str(RedisString::new(args[1].clone())),
    );
    match previous {
        Some(value) if !value.expired_at(now_ms) => match value.as_string() {
            Ok(string) => Reply::Bulk(string.get().clone()),
            Err(_) => Reply::Nil,
        },
        _ => Reply::Nil,
    }
}

/// STRLEN <key>
pub fn strlen(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    match keyspace.get_clone(&args[0], now_ms) {
        None => Reply::Integer(0),
        Some(value) => match value.as_string() {
            Ok(string) => Reply::Integer(string.strlen() as i64),
            Err(status) => reply::status_reply(&status),
        },
    }
}

/// APPEND <key> <suffix> — a missing key starts from the empty string.
pub fn append(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let suffix = args[1].clone();
    match keyspace.update_string(&args[0], now_ms, ByteSequence::empty, |s| {
        Ok(s.append(&suffix) as i64)
    }) {
        Ok(new_len) => Reply::Integer(new_len),
        Err(status) => reply::status_reply(&status),
    }
}

/// INCR <key> — a missing key is created as "0" first.
pub fn incr(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    integer_mutation(keyspace, now_ms, &args[0], |s| s.incr())
}

/// INCRBY <key> <delta>
pub fn incrby(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let Some(delta) = parse_integer_argument(&args[1]) else {
        return Reply::Error(ERROR_NOT_INTEGER.to_string());
    };
    integer_mutation(keyspace, now_ms, &args[0], |s| s.incrby(delta))
}

/// DECR <key>
pub fn decr(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    integer_mutation(keyspace, now_ms, &args[0], |s| s.decr())
}

/// DECRBY <key> <delta>
pub fn decrby(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let Some(delta) = parse_integer_argument(&args[1]) else {
        return Reply::Error(ERROR_NOT_INTEGER.to_string());
    };
    integer_mutation(keyspace, now_ms, &args[0], |s| s.decrby(delta))
}

/// INCRBYFLOAT <key> <delta> — replies with the new value as a bulk string.
pub fn incrbyfloat(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let delta = match args[1].as_text().parse::<f64>() {
        Ok(delta) if delta.is_finite() => delta,
        _ => return Reply::Error(ERROR_NOT_A_VALID_FLOAT.to_string()),
    };
    match keyspace.update_string(&args[0], now_ms, || ByteSequence::from("0"), |s| {
        s.incrbyfloat(delta)
    }) {
        Ok(sum) => Reply::Bulk(ByteSequence::from(sum.to_string())),
        Err(status) => reply::float_status_reply(&status),
    }
}

/// MGET <key> [key ...] — one element per key, nil marking entries that are
/// absent or hold a non-string value.
pub fn mget(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let values = args
        .iter()
        .map(|key| match keyspace.get_clone(key, now_ms) {
            Some(RedisValue::Str(string)) => Reply::Bulk(string.get().clone()),
            _ => Reply::Nil,
        })
        .collect();
    Reply::Array(values)
}

fn integer_mutation(
    keyspace: &Keyspace,
    now_ms: i64,
    key: &ByteSequence,
    op: impl FnOnce(&mut RedisString) -> crate::util::Result<i64>,
) -> Reply {
    match keyspace.update_string(key, now_ms, || ByteSequence::from("0"), op) {
        Ok(value) => Reply::Integer(value),
        Err(status) => reply::integer_status_reply(&status),
    }
}

fn parse_integer_argument(arg: &ByteSequence) -> Option<i64> {
    arg.as_text().parse::<i64>().ok()
}
