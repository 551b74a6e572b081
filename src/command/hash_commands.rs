use crate::command::reply::{self, Reply};
use crate::keyspace::Keyspace;
use crate::util::ByteSequence;

/// HSET <key> <field> <value> [field value ...]
pub fn hset(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let pairs = &args[1..];
    if pairs.len() % 2 != 0 {
        return Reply::Error("ERR wrong number of arguments for 'hset' command".to_string());
    }

    match keyspace.update_hash(&args[0], now_ms, |hash| {
        let mut added = 0;
        for pair in pairs.chunks_exact(2) {
            if hash.hset(pair[0].clone(), pair[1].clone()) {
                added += 1;
            }
        }
        Ok(added)
    }) {
        Ok(added) => Reply::Integer(added),
        Err(status) => reply::status_reply(&status),
    }
}

/// HGET <key> <field>
pub fn hget(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    match keyspace.get_clone(&args[0], now_ms) {
        None => Reply::Nil,
        Some(value) => match value.as_hash() {
            Ok(hash) => match hash.hget(&args[1]) {
                Some(found) => Reply::Bulk(found.clone()),
                None => Reply::Nil,
            },
            Err(status) => reply::status_reply(&status),
        },
    }
}

/// HMGET <key> <field> [field ...] — one element per requested field, nil
/// marking absent fields; a missing key yields all nils.
pub fn hmget(keyspace: &Keyspace, now_ms: i64, args: &[ByteSequence]) -> Reply {
    let fields = &args[1..];
    match keyspace.get_clone(&args[0], now_ms) {
        None => Reply::Array(fields.iter().map(|_| Reply::Nil).collect()),
        Some(value) => match value.as_hash() {
            Ok(hash) => Reply::Array(
                hash.hmget(fields)
                    .into_iter()
                    .map(|found| match found {
                        Some(v) => Reply::Bulk(v.clone()),
                        None => Reply::Nil,
                    })
                    .collect(),
            ),
            Err(status) => reply::status_reply(&status),
        },
    }
}
