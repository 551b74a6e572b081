//! JSON snapshot of a keyspace, for fixtures and migration tooling.
//!
//! The snapshot carries committed state only: payload bytes, expiration and
//! hash fields. Pending deltas are transient and never serialized here.

use serde::{Deserialize, Serialize};

use crate::data::{RedisHash, RedisString, RedisValue};
use crate::keyspace::Keyspace;
use crate::util::{ByteSequence, Result, Status};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SnapshotValue {
    String {
        value: ByteSequence,
        expire_at_ms: Option<i64>,
    },
    Hash {
        fields: Vec<(ByteSequence, ByteSequence)>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyspaceSnapshot {
    entries: Vec<(ByteSequence, SnapshotValue)>,
}

impl KeyspaceSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes every live entry to a JSON document.
pub fn export_snapshot(keyspace: &Keyspace) -> Result<String> {
    let entries = keyspace
        .entries_snapshot()
        .into_iter()
        .map(|(key, value)| {
            let snapshot = match value {
                RedisValue::Str(string) => SnapshotValue::String {
                    expire_at_ms: string.expire_at_ms(),
                    value: string.get().clone(),
                },
                RedisValue::Hash(hash) => SnapshotValue::Hash {
                    fields: hash.fields().to_vec(),
                },
            };
            (key, snapshot)
        })
        .collect();

    serde_json::to_string(&KeyspaceSnapshot { entries })
        .map_err(|e| Status::corruption(format!("snapshot encode failed: {e}")))
}

/// Loads a JSON snapshot into the keyspace, replacing entries whose keys
/// collide. Returns the number of entries imported.
pub fn import_snapshot(keyspace: &Keyspace, json: &str) -> Result<usize> {
    let snapshot: KeyspaceSnapshot = serde_json::from_str(json)
        .map_err(|e| Status::corruption(format!("snapshot decode failed: {e}")))?;

    let imported = snapshot.entries.len();
    for (key, value) in snapshot.entries {
        let value = match value {
            SnapshotValue::String {
                value,
                expire_at_ms,
            } => {
                let mut string = RedisString::new(value);
                if let Some(at_ms) = expire_at_ms {
                    string.set_expiration_timestamp_no_delta(at_ms);
                }
                RedisValue::Str(string)
            }
            SnapshotValue::Hash { fields } => RedisValue::Hash(RedisHash::from_fields(fields)),
        };
        keyspace.put(key, value);
    }
    Ok(imported)
}
