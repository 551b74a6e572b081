use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::data::{RedisHash, RedisString, RedisValue, StringDelta};
use crate::util::{ByteSequence, Result, Status};

/// Replication seam: receives the serialized delta produced by each
/// successful in-place mutation, ready to ship to peer regions.
pub trait DeltaObserver: Send + Sync {
    fn delta_produced(&self, key: &ByteSequence, delta: &[u8]);
}

/// The shared keyspace region: a mapping from binary keys to typed values.
///
/// Per-key mutation is serialized under the region write lock, which gives
/// the read/compute/write-back of the string operations their atomicity.
/// Scans take no lock beyond a momentary snapshot of the key set and
/// tolerate concurrent mutation.
pub struct Keyspace {
    entries: RwLock<BTreeMap<ByteSequence, RedisValue>>,
    observer: Option<Arc<dyn DeltaObserver>>,
}

impl Keyspace {
    pub fn new() -> Self {
        Keyspace {
            entries: RwLock::new(BTreeMap::new()),
            observer: None,
        }
    }

    pub fn with_observer(observer: Arc<dyn DeltaObserver>) -> Self {
        Keyspace {
            entries: RwLock::new(BTreeMap::new()),
            observer: Some(observer),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of the current key set in iteration order. The scan engine
    /// defines cursor positions relative to this snapshot.
    pub fn keys(&self) -> Vec<ByteSequence> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn contains_key(&self, key: &ByteSequence, now_ms: i64) -> bool {
        self.get_clone(key, now_ms).is_some()
    }

    /// Returns a copy of the live value, pruning it first if it has expired.
    pub fn get_clone(&self, key: &ByteSequence, now_ms: i64) -> Option<RedisValue> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(value) if !value.expired_at(now_ms) => return Some(value.clone()),
                Some(_) => {}
            }
        }
        // Expired: upgrade to a write lock and re-check before removing.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|v| v.expired_at(now_ms)) {
            entries.remove(key);
        }
        None
    }

    pub fn put(&self, key: ByteSequence, value: RedisValue) {
        self.entries.write().insert(key, value);
    }

    /// Stores `value` and returns whatever was there before.
    pub fn replace(&self, key: ByteSequence, value: RedisValue) -> Option<RedisValue> {
        self.entries.write().insert(key, value)
    }

    pub fn remove(&self, key: &ByteSequence) -> Option<RedisValue> {
        self.entries.write().remove(key)
    }

    /// Removes the key only if its value has expired by `now_ms`.
    pub fn remove_expired(&self, key: &ByteSequence, now_ms: i64) {
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|v| v.expired_at(now_ms)) {
            entries.remove(key);
        }
    }

    /// Read-modify-write of the string value at `key`, serialized under the
    /// region lock. A missing (or lazily expired) entry is created from
    /// `create_with` before `op` runs; on error nothing is stored and no
    /// delta is drained. On success any pending delta is drained through the
    /// observer hook.
    pub fn update_string<R>(
        &self,
        key: &ByteSequence,
        now_ms: i64,
        create_with: impl FnOnce() -> ByteSequence,
        op: impl FnOnce(&mut RedisString) -> Result<R>,
    ) -> Result<R> {
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|v| v.expired_at(now_ms)) {
            entries.remove(key);
        }

        match entries.get_mut(key) {
            Some(value) => {
                let string = value.as_string_mut()?;
                let result = op(string)?;
                self.drain_delta(key, string)?;
                Ok(result)
            }
            None => {
                let mut string = RedisString::new(create_with());
                let result = op(&mut string)?;
                self.drain_delta(key, &mut string)?;
                entries.insert(key.clone(), RedisValue::Str(string));
                Ok(result)
            }
        }
    }

    /// Like [`Keyspace::update_string`] but never creates the entry; returns
    /// `None` when the key is absent or lazily expired.
    pub fn update_string_if_present<R>(
        &self,
        key: &ByteSequence,
        now_ms: i64,
        op: impl FnOnce(&mut RedisString) -> Result<R>,
    ) -> Result<Option<R>> {
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|v| v.expired_at(now_ms)) {
            entries.remove(key);
        }

        match entries.get_mut(key) {
            Some(value) => {
                let string = value.as_string_mut()?;
                let result = op(string)?;
                self.drain_delta(key, string)?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    /// Read-modify-write of the hash value at `key`; creates an empty hash
    /// for a missing entry.
    pub fn update_hash<R>(
        &self,
        key: &ByteSequence,
        now_ms: i64,
        op: impl FnOnce(&mut RedisHash) -> Result<R>,
    ) -> Result<R> {
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|v| v.expired_at(now_ms)) {
            entries.remove(key);
        }

        match entries.get_mut(key) {
            Some(value) => op(value.as_hash_mut()?),
            None => {
                let mut hash = RedisHash::new();
                let result = op(&mut hash)?;
                entries.insert(key.clone(), RedisValue::Hash(hash));
                Ok(result)
            }
        }
    }

    /// Per-entry delta-apply hook: decodes a serialized delta and applies it
    /// to the resident value, reproducing the peer's post-mutation state.
    ///
    /// A full-state delta materializes a missing entry; an incremental delta
    /// against a missing entry means the regions have diverged.
    pub fn apply_string_delta(&self, key: &ByteSequence, delta: &[u8]) -> Result<()> {
        let mut source = delta;
        let decoded = StringDelta::decode(&mut source)?;

        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(value) => value.as_string_mut()?.apply(decoded),
            None => match decoded {
                StringDelta::Replace { .. } | StringDelta::Full { .. } => {
                    let mut string = RedisString::default();
                    string.apply(decoded)?;
                    entries.insert(key.clone(), RedisValue::Str(string));
                    Ok(())
                }
                StringDelta::Append { .. } | StringDelta::Expire { .. } => Err(
                    Status::delta_state("incremental delta for a missing entry"),
                ),
            },
        }
    }

    /// Copy of every live entry, for snapshot export.
    pub fn entries_snapshot(&self) -> Vec<(ByteSequence, RedisValue)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn drain_delta(&self, key: &ByteSequence, string: &mut RedisString) -> Result<()> {
        if let Some(observer) = &self.observer {
            if string.has_delta() {
                let mut buf = Vec::new();
                string.to_delta(&mut buf)?;
                observer.delta_produced(key, &buf);
            }
        }
        Ok(())
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Keyspace::new()
    }
}
