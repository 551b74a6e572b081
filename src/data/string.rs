use bytes::{Buf, BufMut};

use crate::data::delta::StringDelta;
use crate::util::{ByteSequence, Result, Status};

/// Mutable string value with delta-encoded change tracking.
///
/// Every in-place mutation records a pending [`StringDelta`] on the side so
/// that replication can ship the change instead of the whole value. At most
/// one delta is pending at a time; a further mutation extends it (append on
/// append) or collapses it to a full-state record, never drops it.
///
/// Equality covers the committed payload and the expiration timestamp only;
/// pending-delta status is transient and excluded.
#[derive(Debug, Clone)]
pub struct RedisString {
    value: ByteSequence,
    expire_at_ms: Option<i64>,
    pending: Option<StringDelta>,
}

impl PartialEq for RedisString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.expire_at_ms == other.expire_at_ms
    }
}

impl Eq for RedisString {}

impl RedisString {
    pub fn new(value: ByteSequence) -> Self {
        RedisString {
            value,
            expire_at_ms: None,
            pending: None,
        }
    }

    pub fn get(&self) -> &ByteSequence {
        &self.value
    }

    pub fn strlen(&self) -> usize {
        self.value.len()
    }

    /// Replaces the payload wholesale. A full overwrite supersedes whatever
    /// incremental change was being tracked, so the pending delta is cleared;
    /// propagation of a SET ships the entire entry.
    pub fn set(&mut self, value: ByteSequence) {
        self.value = value;
        self.pending = None;
    }

    /// Concatenates `suffix` to the payload and returns the new total length.
    pub fn append(&mut self, suffix: &ByteSequence) -> usize {
        let mut data = self.value.data().to_vec();
        data.extend_from_slice(suffix.data());
        let new_len = data.len();
        self.value = ByteSequence::new(data);
        self.record(StringDelta::Append {
            suffix: suffix.clone(),
            new_len: new_len as u64,
        });
        new_len
    }

    pub fn incr(&mut self) -> Result<i64> {
        self.incrby(1)
    }

    pub fn incrby(&mut self, delta: i64) -> Result<i64> {
        let current = self.parse_integer()?;
        let sum = current
            .checked_add(delta)
            .ok_or_else(|| Status::value_range("increment would overflow"))?;
        self.store_integer(sum);
        Ok(sum)
    }

    pub fn decr(&mut self) -> Result<i64> {
        self.decrby(1)
    }

    pub fn decrby(&mut self, delta: i64) -> Result<i64> {
        // Parse before arithmetic: a payload that is not an integer literal is
        // a format error no matter what the subtraction would do.
        let current = self.parse_integer()?;
        let sum = current
            .checked_sub(delta)
            .ok_or_else(|| Status::value_range("decrement would overflow"))?;
        self.store_integer(sum);
        Ok(sum)
    }

    pub fn incrbyfloat(&mut self, delta: f64) -> Result<f64> {
        let current = self.parse_float()?;
        let sum = current + delta;
        if !sum.is_finite() {
            return Err(Status::value_range("increment would produce NaN or Infinity"));
        }
        // f64 Display is the shortest representation that round-trips, which
        // gives the canonical text form (10 + 2.20 -> "12.2").
        self.value = ByteSequence::from(sum.to_string());
        self.record(StringDelta::Replace {
            value: self.value.clone(),
        });
        Ok(sum)
    }

    pub fn expire_at_ms(&self) -> Option<i64> {
        self.expire_at_ms
    }

    pub fn expired_at(&self, now_ms: i64) -> bool {
        self.expire_at_ms.is_some_and(|at| at <= now_ms)
    }

    /// Sets the expiration timestamp and records a delta for replication.
    pub fn set_expiration_timestamp(&mut self, at_ms: i64) {
        self.expire_at_ms = Some(at_ms);
        self.record(StringDelta::Expire { at_ms: Some(at_ms) });
    }

    /// Sets the expiration timestamp without recording a delta. Local-only:
    /// used for recomputation and test setup, never replicated.
    pub fn set_expiration_timestamp_no_delta(&mut self, at_ms: i64) {
        self.expire_at_ms = Some(at_ms);
    }

    /// Clears the expiration timestamp and records a delta for replication.
    pub fn persist(&mut self) {
        self.expire_at_ms = None;
        self.record(StringDelta::Expire { at_ms: None });
    }

    pub fn has_delta(&self) -> bool {
        self.pending.is_some()
    }

    /// Serializes the pending delta into `sink` and clears the pending flag.
    ///
    /// Calling this with nothing pending is a logic error; it must never
    /// silently produce empty output.
    pub fn to_delta(&mut self, sink: &mut impl BufMut) -> Result<()> {
        let delta = self
            .pending
            .take()
            .ok_or_else(|| Status::delta_state("no delta pending"))?;
        delta.encode(sink);
        Ok(())
    }

    /// Decodes a serialized delta from `source` and applies it, reproducing
    /// the state of the instance that produced it.
    pub fn from_delta(&mut self, source: &mut impl Buf) -> Result<()> {
        let delta = StringDelta::decode(source)?;
        self.apply(delta)
    }

    /// Applies a decoded delta to this instance.
    pub fn apply(&mut self, delta: StringDelta) -> Result<()> {
        match delta {
            StringDelta::Replace { value } => {
                self.value = value;
            }
            StringDelta::Append { suffix, new_len } => {
                let expected = self.value.len() as u64 + suffix.len() as u64;
                if expected != new_len {
                    return Err(Status::delta_state(format!(
                        "append delta expects resulting length {new_len}, have {expected}"
                    )));
                }
                let mut data = self.value.data().to_vec();
                data.extend_from_slice(suffix.data());
                self.value = ByteSequence::new(data);
            }
            StringDelta::Expire { at_ms } => {
                self.expire_at_ms = at_ms;
            }
            StringDelta::Full {
                value,
                expire_at_ms,
            } => {
                self.value = value;
                self.expire_at_ms = expire_at_ms;
            }
        }
        Ok(())
    }

    fn parse_integer(&self) -> Result<i64> {
        let text = std::str::from_utf8(self.value.data())
            .map_err(|_| Status::value_format("value is not an integer"))?;
        text.parse::<i64>()
            .map_err(|_| Status::value_format("value is not an integer"))
    }

    fn parse_float(&self) -> Result<f64> {
        let text = std::str::from_utf8(self.value.data())
            .map_err(|_| Status::value_format("value is not a valid float"))?;
        let parsed = text
            .parse::<f64>()
            .map_err(|_| Status::value_format("value is not a valid float"))?;
        if !parsed.is_finite() {
            return Err(Status::value_format("value is not a valid float"));
        }
        Ok(parsed)
    }

    fn store_integer(&mut self, value: i64) {
        self.value = ByteSequence::from(value.to_string());
        self.record(StringDelta::Replace {
            value: self.value.clone(),
        });
    }

    /// Folds a new change into the pending delta.
    fn record(&mut self, next: StringDelta) {
        let combined = match (self.pending.take(), next) {
            (None, next) => next,
            (
                Some(StringDelta::Append { suffix: prev, .. }),
                StringDelta::Append { suffix, new_len },
            ) => {
                let mut merged = prev.into_vec();
                merged.extend_from_slice(suffix.data());
                StringDelta::Append {
                    suffix: ByteSequence::new(merged),
                    new_len,
                }
            }
            // A later full rewrite covers any earlier payload change.
            (
                Some(StringDelta::Replace { .. } | StringDelta::Append { .. }),
                StringDelta::Replace { value },
            ) => StringDelta::Replace { value },
            (Some(StringDelta::Expire { .. }), StringDelta::Expire { at_ms }) => {
                StringDelta::Expire { at_ms }
            }
            // Mixed payload/expiration changes collapse to the full state.
            (Some(_), _) => StringDelta::Full {
                value: self.value.clone(),
                expire_at_ms: self.expire_at_ms,
            },
        };
        self.pending = Some(combined);
    }
}

impl Default for RedisString {
    fn default() -> Self {
        RedisString::new(ByteSequence::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Code;

    #[test]
    fn test_constructor_sets_value() {
        let s = RedisString::new(ByteSequence::from_bytes(&[0, 1, 2]));
        assert_eq!(s.get(), &ByteSequence::from_bytes(&[0, 1, 2]));
    }

    #[test]
    fn test_set_clears_pending_delta() {
        let mut s = RedisString::new(ByteSequence::from("ab"));
        s.append(&ByteSequence::from("cd"));
        assert!(s.has_delta());
        s.set(ByteSequence::from("xy"));
        assert!(!s.has_delta());
        assert_eq!(s.get(), &ByteSequence::from("xy"));
    }

    #[test]
    fn test_append_returns_new_length() {
        let mut s = RedisString::new(ByteSequence::from_bytes(&[0, 1]));
        let len = s.append(&ByteSequence::from_bytes(&[2, 3, 4, 5]));
        assert_eq!(len, 6);
        assert_eq!(s.get(), &ByteSequence::from_bytes(&[0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_consecutive_appends_extend_pending_delta() {
        let mut s = RedisString::new(ByteSequence::from("a"));
        s.append(&ByteSequence::from("b"));
        s.append(&ByteSequence::from("c"));

        let mut peer = RedisString::new(ByteSequence::from("a"));
        let mut buf = Vec::new();
        s.to_delta(&mut buf).unwrap();
        peer.from_delta(&mut buf.as_slice()).unwrap();
        assert_eq!(peer.get(), &ByteSequence::from("abc"));
        assert_eq!(peer, s);
    }

    #[test]
    fn test_incr_increments_value() {
        let mut s = RedisString::new(ByteSequence::from("10"));
        assert_eq!(s.incr().unwrap(), 11);
        assert_eq!(s.get(), &ByteSequence::from("11"));
    }

    #[test]
    fn test_incr_rejects_non_integer_payload() {
        let mut s = RedisString::new(ByteSequence::from("10 1"));
        let err = s.incr().unwrap_err();
        assert_eq!(err.code(), Code::ValueFormat);
        assert_eq!(s.get(), &ByteSequence::from("10 1"));
        assert!(!s.has_delta());
    }

    #[test]
    fn test_incr_overflow_leaves_value_unchanged() {
        let max = i64::MAX.to_string();
        let mut s = RedisString::new(ByteSequence::from(max.as_str()));
        let err = s.incr().unwrap_err();
        assert_eq!(err.code(), Code::ValueRange);
        assert_eq!(s.get(), &ByteSequence::from(max.as_str()));
        assert!(!s.has_delta());
    }

    #[test]
    fn test_incrby_increments_by_given_amount() {
        let mut s = RedisString::new(ByteSequence::from("10"));
        assert_eq!(s.incrby(2).unwrap(), 12);
        assert_eq!(s.get(), &ByteSequence::from("12"));
    }

    #[test]
    fn test_decr_decrements_value() {
        let mut s = RedisString::new(ByteSequence::from("10"));
        assert_eq!(s.decr().unwrap(), 9);
        assert_eq!(s.get(), &ByteSequence::from("9"));
    }

    #[test]
    fn test_decr_non_ascii_payload_is_format_error() {
        // A raw 0x00 byte is not an ASCII integer literal; the parse fails
        // before any arithmetic happens.
        let mut s = RedisString::new(ByteSequence::from_bytes(&[0]));
        let err = s.decr().unwrap_err();
        assert_eq!(err.code(), Code::ValueFormat);
    }

    #[test]
    fn test_decrby_non_ascii_payload_is_format_error() {
        let mut s = RedisString::new(ByteSequence::from_bytes(&[1]));
        let err = s.decrby(2).unwrap_err();
        assert_eq!(err.code(), Code::ValueFormat);
    }

    #[test]
    fn test_decrby_decrements_by_given_amount() {
        let mut s = RedisString::new(ByteSequence::from("10"));
        assert_eq!(s.decrby(2).unwrap(), 8);
        assert_eq!(s.get(), &ByteSequence::from("8"));
    }

    #[test]
    fn test_decrby_underflow_is_range_error() {
        let min = i64::MIN.to_string();
        let mut s = RedisString::new(ByteSequence::from(min.as_str()));
        let err = s.decr().unwrap_err();
        assert_eq!(err.code(), Code::ValueRange);
        assert_eq!(s.get(), &ByteSequence::from(min.as_str()));
    }

    #[test]
    fn test_incrbyfloat_trims_trailing_zeros() {
        let mut s = RedisString::new(ByteSequence::from("10"));
        let sum = s.incrbyfloat(2.20).unwrap();
        assert_eq!(sum, 12.2);
        assert_eq!(s.get(), &ByteSequence::from("12.2"));
    }

    #[test]
    fn test_incrbyfloat_rejects_non_float_payload() {
        let mut s = RedisString::new(ByteSequence::from("10 1"));
        let err = s.incrbyfloat(1.1).unwrap_err();
        assert_eq!(err.code(), Code::ValueFormat);
        assert_eq!(s.get(), &ByteSequence::from("10 1"));
    }

    #[test]
    fn test_incrbyfloat_overflow_is_range_error() {
        let max = format!("{:e}", f64::MAX);
        let mut s = RedisString::new(ByteSequence::from(max.as_str()));
        let err = s.incrbyfloat(f64::MAX).unwrap_err();
        assert_eq!(err.code(), Code::ValueRange);
        assert_eq!(s.get(), &ByteSequence::from(max.as_str()));
    }

    #[test]
    fn test_append_stores_stable_delta() {
        let mut o1 = RedisString::new(ByteSequence::from_bytes(&[0, 1]));
        o1.append(&ByteSequence::from_bytes(&[2, 3]));
        assert!(o1.has_delta());
        assert_eq!(o1.get(), &ByteSequence::from_bytes(&[0, 1, 2, 3]));

        let mut out = Vec::new();
        o1.to_delta(&mut out).unwrap();
        assert!(!o1.has_delta());

        let mut o2 = RedisString::new(ByteSequence::from_bytes(&[0, 1]));
        assert_ne!(o2, o1);
        o2.from_delta(&mut out.as_slice()).unwrap();
        assert_eq!(o2.get(), &ByteSequence::from_bytes(&[0, 1, 2, 3]));
        assert_eq!(o2, o1);
    }

    #[test]
    fn test_expiration_delta_is_stable() {
        let mut o1 = RedisString::new(ByteSequence::from_bytes(&[0, 1]));
        o1.set_expiration_timestamp(999);
        assert!(o1.has_delta());

        let mut out = Vec::new();
        o1.to_delta(&mut out).unwrap();
        assert!(!o1.has_delta());

        let mut o2 = RedisString::new(ByteSequence::from_bytes(&[0, 1]));
        assert_ne!(o2, o1);
        o2.from_delta(&mut out.as_slice()).unwrap();
        assert_eq!(o2, o1);
    }

    #[test]
    fn test_mixed_mutations_collapse_to_full_delta() {
        let mut o1 = RedisString::new(ByteSequence::from("ab"));
        o1.append(&ByteSequence::from("cd"));
        o1.set_expiration_timestamp(1234);

        let mut out = Vec::new();
        o1.to_delta(&mut out).unwrap();

        let mut o2 = RedisString::new(ByteSequence::from("ab"));
        o2.from_delta(&mut out.as_slice()).unwrap();
        assert_eq!(o2.get(), &ByteSequence::from("abcd"));
        assert_eq!(o2.expire_at_ms(), Some(1234));
        assert_eq!(o2, o1);
    }

    #[test]
    fn test_to_delta_without_pending_is_logic_error() {
        let mut s = RedisString::new(ByteSequence::from("ab"));
        let mut out = Vec::new();
        let err = s.to_delta(&mut out).unwrap_err();
        assert_eq!(err.code(), Code::DeltaState);
        assert!(out.is_empty());
    }

    #[test]
    fn test_append_delta_against_diverged_peer_is_rejected() {
        let mut o1 = RedisString::new(ByteSequence::from("ab"));
        o1.append(&ByteSequence::from("cd"));
        let mut out = Vec::new();
        o1.to_delta(&mut out).unwrap();

        let mut diverged = RedisString::new(ByteSequence::from("abc"));
        let err = diverged.from_delta(&mut out.as_slice()).unwrap_err();
        assert_eq!(err.code(), Code::DeltaState);
    }

    #[test]
    fn test_equality_ignores_pending_delta() {
        let mut o1 = RedisString::new(ByteSequence::from("ab"));
        let mut o2 = RedisString::new(ByteSequence::from("a"));
        o2.append(&ByteSequence::from("b"));
        assert_eq!(o1, o2);

        o1.set_expiration_timestamp_no_delta(1000);
        assert_ne!(o1, o2);
        o2.set_expiration_timestamp_no_delta(1000);
        assert_eq!(o1, o2);
    }

    #[test]
    fn test_expired_at() {
        let mut s = RedisString::new(ByteSequence::from("v"));
        assert!(!s.expired_at(i64::MAX));
        s.set_expiration_timestamp_no_delta(100);
        assert!(!s.expired_at(99));
        assert!(s.expired_at(100));
        assert!(s.expired_at(101));
    }
}
