//! Delta record format
//!
//! A serialized delta is a single self-checking record:
//!
//! +----------+---------+-------+---------+
//! | Checksum | Length  | Tag   | Payload |
//! +----------+---------+-------+---------+
//! | 4 bytes  | 4 bytes | 1 byte| N bytes |
//! +----------+---------+-------+---------+
//!
//! The checksum covers the tag byte and the payload. The payload layout is
//! tag-specific; lengths and integers are little-endian.

use bytes::{Buf, BufMut};
use crc32fast::Hasher;

use crate::util::{ByteSequence, Result, Status};

/// Header size: checksum(4) + length(4) + tag(1) = 9 bytes
pub const HEADER_SIZE: usize = 9;

const TAG_REPLACE: u8 = 1;
const TAG_APPEND: u8 = 2;
const TAG_EXPIRE: u8 = 3;
const TAG_FULL: u8 = 4;

/// A compact description of one pending change to a string value.
///
/// Applying a delta to a copy of the pre-mutation state reproduces the
/// post-mutation state exactly; the full value is only shipped when mixed
/// mutations leave no cheaper encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringDelta {
    /// The payload was rewritten wholesale (SET-family, INCR-family results).
    Replace { value: ByteSequence },
    /// Bytes were appended; `new_len` is the payload length after the append
    /// and guards against applying the delta to a diverged peer.
    Append { suffix: ByteSequence, new_len: u64 },
    /// The expiration timestamp changed; `None` clears it.
    Expire { at_ms: Option<i64> },
    /// Fallback for mixed mutations: the complete post-state.
    Full {
        value: ByteSequence,
        expire_at_ms: Option<i64>,
    },
}

impl StringDelta {
    fn tag(&self) -> u8 {
        match self {
            StringDelta::Replace { .. } => TAG_REPLACE,
            StringDelta::Append { .. } => TAG_APPEND,
            StringDelta::Expire { .. } => TAG_EXPIRE,
            StringDelta::Full { .. } => TAG_FULL,
        }
    }

    /// Serializes this delta as one checksummed record.
    pub fn encode(&self, sink: &mut impl BufMut) {
        let mut payload = Vec::new();
        match self {
            StringDelta::Replace { value } => {
                payload.put_slice(value.data());
            }
            StringDelta::Append { suffix, new_len } => {
                payload.put_u64_le(*new_len);
                payload.put_slice(suffix.data());
            }
            StringDelta::Expire { at_ms } => {
                put_timestamp(&mut payload, *at_ms);
            }
            StringDelta::Full {
                value,
                expire_at_ms,
            } => {
                put_timestamp(&mut payload, *expire_at_ms);
                payload.put_slice(value.data());
            }
        }

        let tag = self.tag();
        sink.put_u32_le(checksum(tag, &payload));
        sink.put_u32_le(payload.len() as u32);
        sink.put_u8(tag);
        sink.put_slice(&payload);
    }

    /// Decodes one record, verifying length and checksum.
    pub fn decode(source: &mut impl Buf) -> Result<StringDelta> {
        if source.remaining() < HEADER_SIZE {
            return Err(Status::corruption("delta record too short"));
        }
        let expected_checksum = source.get_u32_le();
        let length = source.get_u32_le() as usize;
        let tag = source.get_u8();
        if source.remaining() < length {
            return Err(Status::corruption("delta record truncated"));
        }
        let mut payload = vec![0u8; length];
        source.copy_to_slice(&mut payload);

        if checksum(tag, &payload) != expected_checksum {
            return Err(Status::corruption("delta checksum mismatch"));
        }

        let mut payload = payload.as_slice();
        match tag {
            TAG_REPLACE => Ok(StringDelta::Replace {
                value: ByteSequence::from_bytes(payload),
            }),
            TAG_APPEND => {
                if payload.len() < 8 {
                    return Err(Status::corruption("append delta too short"));
                }
                let new_len = payload.get_u64_le();
                Ok(StringDelta::Append {
                    suffix: ByteSequence::from_bytes(payload),
                    new_len,
                })
            }
            TAG_EXPIRE => Ok(StringDelta::Expire {
                at_ms: get_timestamp(&mut payload)?,
            }),
            TAG_FULL => {
                let expire_at_ms = get_timestamp(&mut payload)?;
                Ok(StringDelta::Full {
                    value: ByteSequence::from_bytes(payload),
                    expire_at_ms,
                })
            }
            other => Err(Status::corruption(format!("unknown delta tag {other}"))),
        }
    }
}

fn checksum(tag: u8, payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[tag]);
    hasher.update(payload);
    hasher.finalize()
}

fn put_timestamp(payload: &mut Vec<u8>, at_ms: Option<i64>) {
    match at_ms {
        Some(at) => {
            payload.put_u8(1);
            payload.put_i64_le(at);
        }
        None => payload.put_u8(0),
    }
}

fn get_timestamp(payload: &mut &[u8]) -> Result<Option<i64>> {
    if payload.remaining() < 1 {
        return Err(Status::corruption("expire delta too short"));
    }
    match payload.get_u8() {
        0 => Ok(None),
        1 => {
            if payload.remaining() < 8 {
                return Err(Status::corruption("expire delta too short"));
            }
            Ok(Some(payload.get_i64_le()))
        }
        other => Err(Status::corruption(format!(
            "bad expire presence byte {other}"
        ))),
    }
}
