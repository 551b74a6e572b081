use crate::data::hash::RedisHash;
use crate::data::string::RedisString;
use crate::util::{Result, Status};

/// Typed value stored in the keyspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedisValue {
    Str(RedisString),
    Hash(RedisHash),
}

impl RedisValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            RedisValue::Str(_) => "string",
            RedisValue::Hash(_) => "hash",
        }
    }

    /// Expiration is evaluated lazily at access time; only the string variant
    /// carries a timestamp in this core.
    pub fn expired_at(&self, now_ms: i64) -> bool {
        match self {
            RedisValue::Str(s) => s.expired_at(now_ms),
            RedisValue::Hash(_) => false,
        }
    }

    pub fn as_string(&self) -> Result<&RedisString> {
        match self {
            RedisValue::Str(s) => Ok(s),
            other => Err(wrong_type(other)),
        }
    }

    pub fn as_string_mut(&mut self) -> Result<&mut RedisString> {
        match self {
            RedisValue::Str(s) => Ok(s),
            other => Err(wrong_type(other)),
        }
    }

    pub fn as_hash(&self) -> Result<&RedisHash> {
        match self {
            RedisValue::Hash(h) => Ok(h),
            other => Err(wrong_type(other)),
        }
    }

    pub fn as_hash_mut(&mut self) -> Result<&mut RedisHash> {
        match self {
            RedisValue::Hash(h) => Ok(h),
            other => Err(wrong_type(other)),
        }
    }
}

fn wrong_type(value: &RedisValue) -> Status {
    Status::wrong_type(format!(
        "operation against a key holding a {} value",
        value.type_name()
    ))
}
