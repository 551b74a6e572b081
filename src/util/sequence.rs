use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Immutable byte payload used for keys, string values and hash fields.
///
/// Equality, ordering and hashing are all derived from the contents, so a
/// `ByteSequence` can serve both as a map key and as the stored value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteSequence {
    data: Vec<u8>,
}

impl ByteSequence {
    pub fn new(data: Vec<u8>) -> Self {
        ByteSequence { data }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        ByteSequence {
            data: data.to_vec(),
        }
    }

    pub fn empty() -> Self {
        ByteSequence { data: Vec::new() }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn compare(&self, other: &ByteSequence) -> Ordering {
        self.data.cmp(&other.data)
    }

    /// Lossy UTF-8 view, used when a command matches keys textually.
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

impl From<Vec<u8>> for ByteSequence {
    fn from(data: Vec<u8>) -> Self {
        ByteSequence::new(data)
    }
}

impl From<&[u8]> for ByteSequence {
    fn from(data: &[u8]) -> Self {
        ByteSequence::from_bytes(data)
    }
}

impl<const N: usize> From<&[u8; N]> for ByteSequence {
    fn from(data: &[u8; N]) -> Self {
        ByteSequence::from_bytes(data)
    }
}

impl From<String> for ByteSequence {
    fn from(s: String) -> Self {
        ByteSequence::new(s.into_bytes())
    }
}

impl From<&str> for ByteSequence {
    fn from(s: &str) -> Self {
        ByteSequence::from_bytes(s.as_bytes())
    }
}

impl AsRef<[u8]> for ByteSequence {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Hash for ByteSequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

impl PartialOrd for ByteSequence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByteSequence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Debug for ByteSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.data) {
            Ok(s) => write!(f, "ByteSequence(\"{s}\")"),
            Err(_) => write!(f, "ByteSequence({:?})", self.data),
        }
    }
}

impl fmt::Display for ByteSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.data) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(f, "{:?}", self.data),
        }
    }
}
