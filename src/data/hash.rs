use crate::util::ByteSequence;

/// Hash value: field -> payload, preserving first-insertion order.
///
/// An association list is deliberate at this scale; field counts stay small
/// and iteration order matters for reply construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedisHash {
    fields: Vec<(ByteSequence, ByteSequence)>,
}

impl RedisHash {
    pub fn new() -> Self {
        RedisHash { fields: Vec::new() }
    }

    pub fn from_fields(fields: Vec<(ByteSequence, ByteSequence)>) -> Self {
        let mut hash = RedisHash::new();
        for (field, value) in fields {
            hash.hset(field, value);
        }
        hash
    }

    /// Sets one field. Returns true when the field is new.
    pub fn hset(&mut self, field: ByteSequence, value: ByteSequence) -> bool {
        for entry in &mut self.fields {
            if entry.0 == field {
                entry.1 = value;
                return false;
            }
        }
        self.fields.push((field, value));
        true
    }

    pub fn hget(&self, field: &ByteSequence) -> Option<&ByteSequence> {
        self.fields
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v)
    }

    /// One element per requested field, `None` marking absent fields.
    pub fn hmget(&self, fields: &[ByteSequence]) -> Vec<Option<&ByteSequence>> {
        fields.iter().map(|f| self.hget(f)).collect()
    }

    pub fn hlen(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[(ByteSequence, ByteSequence)] {
        &self.fields
    }
}
