use crate::util::{ByteSequence, Code, Status};

/// Wire error text is owned here and stable within a deployment; the core
/// components only ever report a [`Status`].
pub const ERROR_CURSOR: &str = "ERR invalid cursor";
pub const ERROR_SYNTAX: &str = "ERR syntax error";
pub const ERROR_NOT_INTEGER: &str = "ERR value is not an integer or out of range";
pub const ERROR_OVERFLOW: &str = "ERR increment or decrement would overflow";
pub const ERROR_NOT_A_VALID_FLOAT: &str = "ERR value is not a valid float";
pub const ERROR_NAN_OR_INFINITY: &str = "ERR increment would produce NaN or Infinity";
pub const ERROR_WRONG_TYPE: &str =
    "WRONGTYPE Operation against a key holding the wrong kind of value";
pub const ERROR_INTERNAL: &str = "ERR internal error";

/// Reply shape handed to the wire encoder. The dispatcher converts every
/// result or failure of the core into one of these; the core never builds
/// protocol bytes itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Simple(String),
    Bulk(ByteSequence),
    Integer(i64),
    Array(Vec<Reply>),
    Nil,
    Error(String),
}

impl Reply {
    pub fn ok() -> Reply {
        Reply::Simple("OK".to_string())
    }

    /// Two-element SCAN reply: next cursor as a decimal bulk string, then
    /// the page of matched keys.
    pub fn scan(cursor: u64, keys: Vec<ByteSequence>) -> Reply {
        Reply::Array(vec![
            Reply::Bulk(ByteSequence::from(cursor.to_string())),
            Reply::Array(keys.into_iter().map(Reply::Bulk).collect()),
        ])
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

/// Status-to-wire translation for commands whose operand grammar is generic.
pub fn status_reply(status: &Status) -> Reply {
    let text = match status.code() {
        Code::Cursor => ERROR_CURSOR,
        Code::Syntax => ERROR_SYNTAX,
        Code::NotInteger => ERROR_NOT_INTEGER,
        Code::ValueFormat => ERROR_NOT_INTEGER,
        Code::ValueRange => ERROR_OVERFLOW,
        Code::WrongType => ERROR_WRONG_TYPE,
        Code::DeltaState | Code::Corruption => ERROR_INTERNAL,
    };
    Reply::Error(text.to_string())
}

/// Status-to-wire translation for the INCR family: format and range failures
/// both surface as the integer error texts.
pub fn integer_status_reply(status: &Status) -> Reply {
    match status.code() {
        Code::ValueFormat => Reply::Error(ERROR_NOT_INTEGER.to_string()),
        Code::ValueRange => Reply::Error(ERROR_OVERFLOW.to_string()),
        _ => status_reply(status),
    }
}

/// Status-to-wire translation for INCRBYFLOAT.
pub fn float_status_reply(status: &Status) -> Reply {
    match status.code() {
        Code::ValueFormat => Reply::Error(ERROR_NOT_A_VALID_FLOAT.to_string()),
        Code::ValueRange => Reply::Error(ERROR_NAN_OR_INFINITY.to_string()),
        _ => status_reply(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_reply_shape() {
        let reply = Reply::scan(7, vec![ByteSequence::from("a")]);
        assert_eq!(
            reply,
            Reply::Array(vec![
                Reply::Bulk(ByteSequence::from("7")),
                Reply::Array(vec![Reply::Bulk(ByteSequence::from("a"))]),
            ])
        );
    }

    #[test]
    fn test_error_translation_per_family() {
        let format = Status::value_format("bad");
        assert_eq!(
            integer_status_reply(&format),
            Reply::Error(ERROR_NOT_INTEGER.to_string())
        );
        assert_eq!(
            float_status_reply(&format),
            Reply::Error(ERROR_NOT_A_VALID_FLOAT.to_string())
        );

        let range = Status::value_range("overflow");
        assert_eq!(
            integer_status_reply(&range),
            Reply::Error(ERROR_OVERFLOW.to_string())
        );
        assert_eq!(
            float_status_reply(&range),
            Reply::Error(ERROR_NAN_OR_INFINITY.to_string())
        );
    }
}
