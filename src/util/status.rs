use std::fmt;

/// Failure category for a single command invocation.
///
/// Every error is scoped to the command that detected it; none is fatal to
/// the process and none is retried at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// Malformed or out-of-range scan cursor.
    Cursor,
    /// Malformed command arguments: unknown keyword, missing operand.
    Syntax,
    /// An argument that must be an integer did not parse as one.
    NotInteger,
    /// Stored value does not parse as the numeric type an operation needs.
    ValueFormat,
    /// Arithmetic result is outside the legal numeric range.
    ValueRange,
    /// Operation against a key holding a different value type.
    WrongType,
    /// Delta machinery misuse: drain with nothing pending, apply mismatch.
    DeltaState,
    /// Serialized data that cannot be decoded.
    Corruption,
}

#[derive(Debug, Clone)]
pub struct Status {
    code: Code,
    message: Option<String>,
}

impl Status {
    pub fn cursor(msg: impl Into<String>) -> Self {
        Status {
            code: Code::Cursor,
            message: Some(msg.into()),
        }
    }

    pub fn syntax(msg: impl Into<String>) -> Self {
        Status {
            code: Code::Syntax,
            message: Some(msg.into()),
        }
    }

    pub fn not_integer(msg: impl Into<String>) -> Self {
        Status {
            code: Code::NotInteger,
            message: Some(msg.into()),
        }
    }

    pub fn value_format(msg: impl Into<String>) -> Self {
        Status {
            code: Code::ValueFormat,
            message: Some(msg.into()),
        }
    }

    pub fn value_range(msg: impl Into<String>) -> Self {
        Status {
            code: Code::ValueRange,
            message: Some(msg.into()),
        }
    }

    pub fn wrong_type(msg: impl Into<String>) -> Self {
        Status {
            code: Code::WrongType,
            message: Some(msg.into()),
        }
    }

    pub fn delta_state(msg: impl Into<String>) -> Self {
        Status {
            code: Code::DeltaState,
            message: Some(msg.into()),
        }
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Status {
            code: Code::Corruption,
            message: Some(msg.into()),
        }
    }

    pub fn is_cursor(&self) -> bool {
        self.code == Code::Cursor
    }

    pub fn is_syntax(&self) -> bool {
        self.code == Code::Syntax
    }

    pub fn is_value_format(&self) -> bool {
        self.code == Code::ValueFormat
    }

    pub fn is_value_range(&self) -> bool {
        self.code == Code::ValueRange
    }

    pub fn is_wrong_type(&self) -> bool {
        self.code == Code::WrongType
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{:?}: {}", self.code, msg),
            None => write!(f, "{:?}", self.code),
        }
    }
}

impl std::error::Error for Status {}

pub type Result<T> = std::result::Result<T, Status>;
