use thiserror::Error;

/// Errors raised while converting values to or from cell bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A value could not be encoded.
    #[error("could not serialize value of type {type_name}: {reason}")]
    Serialize { type_name: String, reason: String },

    /// Stored bytes could not be decoded into the requested type.
    #[error("could not deserialize bytes into {type_name}: {reason}")]
    Deserialize { type_name: String, reason: String },

    /// The codec has no encoding for the requested type.
    #[error("codec '{codec}' does not support type {type_name}")]
    Unsupported { codec: String, type_name: String },

    /// A decoded value did not have the shape the field expects.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
}

impl CodecError {
    pub fn serialize(type_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Serialize {
            type_name: type_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn deserialize(type_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Deserialize {
            type_name: type_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
