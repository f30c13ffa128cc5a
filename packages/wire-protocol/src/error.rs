//! Decoding errors.
//!
//! Any [`DecodeError`] terminates the connection it happened on.
use swarmshare_located_error::{Located, LocatedError};

use crate::field::FieldType;

#[derive(thiserror::Error, Debug, Clone)]
pub enum DecodeError {
    /// The remote end closed the stream between two fields.
    #[error("Connection closed by the remote end")]
    ConnectionClosed,

    /// The stream failed or ended in the middle of a field.
    #[error("Unable to read from the connection: {source}")]
    Io {
        source: LocatedError<'static, std::io::Error>,
    },

    #[error("Unknown field type tag: {tag:#04x}")]
    UnknownFieldType { tag: u8 },

    #[error("Expected a {expected} field, found a {found} field")]
    UnexpectedField { expected: FieldType, found: FieldType },

    #[error("Field of {len} bytes exceeds the limit of {max} bytes")]
    FieldTooLarge { len: usize, max: usize },

    #[error("String field is not valid UTF-8")]
    InvalidUtf8,
}

impl DecodeError {
    /// Whether the connection just ended at a message boundary, as opposed to
    /// failing.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, DecodeError::ConnectionClosed)
    }
}

impl From<std::io::Error> for DecodeError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io {
            source: Located(err).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DecodeError;
    use crate::field::FieldType;

    #[test]
    fn unexpected_field() {
        let err = DecodeError::UnexpectedField {
            expected: FieldType::Integer,
            found: FieldType::String,
        };

        let err_msg = format!("{err}");

        assert!(
            err_msg.contains("Expected a integer field, found a string field"),
            "Error message did not contain expected text: {err_msg}"
        );
    }

    #[test]
    fn it_should_tell_a_clean_disconnect_from_a_failure() {
        assert!(DecodeError::ConnectionClosed.is_disconnect());
        assert!(!DecodeError::InvalidUtf8.is_disconnect());
        assert!(!DecodeError::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof)).is_disconnect());
    }
}
