//! Protocol error types.

use thiserror::Error;

/// Outcome of a protocol call.
///
/// Success carries the value, failure carries a [`ProtocolError`]. Chaining
/// with [`Result::and_then`] applies the continuation only on success and
/// passes a failure through unchanged.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors from protocol operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A request needed a state entry that does not exist.
    #[error("no state entry for {key}")]
    MissingState {
        /// Key that was looked up.
        key: String,
    },

    /// A state entry exists but is not a JSON object.
    #[error("state entry {key} is not an object")]
    NotAnObject {
        /// Key of the offending entry.
        key: String,
    },

    /// Request params do not have the shape the method requires.
    #[error("malformed request {method}: {reason}")]
    MalformedRequest {
        /// Method of the rejected request.
        method: String,
        /// What was wrong with it.
        reason: String,
    },

    /// JSON encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Device answered with a non-zero error code.
    #[error("device error {code}: {msg}")]
    Device {
        /// Error code reported by the device.
        code: i32,
        /// Message reported by the device (often empty).
        msg: String,
    },
}

impl ProtocolError {
    /// Returns true if the error indicates broken fixtures or requests.
    ///
    /// These are authoring bugs in the test setup. Device errors are
    /// runtime conditions a caller may handle.
    pub fn is_authoring_bug(&self) -> bool {
        matches!(
            self,
            Self::MissingState { .. } | Self::NotAnObject { .. } | Self::MalformedRequest { .. }
        )
    }
}
