//! JSON adapter for [`StructuredError`].
//!
//! Wire shape:
//!
//! ```text
//! {"error": "<cause message>", "code": "<code>", "data": <any>}
//! ```
//!
//! Every field is omitted when absent. Decoding rebuilds the cause as a plain
//! error from its message, so `code` and `data` survive a round trip but the
//! concrete cause type does not.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ErrorCode, StructuredError};
use crate::error::{Error, Result};

/// Serializable form of a [`StructuredError`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "ErrorCode::is_empty")]
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorPayload {
    /// Payload carrying only a message, for failures that were never
    /// classified.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

impl From<&StructuredError> for ErrorPayload {
    fn from(err: &StructuredError) -> Self {
        Self {
            error: err.cause().map(|cause| cause.to_string()),
            code: err.code().clone(),
            data: err.data().cloned(),
        }
    }
}

impl From<ErrorPayload> for StructuredError {
    fn from(payload: ErrorPayload) -> Self {
        let mut err = match payload.error {
            Some(message) => StructuredError::new(message),
            None => StructuredError::default(),
        };
        err = err.with_code(payload.code);
        if let Some(data) = payload.data {
            err = err.with_data(data);
        }
        err
    }
}

/// Encodes and decodes structured errors as JSON.
pub struct ErrorCodec;

impl ErrorCodec {
    /// Encode a structured error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCause`] when the error has no cause (an
    /// identity token has nothing to report).
    pub fn encode(err: &StructuredError) -> Result<Vec<u8>> {
        if err.cause().is_none() {
            return Err(Error::MissingCause);
        }
        Ok(serde_json::to_vec(&ErrorPayload::from(err))?)
    }

    /// Encode to a `String`.
    pub fn encode_string(err: &StructuredError) -> Result<String> {
        if err.cause().is_none() {
            return Err(Error::MissingCause);
        }
        Ok(serde_json::to_string(&ErrorPayload::from(err))?)
    }

    /// Decode a structured error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] on malformed input.
    pub fn decode(bytes: &[u8]) -> Result<StructuredError> {
        let payload: ErrorPayload = serde_json::from_slice(bytes)?;
        Ok(payload.into())
    }
}
