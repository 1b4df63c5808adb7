//! Error types for msgchain.
//!
//! [`Error`] covers the crate's own operational failures (codecs, scratch
//! access, the message channel). Failures raised by handlers travel as
//! [`anyhow::Error`] and may carry a [`StructuredError`](crate::structured::StructuredError)
//! somewhere in their source chain.

use thiserror::Error;

/// Main error type for all msgchain operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (listener bind, signal handling).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// A structured error without a cause has no message to encode.
    #[error("structured error has no cause to encode")]
    MissingCause,

    /// Nothing stored in scratch under the key.
    #[error("no value stored under scratch key '{key}'")]
    MissingValue { key: &'static str },

    /// A value is stored under the key, but not of the requested type.
    #[error("scratch key '{key}' does not hold a value of type {expected}")]
    ValueType {
        key: &'static str,
        expected: &'static str,
    },

    /// Message channel at capacity.
    #[error("message channel full")]
    ChannelFull,

    /// Message channel closed.
    #[error("message channel closed")]
    ChannelClosed,

    /// A handler panicked during a chain run.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

/// Result type alias using msgchain's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
