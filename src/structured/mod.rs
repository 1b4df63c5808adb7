//! Structured errors - typed, code-addressable failures.
//!
//! Provides:
//! - [`ErrorCode`] - the identity key of a failure class
//! - [`StructuredError`] - cause + code + data, with code-based identity
//! - [`is`], [`find`], [`find_structured`], [`has_code`] - wrap-chain
//!   traversal over any `std::error::Error`
//! - [`ErrorPayload`] / [`ErrorCodec`] - the JSON contract
//!
//! Structured errors flow through handler chains inside [`anyhow::Error`];
//! the source chain is the wrap chain, so a structured error stays visible
//! after any number of `context` layers.
//!
//! # Example
//!
//! ```ignore
//! use msgchain::structured::{find_structured, is, StructuredError};
//!
//! let err = anyhow::Error::new(StructuredError::new("id already exists").with_code(ALREADY_EXISTS))
//!     .context("error adding record");
//!
//! assert!(is(&*err, &StructuredError::identity(ALREADY_EXISTS)));
//! let payload = ErrorCodec::encode_string(find_structured(&*err).unwrap())?;
//! ```

mod code;
mod error;
mod payload;

pub use code::ErrorCode;
pub use error::{
    chain, find, find_structured, has_code, is, BoxError, SharedError, StructuredError,
};
pub use payload::{ErrorCodec, ErrorPayload};
