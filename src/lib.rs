//! # msgchain
//!
//! Message-processing chains with structured, code-addressable errors.
//!
//! A [`Chain`](handler::Chain) is an ordered list of handlers run once per
//! message. Each handler decides whether the rest of the chain runs by
//! calling [`Context::next`](handler::Context::next) and may inspect or
//! transform what comes back. Failures carry a
//! [`StructuredError`](structured::StructuredError) (cause, code, data)
//! that survives any amount of wrapping and serializes to a fixed JSON
//! shape.
//!
//! ## Layout
//!
//! - [`structured`] - error values, identity and the JSON contract
//! - [`handler`] - the chain engine plus `Recover` and `Parse`
//! - [`transport`] - in-process channel driving a chain per message
//! - [`http`] - running chains behind axum routes
//! - [`store`], [`record`], [`service`] - the records application
//!
//! ## Example
//!
//! ```
//! use msgchain::handler::{Chain, Recover};
//! use msgchain::structured::StructuredError;
//!
//! let chain = Chain::builder()
//!     .handler(Recover::with_reporter(|_json| {}))
//!     .handle_fn(|_ctx| Err(StructuredError::new("missing").with_code("NOT_FOUND").into()))
//!     .build();
//!
//! assert!(chain.process(&b"{}"[..]).is_ok());
//! ```

pub mod codec;
pub mod codes;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod record;
pub mod service;
pub mod store;
pub mod structured;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use handler::{Chain, Context, Handler, HandlerResult};
pub use structured::{ErrorCode, StructuredError};
