//! HTTP adapter - runs handler chains per request.
//!
//! Provides:
//! - [`StatusMapping`] - error code to HTTP status
//! - [`StatusError`] - a transport error carrying its own status
//! - [`Reply`] - the response a chain leaves in scratch under [`REPLY`]
//! - [`ErrorResponder`] - the HTTP recovery handler
//! - [`parse_body`] - JSON body decoding with a 400 on failure
//! - [`dispatch`] - run a chain for one request and render its reply
//!
//! # Example
//!
//! ```ignore
//! let chain = Chain::builder()
//!     .handler(ErrorResponder::new(mapping))
//!     .handler(parse_body::<Record>())
//!     .handle_fn(create_record)
//!     .build();
//!
//! async fn post(State(chain): State<Chain>, body: Bytes) -> Response {
//!     dispatch(&chain, body, |_| {})
//! }
//! ```

mod mapping;
mod reply;
mod responder;

pub use mapping::{StatusError, StatusMapping};
pub use reply::{dispatch, error_reply, Reply, ReplyBody, PATH_ID, REPLY};
pub use responder::{parse_body, ErrorResponder};
