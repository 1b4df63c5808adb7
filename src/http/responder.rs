use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::reply::{error_reply, REPLY};
use super::{StatusError, StatusMapping};
use crate::codec::JsonCodec;
use crate::handler::{handler_fn, message_key, Context, Handler, HandlerResult};

/// HTTP counterpart of [`Recover`](crate::handler::Recover).
///
/// Runs the rest of the chain; any error coming back is rendered into a
/// [`Reply`](super::Reply) stored under [`REPLY`] and the run succeeds.
/// Structured errors get their status from the mapping, everything else a
/// generic error body.
#[derive(Debug, Clone)]
pub struct ErrorResponder {
    mapping: Arc<StatusMapping>,
}

impl ErrorResponder {
    pub fn new(mapping: impl Into<Arc<StatusMapping>>) -> Self {
        Self {
            mapping: mapping.into(),
        }
    }
}

impl Handler for ErrorResponder {
    fn handle(&self, ctx: &mut Context<'_>) -> HandlerResult {
        if let Err(err) = ctx.next() {
            let reply = error_reply(&err, &self.mapping);
            if reply.status.is_server_error() {
                tracing::error!(status = %reply.status, "request failed: {:#}", err);
            } else {
                tracing::debug!(status = %reply.status, "request rejected: {:#}", err);
            }
            ctx.set(&REPLY, reply);
        }
        Ok(())
    }
}

/// Decode a JSON request body into `T` under
/// [`message_key`](crate::handler::message_key), or fail with 400.
pub fn parse_body<T>() -> impl Handler
where
    T: DeserializeOwned + Send + 'static,
{
    handler_fn(|ctx| {
        let body: T = JsonCodec::decode(ctx.payload()).map_err(|e| {
            let cause = match e {
                crate::Error::Json(inner) => inner.to_string(),
                other => other.to_string(),
            };
            StatusError::bad_request(format!("error parsing payload: {}", cause))
        })?;
        ctx.set(&message_key::<T>(), body);
        ctx.next()
    })
}
