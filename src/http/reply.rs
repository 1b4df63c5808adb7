use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::Value;

use super::{StatusError, StatusMapping};
use crate::handler::{Chain, Key, Scratch};
use crate::structured::{find, find_structured, ErrorPayload};

/// Scratch slot for the response of a run.
pub const REPLY: Key<Reply> = Key::new("reply");

/// Scratch slot for an `:id` path parameter.
pub const PATH_ID: Key<String> = Key::new("id");

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Empty,
    Json(Value),
    Error(ErrorPayload),
}

/// Response left by a chain for the adapter to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: ReplyBody,
}

impl Reply {
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: ReplyBody::Empty,
        }
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: ReplyBody::Json(body),
        }
    }

    pub fn error(status: StatusCode, payload: ErrorPayload) -> Self {
        Self {
            status,
            body: ReplyBody::Error(payload),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.body {
            ReplyBody::Empty => self.status.into_response(),
            ReplyBody::Json(value) => (self.status, Json(value)).into_response(),
            ReplyBody::Error(payload) => (self.status, Json(payload)).into_response(),
        }
    }
}

/// Render a failed run.
///
/// - structured error in the chain: mapped status, that error's payload
/// - [`StatusError`] in the chain: its status, full message as `error`
/// - anything else: 500, full message as `error`
pub fn error_reply(err: &anyhow::Error, mapping: &StatusMapping) -> Reply {
    if let Some(structured) = find_structured(&**err) {
        return Reply::error(
            mapping.status_for(structured.code()),
            ErrorPayload::from(structured),
        );
    }

    let status = find::<StatusError>(&**err)
        .map(|e| e.status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Reply::error(status, ErrorPayload::message(format!("{:#}", err)))
}

/// Run `chain` for one request and render the result.
///
/// `seed` pre-populates scratch (path parameters). A run that succeeds
/// without leaving a [`REPLY`] answers 200 with no body; an error that
/// escapes the chain is rendered by [`error_reply`] with no code mapping.
/// A panicking handler surfaces here as an escaped error and answers 500.
pub fn dispatch<S>(chain: &Chain, body: Bytes, seed: S) -> Response
where
    S: FnOnce(&mut Scratch),
{
    let (result, mut scratch) = chain.process_with(body, seed);

    let reply = match result {
        Ok(()) => scratch
            .take(&REPLY)
            .unwrap_or_else(|| Reply::empty(StatusCode::OK)),
        Err(err) => {
            tracing::error!("request failed outside error responder: {:#}", err);
            error_reply(&err, &StatusMapping::default())
        }
    };

    reply.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured::StructuredError;
    use serde_json::json;

    fn mapping() -> StatusMapping {
        StatusMapping::new().with("record_not_found".into(), StatusCode::NOT_FOUND)
    }

    #[test]
    fn test_structured_uses_mapping() {
        let err = anyhow::Error::new(
            StructuredError::new("record not found")
                .with_code("record_not_found")
                .with_data(json!({"id": "x"})),
        );

        let reply = error_reply(&err, &mapping());

        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(
            reply.body,
            ReplyBody::Error(ErrorPayload {
                error: Some("record not found".to_string()),
                code: "record_not_found".into(),
                data: Some(json!({"id": "x"})),
            })
        );
    }

    #[test]
    fn test_unmapped_structured_is_500() {
        let err = anyhow::Error::new(StructuredError::new("boom").with_code("unknown"));
        assert_eq!(error_reply(&err, &mapping()).status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_error_keeps_status_and_full_message() {
        let err = anyhow::Error::new(StatusError::bad_request("bad body")).context("parsing");

        let reply = error_reply(&err, &mapping());

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body, ReplyBody::Error(ErrorPayload::message("parsing: bad body")));
    }

    #[test]
    fn test_plain_error_is_500() {
        let err = anyhow::anyhow!("invalid length");

        let reply = error_reply(&err, &mapping());

        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.body, ReplyBody::Error(ErrorPayload::message("invalid length")));
    }

    #[test]
    fn test_dispatch_defaults() {
        let ok = Chain::builder().handle_fn(|ctx| ctx.next()).build();
        assert_eq!(dispatch(&ok, Bytes::new(), |_| {}).status(), StatusCode::OK);

        let failing = Chain::builder()
            .handle_fn(|_ctx| Err(StatusError::new(StatusCode::CONFLICT, "taken").into()))
            .build();
        assert_eq!(dispatch(&failing, Bytes::new(), |_| {}).status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_dispatch_answers_500_on_panic() {
        let chain = Chain::builder()
            .handler(crate::http::ErrorResponder::new(mapping()))
            .handle_fn(|_ctx| panic!("handler bug"))
            .build();

        let response = dispatch(&chain, Bytes::new(), |_| {});

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: ErrorPayload = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload, ErrorPayload::message("handler panicked: handler bug"));
    }

    #[test]
    fn test_dispatch_renders_reply_and_sees_seed() {
        let chain = Chain::builder()
            .handle_fn(|ctx| {
                let id = ctx.try_get(&PATH_ID)?.clone();
                ctx.set(&REPLY, Reply::json(StatusCode::ACCEPTED, json!({ "id": id })));
                ctx.next()
            })
            .build();

        let response = dispatch(&chain, Bytes::new(), |s| s.set(&PATH_ID, "7".to_string()));
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
