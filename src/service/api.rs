//! Record HTTP routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use serde_json::json;
use uuid::Uuid;

use crate::codes;
use crate::handler::{message_key, Chain};
use crate::http::{dispatch, parse_body, ErrorResponder, Reply, StatusMapping, PATH_ID, REPLY};
use crate::record::Record;
use crate::store::RecordStore;
use crate::structured::StructuredError;
use crate::transport::Producer;

/// Status mapping for the record codes.
pub fn default_mapping() -> StatusMapping {
    StatusMapping::new()
        .with(codes::RECORD_NOT_FOUND, StatusCode::NOT_FOUND)
        .with(codes::RECORD_ALREADY_EXISTS, StatusCode::CONFLICT)
        .with(codes::INVALID_ARGUMENT, StatusCode::BAD_REQUEST)
}

/// One chain per route.
#[derive(Clone, Debug)]
pub struct RecordRoutes {
    create: Chain,
    fetch: Chain,
}

impl RecordRoutes {
    pub fn new(
        store: Arc<dyn RecordStore<Record>>,
        producer: Producer<Record>,
        mapping: StatusMapping,
    ) -> Self {
        let mapping = Arc::new(mapping);

        Self {
            create: create_chain(store.clone(), producer, mapping.clone()),
            fetch: fetch_chain(store, mapping),
        }
    }

    /// `POST /v1/record` and `GET /v1/record/:id`.
    pub fn router(self) -> Router {
        Router::new()
            .route("/v1/record", post(create_record))
            .route("/v1/record/:id", get(fetch_record))
            .with_state(self)
    }
}

fn create_chain(
    store: Arc<dyn RecordStore<Record>>,
    producer: Producer<Record>,
    mapping: Arc<StatusMapping>,
) -> Chain {
    Chain::builder()
        .handler(ErrorResponder::new(mapping))
        .handler(parse_body::<Record>())
        .handle_fn(move |ctx| {
            let record = ctx.try_take(&message_key::<Record>())?;

            // Claim the channel slot first so a stored record is always
            // published.
            let payload = Bytes::from(producer.format().encode(&record)?);
            let slot = producer.reserve()?;

            if let Err(e) = store.add(record) {
                let err = StructuredError::from(e);
                if err.code() == &codes::RECORD_ALREADY_EXISTS {
                    return Err(anyhow::Error::new(err).context("error adding record"));
                }
                return Err(err.into());
            }

            slot.send_raw(payload);
            ctx.set(&REPLY, Reply::empty(StatusCode::CREATED));
            ctx.next()
        })
        .build()
}

fn fetch_chain(store: Arc<dyn RecordStore<Record>>, mapping: Arc<StatusMapping>) -> Chain {
    Chain::builder()
        .handler(ErrorResponder::new(mapping))
        .handle_fn(move |ctx| {
            // Not a structured error: a malformed id is reported as a 500.
            let id = Uuid::parse_str(ctx.try_get(&PATH_ID)?)?;

            let record = store
                .get(id)
                .map_err(|e| StructuredError::from(e).with_data(json!({ "id": id })))?;

            ctx.set(&REPLY, Reply::json(StatusCode::OK, serde_json::to_value(&record)?));
            ctx.next()
        })
        .build()
}

async fn create_record(State(routes): State<RecordRoutes>, body: Bytes) -> Response {
    dispatch(&routes.create, body, |_| {})
}

async fn fetch_record(State(routes): State<RecordRoutes>, Path(id): Path<String>) -> Response {
    dispatch(&routes.fetch, Bytes::new(), |scratch| scratch.set(&PATH_ID, id))
}
