//! The records application: HTTP routes and the event worker.
//!
//! Both halves share one [`RecordStore`](crate::store::RecordStore). The API
//! publishes every created record on the message channel; the worker
//! consumes those events and marks the records processed.

pub mod api;
pub mod worker;

pub use api::{default_mapping, RecordRoutes};
pub use worker::{spawn_worker, worker_chain};
