use std::collections::HashMap;

use axum::http::StatusCode;
use thiserror::Error;

use crate::structured::ErrorCode;

/// Maps error codes to HTTP statuses. Unmapped codes get 500.
#[derive(Debug, Clone, Default)]
pub struct StatusMapping {
    statuses: HashMap<ErrorCode, StatusCode>,
}

impl StatusMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a mapping.
    pub fn with(mut self, code: ErrorCode, status: StatusCode) -> Self {
        self.statuses.insert(code, status);
        self
    }

    pub fn status_for(&self, code: &ErrorCode) -> StatusCode {
        self.statuses
            .get(code)
            .copied()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl FromIterator<(ErrorCode, StatusCode)> for StatusMapping {
    fn from_iter<I: IntoIterator<Item = (ErrorCode, StatusCode)>>(iter: I) -> Self {
        Self {
            statuses: iter.into_iter().collect(),
        }
    }
}

/// Error that already knows its HTTP status (bad request bodies and the
/// like). Prefer coded structured errors plus a [`StatusMapping`] for
/// domain failures.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StatusError {
    pub status: StatusCode,
    pub message: String,
}

impl StatusError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}
