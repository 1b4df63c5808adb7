//! Error codes shared by the store, the HTTP layer and the worker.

use crate::structured::ErrorCode;

pub const RECORD_NOT_FOUND: ErrorCode = ErrorCode::from_static("record_not_found");
pub const RECORD_ALREADY_EXISTS: ErrorCode = ErrorCode::from_static("record_already_exists");
pub const INVALID_ARGUMENT: ErrorCode = ErrorCode::from_static("invalid_argument");
