//! Record store - keyed storage used by business handlers.
//!
//! The chain engine never touches the store; handlers capture it.

mod memory;

pub use memory::MemoryStore;

use thiserror::Error;
use uuid::Uuid;

use crate::codes;
use crate::structured::{ErrorCode, StructuredError};

/// Something with a stable id.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

/// Store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound(Uuid),

    #[error("id already exists")]
    AlreadyExists(Uuid),

    #[error("id cannot be nil")]
    NilId,
}

impl StoreError {
    /// Well-known code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::NotFound(_) => codes::RECORD_NOT_FOUND,
            StoreError::AlreadyExists(_) => codes::RECORD_ALREADY_EXISTS,
            StoreError::NilId => codes::INVALID_ARGUMENT,
        }
    }
}

impl From<StoreError> for StructuredError {
    fn from(err: StoreError) -> Self {
        let code = err.code();
        StructuredError::new(err).with_code(code)
    }
}

/// Storage operations available to handlers.
pub trait RecordStore<T>: Send + Sync {
    /// Fetch by id.
    fn get(&self, id: Uuid) -> Result<T, StoreError>;

    /// Insert a new record. Nil ids are rejected, never replaced.
    fn add(&self, record: T) -> Result<(), StoreError>;

    /// Replace an existing record.
    fn update(&self, record: T) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structured::find;

    #[test]
    fn test_codes() {
        assert_eq!(StoreError::NotFound(Uuid::nil()).code(), codes::RECORD_NOT_FOUND);
        assert_eq!(
            StoreError::AlreadyExists(Uuid::nil()).code(),
            codes::RECORD_ALREADY_EXISTS
        );
        assert_eq!(StoreError::NilId.code(), codes::INVALID_ARGUMENT);
    }

    #[test]
    fn test_into_structured_keeps_cause() {
        let id = Uuid::new_v4();
        let err = StructuredError::from(StoreError::AlreadyExists(id));

        assert_eq!(err.to_string(), "record_already_exists: id already exists");
        assert_eq!(find::<StoreError>(&err), Some(&StoreError::AlreadyExists(id)));
        assert!(err.is(&StructuredError::identity(codes::RECORD_ALREADY_EXISTS)));
    }
}
