use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::ErrorCode;

/// Boxed error accepted as a cause.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Shared error handle.
///
/// Plain (non-structured) errors are compared by instance, so a caller that
/// wants to test for a specific cause later keeps a clone of the handle it
/// passed in.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// A typed failure: optional cause, optional code, optional payload.
///
/// Identity is the code: two structured errors with the same non-empty code
/// are the same failure whatever their causes or data (see [`is`]).
///
/// # Example
///
/// ```
/// use msgchain::structured::{is, ErrorCode, StructuredError};
///
/// const NOT_FOUND: ErrorCode = ErrorCode::from_static("NOT_FOUND");
///
/// let err = StructuredError::new("missing").with_code(NOT_FOUND);
/// assert_eq!(err.to_string(), "NOT_FOUND: missing");
///
/// let token = StructuredError::identity(NOT_FOUND);
/// assert!(is(&err, &token));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StructuredError {
    cause: Option<SharedError>,
    code: ErrorCode,
    data: Option<Value>,
}

impl StructuredError {
    /// Wrap a cause. Anything convertible to a boxed error works: another
    /// error value, a `String`, a `&str`, an [`anyhow::Error`].
    pub fn new<E>(cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        let boxed: BoxError = cause.into();
        Self::from_shared(Arc::from(boxed))
    }

    /// Wrap a cause the caller keeps a handle to.
    pub fn from_shared(cause: SharedError) -> Self {
        Self {
            cause: Some(cause),
            ..Self::default()
        }
    }

    /// A cause-less error carrying only a code, used as the target of an
    /// identity check.
    pub fn identity(code: impl Into<ErrorCode>) -> Self {
        Self::default().with_code(code)
    }

    pub fn with_code(mut self, code: impl Into<ErrorCode>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// The one-level-down wrapped error.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Code identity: both codes non-empty and equal. Causes and data are
    /// not consulted.
    pub fn same_identity(&self, other: &StructuredError) -> bool {
        !self.code.is_empty() && self.code == other.code
    }

    /// Identity check of this error (and everything it wraps) against
    /// `target`. See [`is`].
    pub fn is(&self, target: &(dyn StdError + 'static)) -> bool {
        is(self, target)
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code.is_empty(), &self.cause) {
            (false, Some(cause)) => write!(f, "{}: {}", self.code, cause),
            (false, None) => write!(f, "{}", self.code),
            (true, Some(cause)) => write!(f, "{}", cause),
            (true, None) => f.write_str("unclassified error"),
        }
    }
}

impl StdError for StructuredError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Iterate `err` and every error below it in its source chain.
pub fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

/// First error of type `E` in the source chain of `err`, including `err`.
pub fn find<'a, E>(err: &'a (dyn StdError + 'static)) -> Option<&'a E>
where
    E: StdError + 'static,
{
    chain(err).find_map(|e| e.downcast_ref::<E>())
}

/// First [`StructuredError`] in the source chain of `err`.
pub fn find_structured<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a StructuredError> {
    find::<StructuredError>(err)
}

/// Whether any structured error in the chain of `err` carries `code`.
pub fn has_code(err: &(dyn StdError + 'static), code: &ErrorCode) -> bool {
    !code.is_empty()
        && chain(err)
            .filter_map(|e| e.downcast_ref::<StructuredError>())
            .any(|s| &s.code == code)
}

/// Wrap-chain identity.
///
/// Walks the source chain of `err`. A link matches when it is the very same
/// error instance as `target`, or when it is a [`StructuredError`] and the
/// first structured error in `target`'s own chain has the same non-empty
/// code. A structured link that does not match by code falls through to
/// its cause.
pub fn is(err: &(dyn StdError + 'static), target: &(dyn StdError + 'static)) -> bool {
    let target_structured = find_structured(target);

    chain(err).any(|link| {
        if same_instance(link, target) {
            return true;
        }
        match (link.downcast_ref::<StructuredError>(), target_structured) {
            (Some(structured), Some(wanted)) => structured.same_identity(wanted),
            _ => false,
        }
    })
}

fn same_instance(a: &(dyn StdError + 'static), b: &(dyn StdError + 'static)) -> bool {
    std::ptr::eq(
        a as *const dyn StdError as *const (),
        b as *const dyn StdError as *const (),
    )
}
