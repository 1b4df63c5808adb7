//! Recovery handler: structured failures stop here.

use std::fmt;
use std::sync::Arc;

use anyhow::Context as _;

use super::{Context, Handler, HandlerResult};
use crate::structured::{find_structured, ErrorCodec};

type Reporter = Arc<dyn Fn(&str) + Send + Sync>;

/// Runs the rest of the chain and classifies what comes back.
///
/// - A [`StructuredError`](crate::structured::StructuredError) anywhere in
///   the returned error's chain is encoded to JSON, reported, and the run
///   succeeds.
/// - If encoding fails, the encoding failure propagates instead.
/// - Any other error propagates unchanged.
///
/// Place it first so it wraps every other handler.
#[derive(Clone)]
pub struct Recover {
    reporter: Reporter,
}

impl Recover {
    /// Report recovered errors through `tracing` at WARN.
    pub fn new() -> Self {
        Self::with_reporter(|json: &str| {
            tracing::warn!(error = %json, "recovered structured error");
        })
    }

    /// Report recovered errors through a custom sink.
    pub fn with_reporter<R>(reporter: R) -> Self
    where
        R: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            reporter: Arc::new(reporter),
        }
    }
}

impl Default for Recover {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Recover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recover").finish_non_exhaustive()
    }
}

impl Handler for Recover {
    fn handle(&self, ctx: &mut Context<'_>) -> HandlerResult {
        let err = match ctx.next() {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        let Some(structured) = find_structured(&*err) else {
            return Err(err);
        };

        let json = ErrorCodec::encode_string(structured)
            .context("error encoding structured error")?;
        (self.reporter)(&json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::handler::Chain;
    use crate::structured::StructuredError;
    use bytes::Bytes;
    use parking_lot::Mutex;

    fn capture() -> (Recover, Arc<Mutex<Vec<String>>>) {
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = reported.clone();
        let recover = Recover::with_reporter(move |json| sink.lock().push(json.to_string()));
        (recover, reported)
    }

    #[test]
    fn test_success_passes_through() {
        let (recover, reported) = capture();
        let chain = Chain::builder()
            .handler(recover)
            .handle_fn(|ctx| ctx.next())
            .build();

        assert!(chain.process(Bytes::new()).is_ok());
        assert!(reported.lock().is_empty());
    }

    #[test]
    fn test_structured_error_is_reported_and_swallowed() {
        let (recover, reported) = capture();
        let chain = Chain::builder()
            .handler(recover)
            .handle_fn(|_ctx| Err(StructuredError::new("missing").with_code("NOT_FOUND").into()))
            .build();

        assert!(chain.process(Bytes::new()).is_ok());
        assert_eq!(
            *reported.lock(),
            vec![r#"{"error":"missing","code":"NOT_FOUND"}"#.to_string()]
        );
    }

    #[test]
    fn test_structured_error_found_under_context() {
        let (recover, reported) = capture();
        let chain = Chain::builder()
            .handler(recover)
            .handle_fn(|_ctx| {
                Err(anyhow::Error::new(StructuredError::new("id already exists").with_code("dup"))
                    .context("error adding record"))
            })
            .build();

        assert!(chain.process(Bytes::new()).is_ok());
        assert_eq!(
            *reported.lock(),
            vec![r#"{"error":"id already exists","code":"dup"}"#.to_string()]
        );
    }

    #[test]
    fn test_plain_error_propagates_unchanged() {
        let (recover, reported) = capture();
        let chain = Chain::builder()
            .handler(recover)
            .handle_fn(|_ctx| Err(std::io::Error::other("boom").into()))
            .build();

        let err = chain.process(Bytes::new()).unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert!(err.downcast_ref::<std::io::Error>().is_some());
        assert!(reported.lock().is_empty());
    }

    #[test]
    fn test_unencodable_structured_error_propagates() {
        let (recover, reported) = capture();
        let chain = Chain::builder()
            .handler(recover)
            .handle_fn(|_ctx| Err(StructuredError::identity("NOT_FOUND").into()))
            .build();

        let err = chain.process(Bytes::new()).unwrap_err();

        assert_eq!(err.to_string(), "error encoding structured error");
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::MissingCause)));
        assert!(reported.lock().is_empty());
    }
}
