//! Chain construction and the per-payload run.
//!
//! # Example
//!
//! ```ignore
//! use msgchain::handler::{Chain, Parse, Recover};
//!
//! let chain = Chain::builder()
//!     .handler(Recover::new())
//!     .handler(Parse::<Record>::new())
//!     .handle_fn(move |ctx| process_record(ctx, &store))
//!     .build();
//!
//! // One fresh context per payload; the chain itself is shared.
//! chain.process(payload)?;
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;

use super::scratch::Scratch;
use super::{Context, Handler, HandlerResult};
use crate::error::Error;

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Handler built from a closure. See [`handler_fn`].
pub struct FnHandler<F> {
    f: F,
}

/// Turn a closure into a [`Handler`].
///
/// The bound here is what lets closures passed inline infer the
/// higher-ranked `&mut Context<'_>` signature.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
{
    FnHandler { f }
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut Context<'_>) -> HandlerResult {
        (self.f)(ctx)
    }
}

/// Immutable, ordered list of handlers.
///
/// Built once and shared (cloning is cheap); every call to
/// [`process`](Chain::process) gets its own [`Context`], so concurrent runs
/// never see each other's cursor or scratch.
#[derive(Clone)]
pub struct Chain {
    handlers: Arc<[Box<dyn Handler>]>,
}

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self {
            handlers: Arc::from(handlers),
        }
    }

    /// Run the chain once over `payload`.
    ///
    /// The result is whatever surfaces from the first handler's invocation:
    /// the final outcome of this unit of work.
    pub fn process(&self, payload: impl Into<Bytes>) -> HandlerResult {
        self.process_with(payload, |_| {}).0
    }

    /// Run the chain with scratch seeded by `seed`, returning the outcome
    /// together with the scratch as the handlers left it.
    ///
    /// A panic in any handler ends the run with [`Error::Panicked`]; it
    /// unwinds past every handler still on the stack, `Recover` included.
    pub fn process_with<S>(&self, payload: impl Into<Bytes>, seed: S) -> (HandlerResult, Scratch)
    where
        S: FnOnce(&mut Scratch),
    {
        let mut scratch = Scratch::new();
        seed(&mut scratch);

        let mut ctx = Context::with_scratch(payload.into(), &self.handlers, scratch);
        let result = panic::catch_unwind(AssertUnwindSafe(|| ctx.next())).unwrap_or_else(|panic| {
            let message = panic_message(&*panic);
            tracing::error!(cursor = ctx.cursor(), "handler panicked: {}", message);
            Err(Error::Panicked(message).into())
        });
        tracing::trace!(
            handlers = self.handlers.len(),
            reached = ctx.cursor(),
            ok = result.is_ok(),
            "chain run finished"
        );
        (result, ctx.into_scratch())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Fluent builder for [`Chain`]. Handlers run in insertion order.
#[derive(Default)]
pub struct ChainBuilder {
    handlers: Vec<Box<dyn Handler>>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler.
    pub fn handler<H: Handler>(mut self, handler: H) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Append a closure handler.
    pub fn handle_fn<F>(self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler(handler_fn(f))
    }

    pub fn build(self) -> Chain {
        Chain::new(self.handlers)
    }
}
