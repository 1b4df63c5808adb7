//! Handler module - ordered handler chains.
//!
//! Provides:
//! - [`Handler`] - one unit of behaviour in a chain
//! - [`Context`] - per-run payload, scratch space and cursor
//! - [`Chain`] / [`ChainBuilder`] - the immutable handler list and its runner
//! - [`Recover`] - turns structured failures into logged, swallowed outcomes
//! - [`Parse`] - decodes the payload into scratch
//!
//! # Example
//!
//! ```ignore
//! use msgchain::handler::{message_key, Chain, Parse, Recover};
//!
//! let chain = Chain::builder()
//!     .handler(Recover::new())
//!     .handler(Parse::<Record>::new())
//!     .handle_fn(|ctx| {
//!         let record = ctx.try_take(&message_key::<Record>())?;
//!         store.update(record)?;
//!         ctx.next()
//!     })
//!     .build();
//!
//! chain.process(payload)?;
//! ```

mod chain;
mod context;
mod parse;
mod recover;
mod scratch;

pub use chain::{handler_fn, Chain, ChainBuilder, FnHandler};
pub use context::Context;
pub use parse::{message_key, Parse, MESSAGE};
pub use recover::Recover;
pub use scratch::{Key, Scratch};

/// Result type for handlers.
///
/// Errors are carried as [`anyhow::Error`]; a
/// [`StructuredError`](crate::structured::StructuredError) anywhere in the
/// source chain marks a classified failure.
pub type HandlerResult = anyhow::Result<()>;

/// Trait for chain handlers.
///
/// A handler that wants the rest of the chain to run calls
/// [`Context::next`] itself and returns (or transforms) its result.
/// Returning without calling it ends the run at this handler.
///
/// Handlers are shared by every run of their chain and may be invoked from
/// several threads at once.
pub trait Handler: Send + Sync + 'static {
    /// Handle one step of a run.
    fn handle(&self, ctx: &mut Context<'_>) -> HandlerResult;
}
