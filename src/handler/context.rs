//! Execution context for one chain run.
//!
//! A [`Context`] wraps the raw payload, a fresh [`Scratch`] space and a
//! cursor into the chain's handler list. Handlers move the run forward by
//! calling [`Context::next`]:
//!
//! ```ignore
//! fn audit(ctx: &mut Context<'_>) -> HandlerResult {
//!     let result = ctx.next();          // run everything downstream
//!     tracing::debug!(ok = result.is_ok(), "downstream finished");
//!     result                            // propagate (or transform)
//! }
//! ```
//!
//! A handler that returns without calling `next` ends the run there.

use bytes::Bytes;

use super::scratch::{Key, Scratch};
use super::{Handler, HandlerResult};
use crate::error::Result;

/// Per-run state handed to every handler of a chain.
///
/// A context is used by one run on one thread and dropped when the run
/// ends; nothing in it is shared with other runs.
pub struct Context<'a> {
    /// Raw payload, fixed for the run.
    payload: Bytes,
    /// Handlers of the chain being run.
    handlers: &'a [Box<dyn Handler>],
    /// Scratch values written and read by handlers.
    scratch: Scratch,
    /// Index of the next handler to invoke.
    cursor: usize,
}

impl<'a> Context<'a> {
    /// Create a context positioned before the first handler.
    pub fn new(payload: Bytes, handlers: &'a [Box<dyn Handler>]) -> Self {
        Self::with_scratch(payload, handlers, Scratch::new())
    }

    /// Create a context with pre-populated scratch.
    pub fn with_scratch(payload: Bytes, handlers: &'a [Box<dyn Handler>], scratch: Scratch) -> Self {
        Self {
            payload,
            handlers,
            scratch,
            cursor: 0,
        }
    }

    /// Invoke the next handler and return its result.
    ///
    /// The cursor moves before the handler runs, so a handler calling `next`
    /// reaches the one after it, never itself. Past the last handler this
    /// is a no-op success.
    pub fn next(&mut self) -> HandlerResult {
        let handlers = self.handlers;
        match handlers.get(self.cursor) {
            Some(handler) => {
                self.cursor += 1;
                handler.handle(self)
            }
            None => Ok(()),
        }
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload as `Bytes` (cheap clone).
    #[inline]
    pub fn payload_bytes(&self) -> &Bytes {
        &self.payload
    }

    /// Number of handlers invoked so far.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether every handler has been invoked.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.handlers.len()
    }

    pub fn set<T: Send + 'static>(&mut self, key: &Key<T>, value: T) {
        self.scratch.set(key, value);
    }

    /// Missing values and values of another type both read as `None`.
    pub fn get<T: 'static>(&self, key: &Key<T>) -> Option<&T> {
        self.scratch.get(key)
    }

    pub fn try_get<T: 'static>(&self, key: &Key<T>) -> Result<&T> {
        self.scratch.try_get(key)
    }

    pub fn take<T: 'static>(&mut self, key: &Key<T>) -> Option<T> {
        self.scratch.take(key)
    }

    pub fn try_take<T: 'static>(&mut self, key: &Key<T>) -> Result<T> {
        self.scratch.try_take(key)
    }

    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    pub fn scratch_mut(&mut self) -> &mut Scratch {
        &mut self.scratch
    }

    /// Consume the context, keeping its scratch (for transport adapters
    /// that read results back after the run).
    pub fn into_scratch(self) -> Scratch {
        self.scratch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;

    const SEEN: Key<Vec<usize>> = Key::new("seen");

    fn recording() -> Box<dyn Handler> {
        Box::new(handler_fn(|ctx: &mut Context<'_>| {
            let cursor = ctx.cursor();
            let mut seen = ctx.take(&SEEN).unwrap_or_default();
            seen.push(cursor);
            ctx.set(&SEEN, seen);
            ctx.next()
        }))
    }

    #[test]
    fn test_next_on_empty_chain_succeeds() {
        let handlers: Vec<Box<dyn Handler>> = Vec::new();
        let mut ctx = Context::new(Bytes::new(), &handlers);

        assert!(ctx.is_exhausted());
        assert!(ctx.next().is_ok());
        assert_eq!(ctx.cursor(), 0);
    }

    #[test]
    fn test_cursor_advances_before_invocation() {
        let handlers = vec![recording(), recording(), recording()];
        let mut ctx = Context::new(Bytes::new(), &handlers);

        ctx.next().unwrap();

        // Each handler saw the cursor already pointing past itself.
        assert_eq!(ctx.get(&SEEN), Some(&vec![1, 2, 3]));
        assert_eq!(ctx.cursor(), 3);
        assert!(ctx.is_exhausted());
    }

    #[test]
    fn test_next_after_exhaustion_is_noop() {
        let handlers = vec![recording()];
        let mut ctx = Context::new(Bytes::new(), &handlers);

        ctx.next().unwrap();
        ctx.next().unwrap();

        assert_eq!(ctx.get(&SEEN), Some(&vec![1]));
        assert_eq!(ctx.cursor(), 1);
    }

    #[test]
    fn test_payload_is_exposed() {
        let handlers: Vec<Box<dyn Handler>> = Vec::new();
        let ctx = Context::new(Bytes::from_static(b"hello"), &handlers);

        assert_eq!(ctx.payload(), b"hello");
        assert_eq!(ctx.payload_bytes().len(), 5);
    }

    #[test]
    fn test_seeded_scratch() {
        const ID: Key<String> = Key::new("id");
        let mut scratch = Scratch::new();
        scratch.set(&ID, "42".to_string());

        let handlers: Vec<Box<dyn Handler>> = Vec::new();
        let ctx = Context::with_scratch(Bytes::new(), &handlers, scratch);

        assert_eq!(ctx.get(&ID).map(String::as_str), Some("42"));
        assert_eq!(ctx.into_scratch().len(), 1);
    }
}
