//! Transport module - in-process message channel.
//!
//! ```text
//! Producer ─┐
//! Producer ─┼─► mpsc::Sender<Bytes> ─► Consumer::run ─► Chain::process (one run per payload)
//! Producer ─┘
//! ```
//!
//! Producers encode typed events in the configured [`WireFormat`](crate::codec::WireFormat)
//! and enqueue them without blocking. The consumer drives one chain run per
//! payload on its own task.

mod channel;

pub use channel::{channel, Closer, ConsumeStats, Consumer, Producer, Reservation};
