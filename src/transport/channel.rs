//! Bounded channel between producers and the consumer loop.
//!
//! # Example
//!
//! ```ignore
//! use msgchain::transport::channel;
//! use msgchain::codec::WireFormat;
//!
//! let (producer, consumer) = channel::<Record>(1024, WireFormat::Json);
//! let closer = consumer.closer();
//!
//! let worker = tokio::spawn(async move { consumer.run(&chain).await });
//!
//! producer.send(&record)?;
//!
//! // Shutdown: stop accepting, drain, then collect stats.
//! producer.close();
//! closer.close();
//! let stats = worker.await?;
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::codec::WireFormat;
use crate::error::{Error, Result};
use crate::handler::Chain;

/// Create a bounded channel carrying `T` events encoded as `format`.
pub fn channel<T>(capacity: usize, format: WireFormat) -> (Producer<T>, Consumer) {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let producer = Producer {
        tx: Arc::new(Mutex::new(Some(tx))),
        format,
        _phantom: PhantomData,
    };
    let consumer = Consumer {
        rx,
        shutdown: CancellationToken::new(),
    };

    (producer, consumer)
}

/// Send side of the channel.
///
/// Cheap to clone; all clones share one sender, so [`close`](Producer::close)
/// closes the channel for every clone.
pub struct Producer<T> {
    tx: Arc<Mutex<Option<mpsc::Sender<Bytes>>>>,
    format: WireFormat,
    _phantom: PhantomData<fn(&T)>,
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            format: self.format,
            _phantom: PhantomData,
        }
    }
}

impl<T: Serialize> Producer<T> {
    /// Encode and enqueue an event without waiting.
    ///
    /// # Errors
    ///
    /// - codec errors if the event cannot be encoded
    /// - [`Error::ChannelFull`] when the channel is at capacity
    /// - [`Error::ChannelClosed`] after [`close`](Producer::close) or once
    ///   the consumer is gone
    pub fn send(&self, event: &T) -> Result<()> {
        let payload = Bytes::from(self.format.encode(event)?);
        self.send_raw(payload)
    }
}

impl<T> Producer<T> {
    /// Enqueue an already-encoded payload.
    pub fn send_raw(&self, payload: Bytes) -> Result<()> {
        let guard = self.tx.lock();
        let tx = guard.as_ref().ok_or(Error::ChannelClosed)?;

        tx.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => Error::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => Error::ChannelClosed,
        })
    }

    /// Claim one slot in the channel without sending yet.
    ///
    /// The slot is held until the [`Reservation`] is used or dropped, so a
    /// caller can do other fallible work between reserving and sending and
    /// still be sure the send cannot fail for lack of space.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelFull`] or [`Error::ChannelClosed`], as for
    /// [`send_raw`](Producer::send_raw).
    pub fn reserve(&self) -> Result<Reservation<T>> {
        let tx = self.tx.lock().clone().ok_or(Error::ChannelClosed)?;

        let permit = tx.try_reserve_owned().map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => Error::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => Error::ChannelClosed,
        })?;

        Ok(Reservation {
            permit,
            _phantom: PhantomData,
        })
    }

    /// Close the send side. Safe to call more than once.
    pub fn close(&self) {
        if self.tx.lock().take().is_some() {
            tracing::debug!("producer closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        match self.tx.lock().as_ref() {
            Some(tx) => tx.is_closed(),
            None => true,
        }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("format", &self.format)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// One reserved slot in the channel. See [`Producer::reserve`].
///
/// Dropping it unused gives the slot back.
pub struct Reservation<T> {
    permit: mpsc::OwnedPermit<Bytes>,
    _phantom: PhantomData<fn(&T)>,
}

impl<T> Reservation<T> {
    /// Enqueue an already-encoded payload into the reserved slot.
    pub fn send_raw(self, payload: Bytes) {
        self.permit.send(payload);
    }
}

impl<T> fmt::Debug for Reservation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reservation").finish_non_exhaustive()
    }
}

/// Handle that stops a running [`Consumer`].
#[derive(Debug, Clone)]
pub struct Closer {
    token: CancellationToken,
}

impl Closer {
    /// Stop accepting new payloads. Already queued payloads are still
    /// processed. Safe to call more than once.
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Outcome counts of a consumer loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumeStats {
    /// Runs that ended in success (including recovered structured errors).
    pub processed: u64,
    /// Runs that ended in a propagated error.
    pub failed: u64,
}

impl ConsumeStats {
    pub fn total(&self) -> u64 {
        self.processed + self.failed
    }
}

/// Receive side of the channel.
pub struct Consumer {
    rx: mpsc::Receiver<Bytes>,
    shutdown: CancellationToken,
}

impl Consumer {
    /// Handle for stopping [`run`](Consumer::run) from elsewhere.
    pub fn closer(&self) -> Closer {
        Closer {
            token: self.shutdown.clone(),
        }
    }

    /// Receive the next payload, or `None` once the channel is closed and
    /// empty.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Drive `chain` once per payload until the channel is closed and
    /// drained.
    ///
    /// A run that ends in error (a panicking handler included) is logged
    /// and counted; it does not stop the loop. The loop ends when a [`Closer`] fires (after draining what is
    /// already queued) or when every producer has closed.
    pub async fn run(mut self, chain: &Chain) -> ConsumeStats {
        let mut stats = ConsumeStats::default();
        let mut draining = false;

        loop {
            let payload = tokio::select! {
                biased;
                _ = self.shutdown.cancelled(), if !draining => {
                    tracing::debug!("consumer closing, draining queued messages");
                    self.rx.close();
                    draining = true;
                    continue;
                }
                payload = self.rx.recv() => match payload {
                    Some(payload) => payload,
                    None => break,
                },
            };

            match chain.process(payload) {
                Ok(()) => stats.processed += 1,
                Err(e) => {
                    stats.failed += 1;
                    tracing::error!("message processing failed: {:#}", e);
                }
            }
        }

        tracing::info!(
            processed = stats.processed,
            failed = stats.failed,
            "consumer stopped"
        );
        stats
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("closed", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}
