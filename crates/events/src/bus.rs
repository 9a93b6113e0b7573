//! Snapshot publishing/subscription abstraction (mechanics only).
//!
//! Each topic carries **complete snapshots**: a message replaces everything a
//! subscriber knew about the topic, so a slow consumer may skip straight to the
//! newest message without losing information.
//!
//! ## Teardown
//!
//! Dropping a [`Subscription`] unregisters it from the bus immediately. Owners
//! of a subscription (views, SSE handlers, workers) therefore cannot leak
//! listeners: tearing down the owner is the unsubscribe.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

type Unsubscribe = Box<dyn FnOnce() + Send>;

/// A live subscription to one topic.
///
/// ## Usage Pattern
///
/// ```ignore
/// let subscription = bus.subscribe(topic);
///
/// loop {
///     match subscription.recv_timeout(Duration::from_secs(1)) {
///         Ok(snapshot) => replace_view(snapshot),
///         Err(RecvTimeoutError::Timeout) => continue,       // check for shutdown
///         Err(RecvTimeoutError::Disconnected) => break,     // topic closed
///     }
/// }
/// ```
///
/// Subscriptions are designed for single-threaded consumption.
pub struct Subscription<M> {
    receiver: Receiver<M>,
    unsubscribe: Option<Unsubscribe>,
}

impl<M> Subscription<M> {
    /// A subscription with no registry to notify on drop.
    pub fn new(receiver: Receiver<M>) -> Self {
        Self {
            receiver,
            unsubscribe: None,
        }
    }

    /// A subscription that runs `unsubscribe` exactly once when dropped.
    pub fn with_unsubscribe(
        receiver: Receiver<M>,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything queued and return only the newest message.
    ///
    /// Returns `Err(Disconnected)` once the topic is closed *and* nothing is queued.
    pub fn latest(&self) -> Result<Option<M>, TryRecvError> {
        let mut newest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(m) => newest = Some(m),
                Err(TryRecvError::Empty) => return Ok(newest),
                Err(TryRecvError::Disconnected) => {
                    return match newest {
                        Some(m) => Ok(Some(m)),
                        None => Err(TryRecvError::Disconnected),
                    };
                }
            }
        }
    }
}

impl<M> core::fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("registered", &self.unsubscribe.is_some())
            .finish()
    }
}

impl<M> Drop for Subscription<M> {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// Topic-keyed snapshot bus (pub/sub abstraction).
///
/// ```text
/// Store mutation → publish(topic, full snapshot) → Subscriptions on topic
///                                                     ├─ live ledger views
///                                                     └─ SSE streams
/// ```
///
/// ## Delivery Guarantees
///
/// - Per-topic FIFO for a single publisher.
/// - Every message is a full replacement; nothing needs to be replayed.
/// - No persistence: the store is the source of truth.
pub trait SnapshotBus<K, M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// Deliver `message` to every live subscriber of `topic`; returns how many received it.
    fn publish(&self, topic: &K, message: M) -> Result<usize, Self::Error>;

    /// Subscribe to future messages on `topic`.
    fn subscribe(&self, topic: K) -> Subscription<M>;

    /// Subscribe and queue `seed` as the first message, ahead of anything published later.
    fn subscribe_seeded(&self, topic: K, seed: M) -> Subscription<M>;

    /// Disconnect every subscriber of `topic`.
    fn close(&self, topic: &K);

    fn subscriber_count(&self, topic: &K) -> usize;
}

impl<K, M, B> SnapshotBus<K, M> for Arc<B>
where
    B: SnapshotBus<K, M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, topic: &K, message: M) -> Result<usize, Self::Error> {
        (**self).publish(topic, message)
    }

    fn subscribe(&self, topic: K) -> Subscription<M> {
        (**self).subscribe(topic)
    }

    fn subscribe_seeded(&self, topic: K, seed: M) -> Subscription<M> {
        (**self).subscribe_seeded(topic, seed)
    }

    fn close(&self, topic: &K) {
        (**self).close(topic)
    }

    fn subscriber_count(&self, topic: &K) -> usize {
        (**self).subscriber_count(topic)
    }
}
