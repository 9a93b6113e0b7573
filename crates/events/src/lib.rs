//! Snapshot delivery: topic-keyed push subscriptions.
//!
//! A topic (typically one cash book) carries complete replacement snapshots,
//! never deltas. Subscribers keep only what they need from the stream.

pub mod bus;
pub mod in_memory_bus;

pub use bus::{SnapshotBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemorySnapshotBus};
