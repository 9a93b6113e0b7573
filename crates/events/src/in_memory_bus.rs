//! In-memory snapshot bus for tests/dev.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, Weak, mpsc};

use thiserror::Error;

use crate::bus::{SnapshotBus, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("snapshot bus lock poisoned")]
    Poisoned,
}

#[derive(Debug)]
struct Registry<K, M> {
    next_id: u64,
    topics: HashMap<K, Vec<(u64, mpsc::Sender<M>)>>,
}

impl<K, M> Default for Registry<K, M> {
    fn default() -> Self {
        Self {
            next_id: 0,
            topics: HashMap::new(),
        }
    }
}

/// In-memory pub/sub bus keyed by topic.
///
/// - No IO / no async
/// - Fan-out per topic; dead receivers are pruned while publishing
/// - Dropped subscriptions unregister themselves
#[derive(Debug)]
pub struct InMemorySnapshotBus<K, M> {
    registry: Arc<Mutex<Registry<K, M>>>,
}

impl<K, M> InMemorySnapshotBus<K, M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, M> Default for InMemorySnapshotBus<K, M> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }
}

impl<K, M> InMemorySnapshotBus<K, M>
where
    K: Clone + Eq + Hash + Send + 'static,
    M: Send + 'static,
{
    fn register(&self, topic: K, seed: Option<M>) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        if let Some(seed) = seed {
            // The receiver is alive, so this cannot fail.
            let _ = tx.send(seed);
        }

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive anything past the seed.
        let id = match self.registry.lock() {
            Ok(mut reg) => {
                let id = reg.next_id;
                reg.next_id += 1;
                reg.topics.entry(topic.clone()).or_default().push((id, tx));
                id
            }
            Err(_) => {
                tracing::warn!("snapshot bus poisoned; subscription will not receive updates");
                return Subscription::new(rx);
            }
        };

        let registry: Weak<Mutex<Registry<K, M>>> = Arc::downgrade(&self.registry);
        Subscription::with_unsubscribe(rx, move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            if let Ok(mut reg) = registry.lock() {
                if let Some(subs) = reg.topics.get_mut(&topic) {
                    subs.retain(|(sub_id, _)| *sub_id != id);
                    if subs.is_empty() {
                        reg.topics.remove(&topic);
                    }
                }
            }
        })
    }
}

impl<K, M> SnapshotBus<K, M> for InMemorySnapshotBus<K, M>
where
    K: Clone + Eq + Hash + Send + 'static,
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, topic: &K, message: M) -> Result<usize, Self::Error> {
        let mut reg = self.registry.lock().map_err(|_| InMemoryBusError::Poisoned)?;

        let Some(subs) = reg.topics.get_mut(topic) else {
            return Ok(0);
        };

        // Drop any dead subscribers while publishing.
        subs.retain(|(_, tx)| tx.send(message.clone()).is_ok());
        let delivered = subs.len();
        if subs.is_empty() {
            reg.topics.remove(topic);
        }

        Ok(delivered)
    }

    fn subscribe(&self, topic: K) -> Subscription<M> {
        self.register(topic, None)
    }

    fn subscribe_seeded(&self, topic: K, seed: M) -> Subscription<M> {
        self.register(topic, Some(seed))
    }

    fn close(&self, topic: &K) {
        if let Ok(mut reg) = self.registry.lock() {
            reg.topics.remove(topic);
        }
    }

    fn subscriber_count(&self, topic: &K) -> usize {
        self.registry
            .lock()
            .map(|reg| reg.topics.get(topic).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::TryRecvError;

    use super::*;

    #[test]
    fn publishes_only_to_matching_topic() {
        let bus: InMemorySnapshotBus<&'static str, u32> = InMemorySnapshotBus::new();
        let a = bus.subscribe("a");
        let b = bus.subscribe("b");

        assert_eq!(bus.publish(&"a", 1).unwrap(), 1);

        assert_eq!(a.try_recv().unwrap(), 1);
        assert!(matches!(b.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn seed_arrives_before_later_publishes() {
        let bus: InMemorySnapshotBus<u8, &'static str> = InMemorySnapshotBus::new();
        let sub = bus.subscribe_seeded(7, "seed");
        bus.publish(&7, "next").unwrap();

        assert_eq!(sub.recv().unwrap(), "seed");
        assert_eq!(sub.recv().unwrap(), "next");
    }

    #[test]
    fn dropping_subscription_unregisters_it() {
        let bus: InMemorySnapshotBus<u8, u8> = InMemorySnapshotBus::new();
        let first = bus.subscribe(1);
        let second = bus.subscribe(1);
        assert_eq!(bus.subscriber_count(&1), 2);

        drop(first);
        assert_eq!(bus.subscriber_count(&1), 1);

        drop(second);
        assert_eq!(bus.subscriber_count(&1), 0);
        assert_eq!(bus.publish(&1, 9).unwrap(), 0);
    }

    #[test]
    fn close_disconnects_subscribers() {
        let bus: InMemorySnapshotBus<u8, u8> = InMemorySnapshotBus::new();
        let sub = bus.subscribe_seeded(3, 0);
        bus.close(&3);

        assert_eq!(sub.recv().unwrap(), 0);
        assert!(sub.recv().is_err());
    }

    #[test]
    fn latest_skips_stale_snapshots() {
        let bus: InMemorySnapshotBus<u8, u32> = InMemorySnapshotBus::new();
        let sub = bus.subscribe(0);
        for n in 1..=5 {
            bus.publish(&0, n).unwrap();
        }

        assert_eq!(sub.latest().unwrap(), Some(5));
        assert_eq!(sub.latest().unwrap(), None);

        bus.close(&0);
        assert!(matches!(sub.latest(), Err(TryRecvError::Disconnected)));
    }

    #[test]
    fn subscription_outliving_bus_drops_cleanly() {
        let bus: InMemorySnapshotBus<u8, u8> = InMemorySnapshotBus::new();
        let sub = bus.subscribe(1);
        drop(bus);
        assert!(sub.recv().is_err());
        drop(sub);
    }
}
