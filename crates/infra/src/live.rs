//! Push-driven ledger view.
//!
//! Holds a snapshot subscription and replaces its projection wholesale on every
//! snapshot. There is no incremental state and no merging.

use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::time::Duration;

use cashbook_events::Subscription;
use cashbook_ledger::{LedgerProjection, LedgerView};

use crate::store::EntrySnapshot;

#[derive(Debug)]
pub struct LiveLedger {
    subscription: Subscription<EntrySnapshot>,
    projection: LedgerProjection,
    snapshots_seen: u64,
    closed: bool,
}

impl LiveLedger {
    pub fn new(subscription: Subscription<EntrySnapshot>) -> Self {
        Self {
            subscription,
            projection: LedgerProjection::default(),
            snapshots_seen: 0,
            closed: false,
        }
    }

    /// Apply the newest queued snapshot, if any. Returns whether the view changed.
    pub fn poll(&mut self) -> bool {
        match self.subscription.latest() {
            Ok(Some(snapshot)) => {
                self.apply(&snapshot);
                true
            }
            Ok(None) => false,
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                false
            }
        }
    }

    /// Block up to `timeout` for a snapshot, then catch up to the newest one.
    pub fn wait_next(&mut self, timeout: Duration) -> bool {
        match self.subscription.recv_timeout(timeout) {
            Ok(snapshot) => {
                self.apply(&snapshot);
                self.poll();
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                self.closed = true;
                false
            }
        }
    }

    fn apply(&mut self, snapshot: &EntrySnapshot) {
        self.projection = LedgerProjection::project(snapshot.iter().cloned());
        self.snapshots_seen += 1;
    }

    pub fn projection(&self) -> &LedgerProjection {
        &self.projection
    }

    pub fn view(&self, query: &str) -> LedgerView {
        self.projection.view(query)
    }

    pub fn snapshots_seen(&self) -> u64 {
        self.snapshots_seen
    }

    /// The cash book was deleted (or the store went away); no more snapshots will come.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
