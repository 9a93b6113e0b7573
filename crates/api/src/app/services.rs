use std::sync::Arc;
use std::time::Duration;

use cashbook_infra::{CashBookService, CashBookStore, InMemoryCashBookStore};

pub type SharedStore = Arc<dyn CashBookStore>;

/// Everything handlers need, shared behind an `Arc` extension.
pub struct AppServices {
    pub cashbooks: CashBookService<SharedStore>,
    /// Blocking wait per iteration of a ledger stream.
    pub stream_poll: Duration,
}

impl AppServices {
    pub fn new(store: SharedStore, stream_poll: Duration) -> Self {
        Self {
            cashbooks: CashBookService::new(store),
            stream_poll,
        }
    }

    pub fn in_memory(stream_poll: Duration) -> Self {
        Self::new(Arc::new(InMemoryCashBookStore::new()), stream_poll)
    }
}
