//! Infrastructure layer: storage boundary, application service, live views.

pub mod live;
pub mod service;
pub mod store;


pub use live::LiveLedger;
pub use service::{CashBookService, ServiceError, ServiceResult};
pub use store::{CashBookStore, EntrySnapshot, InMemoryCashBookStore, StoreError, StoreResult};
