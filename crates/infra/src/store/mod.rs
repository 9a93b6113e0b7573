//! Cash book storage boundary.
//!
//! Defines the document-store abstraction the service layer talks to, plus an
//! in-memory implementation that pushes entry snapshots over a snapshot bus.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryCashBookStore;
pub use r#trait::{CashBookStore, EntrySnapshot, StoreError, StoreResult};
