//! `cashbook-core`: identifiers and the validation error shared by every crate.
//!
//! Nothing in here touches storage, transport or time zones.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{BusinessId, CashBookId, EntryId, UserId};
