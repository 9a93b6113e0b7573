//! Cash book ledger: domain records and the ledger projection engine.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod book;
pub mod entry;
pub mod projection;

pub use book::{
    Business, CashBook, CashBookRef, Member, UserProfile, normalize_email, normalize_name,
};
pub use entry::{DEFAULT_REMARK, Entry, EntryDraft, EntryRef, EntryType, MAX_AMOUNT};
pub use projection::{
    LedgerProjection, LedgerView, ProjectedEntry, SearchQuery, Summary, canonical_cmp,
    sort_canonical,
};
