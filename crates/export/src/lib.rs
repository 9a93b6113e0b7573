//! Export renders for a projected cash book.
//!
//! Both renders take the filtered rows plus the whole-book summary
//! ([`cashbook_ledger::LedgerView`]) and share one currency convention:
//! `en-IN` / `INR`, i.e. `₹1,23,456.78`.

pub mod currency;
pub mod error;
pub mod report;

pub use currency::{format_date, format_inr};
pub use error::{ExportError, ExportResult};
pub use report::{export_file_name, render_csv, render_document};
