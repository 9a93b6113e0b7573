use core::str::FromStr;

use axum::http::StatusCode;

use cashbook_core::{BusinessId, CashBookId, DomainError, EntryId};
use cashbook_ledger::{CashBookRef, EntryRef};

use crate::app::errors;

/// Parse a path segment into a typed id, answering `400` on garbage.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

pub fn cashbook_ref(
    business_id: &str,
    cashbook_id: &str,
) -> Result<CashBookRef, axum::response::Response> {
    Ok(CashBookRef::new(
        parse_id::<BusinessId>(business_id)?,
        parse_id::<CashBookId>(cashbook_id)?,
    ))
}

pub fn entry_ref(
    business_id: &str,
    cashbook_id: &str,
    entry_id: &str,
) -> Result<EntryRef, axum::response::Response> {
    Ok(EntryRef::new(
        cashbook_ref(business_id, cashbook_id)?,
        parse_id::<EntryId>(entry_id)?,
    ))
}
