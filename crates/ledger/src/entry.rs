use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cashbook_core::{DomainError, DomainResult, EntryId, UserId};

use crate::CashBookRef;

/// Remark stored when the author leaves it blank.
pub const DEFAULT_REMARK: &str = "Cash";

/// Largest amount a single entry may carry (10^15).
///
/// At this cap a book needs roughly 7.9e13 entries before its totals could
/// leave `Decimal`'s range, so projections never overflow.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    In,
    Out,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::In => "in",
            EntryType::Out => "out",
        }
    }
}

/// One recorded cash movement in a cash book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Positive magnitude; direction comes from `entry_type`.
    pub amount: Decimal,
    pub date: NaiveDate,
    pub remark: String,
    /// Store-assigned; a tie-breaker only, never the primary ordering key.
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
}

impl Entry {
    /// Build a stored entry from a validated draft.
    pub fn from_draft(
        id: EntryId,
        draft: EntryDraft,
        created_at: DateTime<Utc>,
        created_by: UserId,
    ) -> Self {
        Self {
            id,
            entry_type: draft.entry_type,
            amount: draft.amount,
            date: draft.date,
            remark: draft.remark,
            created_at,
            created_by,
        }
    }

    /// Signed contribution of this entry to the ledger balance.
    pub fn effect(&self) -> Decimal {
        match self.entry_type {
            EntryType::In => self.amount,
            EntryType::Out => -self.amount,
        }
    }

    /// Overwrite the mutable fields. `created_at`/`created_by` never change.
    pub fn apply_draft(&mut self, draft: EntryDraft) {
        self.entry_type = draft.entry_type;
        self.amount = draft.amount;
        self.date = draft.date;
        self.remark = draft.remark;
    }
}

/// Author-supplied fields of an entry, used for both create and edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub remark: String,
}

impl EntryDraft {
    pub fn new(
        entry_type: EntryType,
        amount: Decimal,
        date: NaiveDate,
        remark: impl Into<String>,
    ) -> Self {
        Self {
            entry_type,
            amount,
            date,
            remark: remark.into(),
        }
    }

    /// Check the boundary invariants and normalise the remark.
    pub fn validated(mut self) -> DomainResult<Self> {
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::validation("amount must be positive"));
        }
        if self.amount > MAX_AMOUNT {
            return Err(DomainError::validation(format!(
                "amount must not exceed {MAX_AMOUNT}"
            )));
        }

        let trimmed = self.remark.trim();
        self.remark = if trimmed.is_empty() {
            DEFAULT_REMARK.to_string()
        } else {
            trimmed.to_string()
        };

        Ok(self)
    }
}

/// Address of one entry: its cash book plus its id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryRef {
    pub cashbook: CashBookRef,
    pub entry_id: EntryId,
}

impl EntryRef {
    pub fn new(cashbook: CashBookRef, entry_id: EntryId) -> Self {
        Self { cashbook, entry_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn blank_remark_defaults_to_cash() {
        let draft = EntryDraft::new(EntryType::In, Decimal::from(10), day(1), "   ")
            .validated()
            .unwrap();
        assert_eq!(draft.remark, DEFAULT_REMARK);
    }

    #[test]
    fn remark_is_trimmed() {
        let draft = EntryDraft::new(EntryType::Out, Decimal::new(1050, 2), day(1), "  rent ")
            .validated()
            .unwrap();
        assert_eq!(draft.remark, "rent");
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        for amount in [Decimal::ZERO, Decimal::from(-5)] {
            let err = EntryDraft::new(EntryType::In, amount, day(1), "x")
                .validated()
                .unwrap_err();
            assert_eq!(err, DomainError::validation("amount must be positive"));
        }
    }

    #[test]
    fn amounts_above_the_cap_are_rejected() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000_000i64));

        let at_cap = EntryDraft::new(EntryType::In, MAX_AMOUNT, day(1), "x").validated();
        assert!(at_cap.is_ok());

        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        for amount in [MAX_AMOUNT + Decimal::new(1, 2), huge] {
            let err = EntryDraft::new(EntryType::In, amount, day(1), "x")
                .validated()
                .unwrap_err();
            assert_eq!(
                err,
                DomainError::validation("amount must not exceed 1000000000000000")
            );
        }
    }

    #[test]
    fn update_keeps_creation_metadata() {
        let author = UserId::new();
        let created_at = Utc::now();
        let mut entry = Entry::from_draft(
            EntryId::new(),
            EntryDraft::new(EntryType::In, Decimal::from(5), day(1), "a"),
            created_at,
            author,
        );

        entry.apply_draft(EntryDraft::new(EntryType::Out, Decimal::from(7), day(2), "b"));

        assert_eq!(entry.entry_type, EntryType::Out);
        assert_eq!(entry.effect(), Decimal::from(-7));
        assert_eq!(entry.created_at, created_at);
        assert_eq!(entry.created_by, author);
    }

    #[test]
    fn serializes_type_field_and_iso_date() {
        let entry = Entry::from_draft(
            EntryId::new(),
            EntryDraft::new(EntryType::Out, Decimal::new(4000, 2), day(2), "tea"),
            Utc::now(),
            UserId::new(),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "out");
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["amount"], "40.00");
    }
}
