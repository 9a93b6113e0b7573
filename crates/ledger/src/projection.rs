//! Ledger projection: totals, running balances and search over one cash book.
//!
//! The projection is a pure function of an entry snapshot. It keeps no state
//! between snapshots and caches no partial sums: every delivery from the store
//! is projected from scratch, so edits and deletes arriving in any order can
//! never leave a drifted balance behind.
//!
//! ## Canonical order
//!
//! Newest first: descending `date`, then descending `created_at`, then
//! descending `id`. The sort is stable and total, so the same snapshot always
//! yields the same sequence.
//!
//! ## Running balance
//!
//! With entries ordered newest→oldest as e₁…eₙ:
//!
//! ```text
//! rb(e₁) = balance
//! rb(eₖ) = rb(eₖ₋₁) − effect(eₖ₋₁)      effect(e) = +amount (in) | −amount (out)
//! ```
//!
//! Each row therefore shows the balance immediately after that entry was applied.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::entry::{Entry, EntryType};

/// Total ordering used for display, export and running balances.
pub fn canonical_cmp(a: &Entry, b: &Entry) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Stable in-place sort into canonical (newest first) order.
pub fn sort_canonical(entries: &mut [Entry]) {
    entries.sort_by(canonical_cmp);
}

/// Aggregate totals over a whole cash book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub balance: Decimal,
}

impl Summary {
    pub fn of<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut summary = Summary::default();
        for entry in entries {
            match entry.entry_type {
                EntryType::In => summary.total_in += entry.amount,
                EntryType::Out => summary.total_out += entry.amount,
            }
        }
        summary.balance = summary.total_in - summary.total_out;
        summary
    }
}

/// An entry together with the ledger balance as of that entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    pub balance: Decimal,
}

/// Normalised remark search: trimmed and case-folded once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        Self {
            needle: raw.trim().to_lowercase(),
        }
    }

    /// An empty query matches everything.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, text: &str) -> bool {
        self.is_empty() || text.to_lowercase().contains(&self.needle)
    }
}

/// Full projection of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LedgerProjection {
    summary: Summary,
    rows: Vec<ProjectedEntry>,
}

impl LedgerProjection {
    /// Project an unordered snapshot.
    pub fn project(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut entries: Vec<Entry> = entries.into_iter().collect();
        sort_canonical(&mut entries);

        let summary = Summary::of(&entries);

        let mut running = summary.balance;
        let rows = entries
            .into_iter()
            .map(|entry| {
                let balance = running;
                running -= entry.effect();
                ProjectedEntry { entry, balance }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            rows = rows.len(),
            balance = %summary.balance,
            "ledger projection recomputed"
        );

        Self { summary, rows }
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// All rows in canonical order.
    pub fn rows(&self) -> &[ProjectedEntry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose remark contains `query` (case-insensitive), in canonical order.
    ///
    /// Runs after balance assignment: surviving rows keep their balances.
    pub fn filter<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> impl Iterator<Item = &'a ProjectedEntry> + 'a {
        self.rows.iter().filter(move |row| query.matches(&row.entry.remark))
    }

    /// Owned, serialisable filtered view (totals always cover the full book).
    pub fn view(&self, query: &str) -> LedgerView {
        let query = SearchQuery::new(query);
        LedgerView {
            summary: self.summary,
            query: query.as_str().to_string(),
            rows: self.filter(&query).cloned().collect(),
        }
    }
}

/// What read-only consumers (tables, exports, streams) receive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LedgerView {
    pub summary: Summary,
    pub query: String,
    pub rows: Vec<ProjectedEntry>,
}
