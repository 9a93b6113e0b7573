use std::sync::Arc;

use thiserror::Error;

use cashbook_core::{BusinessId, UserId};
use cashbook_events::Subscription;
use cashbook_ledger::{
    Business, CashBook, CashBookRef, Entry, EntryDraft, EntryRef, Member, UserProfile,
};

/// Full replacement set of a cash book's entries, as pushed to subscribers.
///
/// Order is unspecified; consumers re-project and sort.
pub type EntrySnapshot = Arc<Vec<Entry>>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        StoreError::Conflict(what.into())
    }
}

/// Document-store boundary for businesses, members, cash books and entries.
///
/// The store performs no authorization; callers go through the permission
/// gate first. Writes are last-write-wins.
///
/// Entry mutations push a fresh [`EntrySnapshot`] to every subscriber of the
/// affected cash book, in mutation order.
pub trait CashBookStore: Send + Sync {
    /// Register a profile. Emails are unique (already normalised by the caller).
    fn insert_user(&self, user: UserProfile) -> StoreResult<()>;
    fn get_user(&self, user_id: UserId) -> StoreResult<UserProfile>;
    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>>;

    /// Create a business together with its founding member record.
    fn insert_business(&self, business: Business, owner: Member) -> StoreResult<()>;
    fn get_business(&self, business_id: BusinessId) -> StoreResult<Business>;
    /// Businesses whose `members` array contains `user_id`.
    fn list_businesses_for(&self, user_id: UserId) -> StoreResult<Vec<Business>>;

    fn get_member(&self, business_id: BusinessId, user_id: UserId) -> StoreResult<Option<Member>>;
    fn list_members(&self, business_id: BusinessId) -> StoreResult<Vec<Member>>;
    /// Insert or replace a member record and keep the business `members` array in step.
    fn put_member(&self, business_id: BusinessId, member: Member) -> StoreResult<()>;
    /// Remove the member record and the id from the business `members` array.
    fn remove_member(&self, business_id: BusinessId, user_id: UserId) -> StoreResult<()>;

    fn insert_cashbook(&self, cashbook: CashBook) -> StoreResult<()>;
    fn get_cashbook(&self, cashbook: CashBookRef) -> StoreResult<CashBook>;
    fn list_cashbooks(&self, business_id: BusinessId) -> StoreResult<Vec<CashBook>>;
    /// Delete the cash book record only. Child entries are the caller's concern.
    fn delete_cashbook(&self, cashbook: CashBookRef) -> StoreResult<()>;

    /// Persist a new entry; the store assigns its id and server timestamp.
    fn insert_entry(
        &self,
        cashbook: CashBookRef,
        draft: EntryDraft,
        created_by: UserId,
    ) -> StoreResult<Entry>;
    fn update_entry(&self, entry: EntryRef, draft: EntryDraft) -> StoreResult<Entry>;
    fn delete_entry(&self, entry: EntryRef) -> StoreResult<()>;
    fn list_entries(&self, cashbook: CashBookRef) -> StoreResult<Vec<Entry>>;

    /// Subscribe to entry snapshots. The current snapshot is delivered first.
    fn subscribe_entries(&self, cashbook: CashBookRef) -> StoreResult<Subscription<EntrySnapshot>>;
}

impl<S> CashBookStore for Arc<S>
where
    S: CashBookStore + ?Sized,
{
    fn insert_user(&self, user: UserProfile) -> StoreResult<()> {
        (**self).insert_user(user)
    }

    fn get_user(&self, user_id: UserId) -> StoreResult<UserProfile> {
        (**self).get_user(user_id)
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>> {
        (**self).find_user_by_email(email)
    }

    fn insert_business(&self, business: Business, owner: Member) -> StoreResult<()> {
        (**self).insert_business(business, owner)
    }

    fn get_business(&self, business_id: BusinessId) -> StoreResult<Business> {
        (**self).get_business(business_id)
    }

    fn list_businesses_for(&self, user_id: UserId) -> StoreResult<Vec<Business>> {
        (**self).list_businesses_for(user_id)
    }

    fn get_member(&self, business_id: BusinessId, user_id: UserId) -> StoreResult<Option<Member>> {
        (**self).get_member(business_id, user_id)
    }

    fn list_members(&self, business_id: BusinessId) -> StoreResult<Vec<Member>> {
        (**self).list_members(business_id)
    }

    fn put_member(&self, business_id: BusinessId, member: Member) -> StoreResult<()> {
        (**self).put_member(business_id, member)
    }

    fn remove_member(&self, business_id: BusinessId, user_id: UserId) -> StoreResult<()> {
        (**self).remove_member(business_id, user_id)
    }

    fn insert_cashbook(&self, cashbook: CashBook) -> StoreResult<()> {
        (**self).insert_cashbook(cashbook)
    }

    fn get_cashbook(&self, cashbook: CashBookRef) -> StoreResult<CashBook> {
        (**self).get_cashbook(cashbook)
    }

    fn list_cashbooks(&self, business_id: BusinessId) -> StoreResult<Vec<CashBook>> {
        (**self).list_cashbooks(business_id)
    }

    fn delete_cashbook(&self, cashbook: CashBookRef) -> StoreResult<()> {
        (**self).delete_cashbook(cashbook)
    }

    fn insert_entry(
        &self,
        cashbook: CashBookRef,
        draft: EntryDraft,
        created_by: UserId,
    ) -> StoreResult<Entry> {
        (**self).insert_entry(cashbook, draft, created_by)
    }

    fn update_entry(&self, entry: EntryRef, draft: EntryDraft) -> StoreResult<Entry> {
        (**self).update_entry(entry, draft)
    }

    fn delete_entry(&self, entry: EntryRef) -> StoreResult<()> {
        (**self).delete_entry(entry)
    }

    fn list_entries(&self, cashbook: CashBookRef) -> StoreResult<Vec<Entry>> {
        (**self).list_entries(cashbook)
    }

    fn subscribe_entries(&self, cashbook: CashBookRef) -> StoreResult<Subscription<EntrySnapshot>> {
        (**self).subscribe_entries(cashbook)
    }
}
