//! Application service for the cash book workflows.
//!
//! Every mutation follows the same pipeline:
//!
//! ```text
//! request
//!   ↓
//! 1. Validate input (pure; nothing touched yet)
//!   ↓
//! 2. Resolve the caller's member record into a Principal
//!   ↓
//! 3. Consult the permission gate
//!   ↓
//! 4. Mutate the store (which pushes a fresh snapshot to subscribers)
//! ```
//!
//! The service never updates views itself; consumers see changes only through
//! the next pushed snapshot.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use cashbook_auth::{
    AuthzError, MemberChange, Operation, Principal, Role, authorize_member_change, explain,
};
use cashbook_core::{BusinessId, CashBookId, DomainError, EntryId, UserId};
use cashbook_events::Subscription;
use cashbook_ledger::{
    Business, CashBook, CashBookRef, EntryDraft, EntryRef, LedgerProjection, LedgerView, Member,
    SearchQuery, UserProfile, normalize_email, normalize_name,
};

use crate::store::{CashBookStore, EntrySnapshot, StoreError};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before the store was touched.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The permission gate refused the operation.
    #[error(transparent)]
    Forbidden(AuthzError),

    #[error("user {user_id} is not a member of business {business_id}")]
    NotMember {
        user_id: UserId,
        business_id: BusinessId,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store failure: {0}")]
    Store(StoreError),

    /// Cascade delete stopped partway. Entries already removed stay removed.
    #[error("cascade delete of {cashbook} stopped after {deleted_entries} entries: {source}")]
    CascadeIncomplete {
        cashbook: CashBookRef,
        deleted_entries: usize,
        source: StoreError,
    },
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Store(other),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                ServiceError::Validation(msg)
            }
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::UnknownRole(role) => {
                ServiceError::Validation(format!("unknown role '{role}'"))
            }
            other => ServiceError::Forbidden(other),
        }
    }
}

/// Orchestrates the permission gate, the ledger model and the store.
///
/// ## Generic Parameters
///
/// - `S`: store implementation (`InMemoryCashBookStore`, `Arc<dyn CashBookStore>`, ...)
#[derive(Debug, Clone)]
pub struct CashBookService<S> {
    store: S,
}

impl<S> CashBookService<S>
where
    S: CashBookStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────
    // Identity and gate helpers
    // ─────────────────────────────────────────────────────────────────────

    /// Resolve `actor`'s role in `business_id`.
    pub fn principal(&self, actor: UserId, business_id: BusinessId) -> ServiceResult<Principal> {
        // Surfaces NotFound for unknown businesses.
        self.store.get_business(business_id)?;

        match self.store.get_member(business_id, actor)? {
            Some(member) => Ok(Principal::new(actor, business_id, member.role)),
            None => {
                warn!(user_id = %actor, business_id = %business_id, "caller is not a member");
                Err(ServiceError::NotMember {
                    user_id: actor,
                    business_id,
                })
            }
        }
    }

    fn authorized(
        &self,
        actor: UserId,
        business_id: BusinessId,
        operation: Operation,
    ) -> ServiceResult<Principal> {
        let principal = self.principal(actor, business_id)?;
        principal
            .authorize(operation)
            .map_err(|err| self.denied(&principal, operation, err))?;
        Ok(principal)
    }

    fn denied(&self, principal: &Principal, operation: Operation, err: AuthzError) -> ServiceError {
        let explanation = explain(principal.role, operation);
        warn!(
            user_id = %principal.user_id,
            business_id = %principal.business_id,
            operation = %operation,
            role = %principal.role,
            reason = %explanation.reason,
            error = %err,
            "permission denied"
        );
        err.into()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users and businesses
    // ─────────────────────────────────────────────────────────────────────

    pub fn register_user(
        &self,
        user_id: UserId,
        email: &str,
        display_name: Option<String>,
    ) -> ServiceResult<UserProfile> {
        let display_name = display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let profile = UserProfile::new(user_id, email, display_name)?;

        self.store.insert_user(profile.clone())?;
        info!(user_id = %user_id, email = %profile.email, "user registered");
        Ok(profile)
    }

    pub fn whoami(&self, user_id: UserId) -> ServiceResult<UserProfile> {
        Ok(self.store.get_user(user_id)?)
    }

    /// Create a business owned by `actor`, who must have a profile.
    pub fn create_business(&self, actor: UserId, name: &str) -> ServiceResult<Business> {
        let name = normalize_name(name)?;
        let profile = self.store.get_user(actor)?;

        let business = Business {
            id: BusinessId::new(),
            name,
            owner_id: actor,
            created_at: Utc::now(),
            members: vec![actor],
        };
        let owner = Member {
            user_id: actor,
            email: profile.email,
            role: Role::Owner,
        };

        self.store.insert_business(business.clone(), owner)?;
        info!(business_id = %business.id, owner_id = %actor, "business created");
        Ok(business)
    }

    pub fn list_businesses(&self, actor: UserId) -> ServiceResult<Vec<Business>> {
        Ok(self.store.list_businesses_for(actor)?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Members
    // ─────────────────────────────────────────────────────────────────────

    pub fn list_members(
        &self,
        actor: UserId,
        business_id: BusinessId,
    ) -> ServiceResult<Vec<Member>> {
        self.authorized(actor, business_id, Operation::Read)?;
        Ok(self.store.list_members(business_id)?)
    }

    /// Invite a registered user by email.
    pub fn add_member(
        &self,
        actor: UserId,
        business_id: BusinessId,
        email: &str,
        role: Role,
    ) -> ServiceResult<Member> {
        let email = normalize_email(email)?;
        let principal = self.authorized(actor, business_id, Operation::ManageMembers)?;

        let existing = self.store.list_members(business_id)?;
        if existing.iter().any(|m| m.email.to_lowercase() == email) {
            return Err(ServiceError::Conflict(format!(
                "{email} is already a member of the business"
            )));
        }

        let user = self
            .store
            .find_user_by_email(&email)?
            .ok_or_else(|| ServiceError::NotFound(format!("no user with email {email}")))?;
        if existing.iter().any(|m| m.user_id == user.id) {
            return Err(ServiceError::Conflict(format!(
                "user {} is already a member of the business",
                user.id
            )));
        }

        authorize_member_change(actor, principal.role, user.id, MemberChange::Add(role))
            .map_err(|err| self.denied(&principal, Operation::ManageMembers, err))?;

        let member = Member {
            user_id: user.id,
            email: user.email,
            role,
        };
        self.store.put_member(business_id, member.clone())?;
        info!(
            business_id = %business_id,
            user_id = %member.user_id,
            role = %role,
            added_by = %actor,
            "member added"
        );
        Ok(member)
    }

    pub fn remove_member(
        &self,
        actor: UserId,
        business_id: BusinessId,
        target: UserId,
    ) -> ServiceResult<()> {
        let principal = self.principal(actor, business_id)?;
        authorize_member_change(actor, principal.role, target, MemberChange::Remove)
            .map_err(|err| self.denied(&principal, Operation::ManageMembers, err))?;

        self.store.remove_member(business_id, target)?;
        info!(business_id = %business_id, user_id = %target, removed_by = %actor, "member removed");
        Ok(())
    }

    pub fn change_member_role(
        &self,
        actor: UserId,
        business_id: BusinessId,
        target: UserId,
        role: Role,
    ) -> ServiceResult<Member> {
        let principal = self.principal(actor, business_id)?;
        authorize_member_change(actor, principal.role, target, MemberChange::ChangeRole(role))
            .map_err(|err| self.denied(&principal, Operation::ManageMembers, err))?;

        let mut member = self.store.get_member(business_id, target)?.ok_or_else(|| {
            ServiceError::NotFound(format!("member {target} of business {business_id}"))
        })?;
        member.role = role;
        self.store.put_member(business_id, member.clone())?;
        info!(
            business_id = %business_id,
            user_id = %target,
            role = %role,
            changed_by = %actor,
            "member role changed"
        );
        Ok(member)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cash books
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_cashbook(
        &self,
        actor: UserId,
        business_id: BusinessId,
        name: &str,
    ) -> ServiceResult<CashBook> {
        let name = normalize_name(name)?;
        self.authorized(actor, business_id, Operation::CreateCashBook)?;

        let cashbook = CashBook {
            id: CashBookId::new(),
            business_id,
            name,
            created_at: Utc::now(),
        };
        self.store.insert_cashbook(cashbook.clone())?;
        info!(cashbook = %cashbook.reference(), created_by = %actor, "cashbook created");
        Ok(cashbook)
    }

    /// Cash books of a business, optionally filtered by a case-insensitive name search.
    pub fn list_cashbooks(
        &self,
        actor: UserId,
        business_id: BusinessId,
        search: &str,
    ) -> ServiceResult<Vec<CashBook>> {
        self.authorized(actor, business_id, Operation::Read)?;

        let query = SearchQuery::new(search);
        let mut books = self.store.list_cashbooks(business_id)?;
        books.retain(|b| query.matches(&b.name));
        Ok(books)
    }

    /// Delete every entry of a cash book, then the cash book itself.
    ///
    /// Not atomic and never rolled back: a failure partway leaves the
    /// already-deleted entries gone and reports how many there were.
    /// Returns the number of entries removed.
    pub fn delete_cashbook_cascade(
        &self,
        actor: UserId,
        cashbook: CashBookRef,
    ) -> ServiceResult<usize> {
        self.authorized(actor, cashbook.business_id, Operation::DeleteCashBook)?;

        let entries = self.store.list_entries(cashbook)?;
        let mut deleted_entries = 0;

        for entry in &entries {
            if let Err(source) = self.store.delete_entry(EntryRef::new(cashbook, entry.id)) {
                warn!(
                    cashbook = %cashbook,
                    entry_id = %entry.id,
                    deleted_entries,
                    error = %source,
                    "cascade delete stopped while removing entries"
                );
                return Err(ServiceError::CascadeIncomplete {
                    cashbook,
                    deleted_entries,
                    source,
                });
            }
            deleted_entries += 1;
        }

        if let Err(source) = self.store.delete_cashbook(cashbook) {
            warn!(
                cashbook = %cashbook,
                deleted_entries,
                error = %source,
                "cascade delete removed entries but not the cashbook"
            );
            return Err(ServiceError::CascadeIncomplete {
                cashbook,
                deleted_entries,
                source,
            });
        }

        info!(cashbook = %cashbook, deleted_entries, deleted_by = %actor, "cashbook deleted");
        Ok(deleted_entries)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Entries
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_entry(
        &self,
        actor: UserId,
        cashbook: CashBookRef,
        draft: EntryDraft,
    ) -> ServiceResult<EntryId> {
        let draft = draft.validated()?;
        self.authorized(actor, cashbook.business_id, Operation::WriteEntry)?;

        let entry = self.store.insert_entry(cashbook, draft, actor)?;
        info!(
            cashbook = %cashbook,
            entry_id = %entry.id,
            entry_type = entry.entry_type.as_str(),
            amount = %entry.amount,
            created_by = %actor,
            "entry created"
        );
        Ok(entry.id)
    }

    pub fn update_entry(
        &self,
        actor: UserId,
        entry: EntryRef,
        draft: EntryDraft,
    ) -> ServiceResult<()> {
        let draft = draft.validated()?;
        self.authorized(actor, entry.cashbook.business_id, Operation::WriteEntry)?;

        let updated = self.store.update_entry(entry, draft)?;
        info!(
            cashbook = %entry.cashbook,
            entry_id = %updated.id,
            amount = %updated.amount,
            updated_by = %actor,
            "entry updated"
        );
        Ok(())
    }

    pub fn delete_entry(&self, actor: UserId, entry: EntryRef) -> ServiceResult<()> {
        self.authorized(actor, entry.cashbook.business_id, Operation::DeleteEntry)?;

        self.store.delete_entry(entry)?;
        info!(
            cashbook = %entry.cashbook,
            entry_id = %entry.entry_id,
            deleted_by = %actor,
            "entry deleted"
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    /// Push subscription of entry snapshots; the current snapshot arrives first.
    pub fn subscribe(
        &self,
        actor: UserId,
        cashbook: CashBookRef,
    ) -> ServiceResult<Subscription<EntrySnapshot>> {
        self.authorized(actor, cashbook.business_id, Operation::Read)?;
        Ok(self.store.subscribe_entries(cashbook)?)
    }

    /// One-shot projection of the current entries, filtered by `query`.
    pub fn ledger(
        &self,
        actor: UserId,
        cashbook: CashBookRef,
        query: &str,
    ) -> ServiceResult<LedgerView> {
        self.authorized(actor, cashbook.business_id, Operation::Read)?;

        let entries = self.store.list_entries(cashbook)?;
        Ok(LedgerProjection::project(entries).view(query))
    }

    /// Title and filtered view for exports.
    pub fn export_view(
        &self,
        actor: UserId,
        cashbook: CashBookRef,
        query: &str,
    ) -> ServiceResult<(CashBook, LedgerView)> {
        let view = self.ledger(actor, cashbook, query)?;
        let book = self.store.get_cashbook(cashbook)?;
        Ok((book, view))
    }
}
