use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use cashbook_core::{BusinessId, EntryId, UserId};
use cashbook_events::{InMemorySnapshotBus, SnapshotBus, Subscription};
use cashbook_ledger::{
    Business, CashBook, CashBookRef, Entry, EntryDraft, EntryRef, Member, UserProfile,
};

use super::r#trait::{CashBookStore, EntrySnapshot, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Directory {
    users: HashMap<UserId, UserProfile>,
    businesses: HashMap<BusinessId, Business>,
    members: HashMap<(BusinessId, UserId), Member>,
    cashbooks: HashMap<CashBookRef, CashBook>,
}

#[derive(Debug, Default)]
struct EntryTable {
    by_book: HashMap<CashBookRef, Vec<Entry>>,
    last_created_at: Option<DateTime<Utc>>,
}

impl EntryTable {
    /// Server timestamp, strictly increasing across every insert in this store.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }

    fn snapshot(&self, cashbook: &CashBookRef) -> EntrySnapshot {
        Arc::new(self.by_book.get(cashbook).cloned().unwrap_or_default())
    }
}

/// In-memory cash book store with push snapshots.
///
/// Intended for tests/dev and the single-node server. The entries lock is
/// held while publishing, so subscribers observe snapshots in mutation order.
#[derive(Debug, Default)]
pub struct InMemoryCashBookStore {
    directory: RwLock<Directory>,
    entries: RwLock<EntryTable>,
    bus: InMemorySnapshotBus<CashBookRef, EntrySnapshot>,
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl InMemoryCashBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscriber count for a cash book (diagnostics and tests).
    pub fn subscriber_count(&self, cashbook: &CashBookRef) -> usize {
        self.bus.subscriber_count(cashbook)
    }

    fn ensure_cashbook(&self, cashbook: &CashBookRef) -> StoreResult<()> {
        let dir = self.directory.read().map_err(|_| poisoned())?;
        if dir.cashbooks.contains_key(cashbook) {
            Ok(())
        } else {
            Err(StoreError::not_found(format!("cashbook {cashbook}")))
        }
    }

    fn publish(&self, cashbook: &CashBookRef, table: &EntryTable) {
        // The mutation is already applied; a bus failure only delays views
        // until the next snapshot.
        match self.bus.publish(cashbook, table.snapshot(cashbook)) {
            Ok(delivered) => {
                tracing::trace!(cashbook = %cashbook, delivered, "entry snapshot published");
            }
            Err(err) => {
                tracing::warn!(cashbook = %cashbook, error = %err, "entry snapshot publish failed");
            }
        }
    }
}

impl CashBookStore for InMemoryCashBookStore {
    fn insert_user(&self, user: UserProfile) -> StoreResult<()> {
        let mut dir = self.directory.write().map_err(|_| poisoned())?;

        if dir.users.contains_key(&user.id) {
            return Err(StoreError::conflict(format!("user {} already registered", user.id)));
        }
        if dir.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::conflict(format!("email {} already registered", user.email)));
        }

        dir.users.insert(user.id, user);
        Ok(())
    }

    fn get_user(&self, user_id: UserId) -> StoreResult<UserProfile> {
        let dir = self.directory.read().map_err(|_| poisoned())?;
        dir.users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("user {user_id}")))
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserProfile>> {
        let dir = self.directory.read().map_err(|_| poisoned())?;
        Ok(dir.users.values().find(|u| u.email == email).cloned())
    }

    fn insert_business(&self, mut business: Business, owner: Member) -> StoreResult<()> {
        let mut dir = self.directory.write().map_err(|_| poisoned())?;

        if dir.businesses.contains_key(&business.id) {
            return Err(StoreError::conflict(format!("business {} already exists", business.id)));
        }
        if !business.has_member(owner.user_id) {
            business.members.push(owner.user_id);
        }

        dir.members.insert((business.id, owner.user_id), owner);
        dir.businesses.insert(business.id, business);
        Ok(())
    }

    fn get_business(&self, business_id: BusinessId) -> StoreResult<Business> {
        let dir = self.directory.read().map_err(|_| poisoned())?;
        dir.businesses
            .get(&business_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("business {business_id}")))
    }

    fn list_businesses_for(&self, user_id: UserId) -> StoreResult<Vec<Business>> {
        let dir = self.directory.read().map_err(|_| poisoned())?;
        let mut out: Vec<Business> = dir
            .businesses
            .values()
            .filter(|b| b.has_member(user_id))
            .cloned()
            .collect();
        out.sort_by_key(|b| Reverse((b.created_at, b.id)));
        Ok(out)
    }

    fn get_member(&self, business_id: BusinessId, user_id: UserId) -> StoreResult<Option<Member>> {
        let dir = self.directory.read().map_err(|_| poisoned())?;
        Ok(dir.members.get(&(business_id, user_id)).cloned())
    }

    fn list_members(&self, business_id: BusinessId) -> StoreResult<Vec<Member>> {
        let dir = self.directory.read().map_err(|_| poisoned())?;
        if !dir.businesses.contains_key(&business_id) {
            return Err(StoreError::not_found(format!("business {business_id}")));
        }

        let mut out: Vec<Member> = dir
            .members
            .iter()
            .filter(|((b, _), _)| *b == business_id)
            .map(|(_, m)| m.clone())
            .collect();
        out.sort_by(|a, b| b.role.cmp(&a.role).then_with(|| a.email.cmp(&b.email)));
        Ok(out)
    }

    fn put_member(&self, business_id: BusinessId, member: Member) -> StoreResult<()> {
        let mut dir = self.directory.write().map_err(|_| poisoned())?;

        let business = dir
            .businesses
            .get_mut(&business_id)
            .ok_or_else(|| StoreError::not_found(format!("business {business_id}")))?;
        if !business.has_member(member.user_id) {
            business.members.push(member.user_id);
        }

        dir.members.insert((business_id, member.user_id), member);
        Ok(())
    }

    fn remove_member(&self, business_id: BusinessId, user_id: UserId) -> StoreResult<()> {
        let mut dir = self.directory.write().map_err(|_| poisoned())?;

        if dir.members.remove(&(business_id, user_id)).is_none() {
            return Err(StoreError::not_found(format!(
                "member {user_id} of business {business_id}"
            )));
        }
        if let Some(business) = dir.businesses.get_mut(&business_id) {
            business.members.retain(|m| *m != user_id);
        }
        Ok(())
    }

    fn insert_cashbook(&self, cashbook: CashBook) -> StoreResult<()> {
        let mut dir = self.directory.write().map_err(|_| poisoned())?;

        if !dir.businesses.contains_key(&cashbook.business_id) {
            return Err(StoreError::not_found(format!("business {}", cashbook.business_id)));
        }
        let key = cashbook.reference();
        if dir.cashbooks.contains_key(&key) {
            return Err(StoreError::conflict(format!("cashbook {key} already exists")));
        }

        dir.cashbooks.insert(key, cashbook);
        Ok(())
    }

    fn get_cashbook(&self, cashbook: CashBookRef) -> StoreResult<CashBook> {
        let dir = self.directory.read().map_err(|_| poisoned())?;
        dir.cashbooks
            .get(&cashbook)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("cashbook {cashbook}")))
    }

    fn list_cashbooks(&self, business_id: BusinessId) -> StoreResult<Vec<CashBook>> {
        let dir = self.directory.read().map_err(|_| poisoned())?;
        let mut out: Vec<CashBook> = dir
            .cashbooks
            .values()
            .filter(|c| c.business_id == business_id)
            .cloned()
            .collect();
        out.sort_by_key(|c| Reverse((c.created_at, c.id)));
        Ok(out)
    }

    fn delete_cashbook(&self, cashbook: CashBookRef) -> StoreResult<()> {
        {
            let mut dir = self.directory.write().map_err(|_| poisoned())?;
            if dir.cashbooks.remove(&cashbook).is_none() {
                return Err(StoreError::not_found(format!("cashbook {cashbook}")));
            }
        }

        let mut table = self.entries.write().map_err(|_| poisoned())?;
        if let Some(orphans) = table.by_book.remove(&cashbook) {
            if !orphans.is_empty() {
                tracing::warn!(
                    cashbook = %cashbook,
                    orphans = orphans.len(),
                    "cashbook deleted with entries still attached; discarding them"
                );
            }
        }

        // Final empty snapshot, then disconnect every subscriber.
        self.publish(&cashbook, &table);
        self.bus.close(&cashbook);
        Ok(())
    }

    fn insert_entry(
        &self,
        cashbook: CashBookRef,
        draft: EntryDraft,
        created_by: UserId,
    ) -> StoreResult<Entry> {
        // Checked under the entries lock: a delete_cashbook that slips in
        // between check and push would otherwise leave an orphaned list.
        // Lock order is entries then directory; nothing takes the reverse.
        let mut table = self.entries.write().map_err(|_| poisoned())?;
        self.ensure_cashbook(&cashbook)?;

        let created_at = table.next_created_at();
        let entry = Entry::from_draft(EntryId::new(), draft, created_at, created_by);
        table.by_book.entry(cashbook).or_default().push(entry.clone());

        self.publish(&cashbook, &table);
        Ok(entry)
    }

    fn update_entry(&self, entry: EntryRef, draft: EntryDraft) -> StoreResult<Entry> {
        let mut table = self.entries.write().map_err(|_| poisoned())?;

        let stored = table
            .by_book
            .get_mut(&entry.cashbook)
            .and_then(|entries| entries.iter_mut().find(|e| e.id == entry.entry_id))
            .ok_or_else(|| StoreError::not_found(format!("entry {}", entry.entry_id)))?;
        stored.apply_draft(draft);
        let updated = stored.clone();

        self.publish(&entry.cashbook, &table);
        Ok(updated)
    }

    fn delete_entry(&self, entry: EntryRef) -> StoreResult<()> {
        let mut table = self.entries.write().map_err(|_| poisoned())?;

        let entries = table
            .by_book
            .get_mut(&entry.cashbook)
            .ok_or_else(|| StoreError::not_found(format!("entry {}", entry.entry_id)))?;
        let before = entries.len();
        entries.retain(|e| e.id != entry.entry_id);
        if entries.len() == before {
            return Err(StoreError::not_found(format!("entry {}", entry.entry_id)));
        }

        self.publish(&entry.cashbook, &table);
        Ok(())
    }

    fn list_entries(&self, cashbook: CashBookRef) -> StoreResult<Vec<Entry>> {
        self.ensure_cashbook(&cashbook)?;
        let table = self.entries.read().map_err(|_| poisoned())?;
        Ok(table.by_book.get(&cashbook).cloned().unwrap_or_default())
    }

    fn subscribe_entries(&self, cashbook: CashBookRef) -> StoreResult<Subscription<EntrySnapshot>> {
        self.ensure_cashbook(&cashbook)?;

        // Seeding under the read lock keeps the first snapshot ahead of any
        // concurrent mutation's publish.
        let table = self.entries.read().map_err(|_| poisoned())?;
        Ok(self.bus.subscribe_seeded(cashbook, table.snapshot(&cashbook)))
    }
}
