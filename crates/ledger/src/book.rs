//! Containers around the ledger: businesses, their members, and cash books.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cashbook_auth::Role;
use cashbook_core::{BusinessId, CashBookId, DomainError, DomainResult, UserId};

/// Address of a cash book: the owning business plus the book id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CashBookRef {
    pub business_id: BusinessId,
    pub cashbook_id: CashBookId,
}

impl CashBookRef {
    pub fn new(business_id: BusinessId, cashbook_id: CashBookId) -> Self {
        Self {
            business_id,
            cashbook_id,
        }
    }
}

impl core::fmt::Display for CashBookRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.business_id, self.cashbook_id)
    }
}

/// Named ledger within a business. Totals are never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashBook {
    pub id: CashBookId,
    pub business_id: BusinessId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl CashBook {
    pub fn reference(&self) -> CashBookRef {
        CashBookRef::new(self.business_id, self.id)
    }
}

/// Top-level tenant container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    /// Coarse membership list, kept in step with the member records.
    pub members: Vec<UserId>,
}

impl Business {
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }
}

/// A user's membership in one business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: UserId,
    /// Snapshot of the user's email at invitation time.
    pub email: String,
    pub role: Role,
}

/// Directory record used to invite members by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
}

impl UserProfile {
    pub fn new(id: UserId, email: &str, display_name: Option<String>) -> DomainResult<Self> {
        let email = normalize_email(email)?;
        Ok(Self {
            id,
            email,
            display_name,
        })
    }
}

/// Trim and lower-case an email; reject blanks.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::validation("email must not be empty"));
    }
    Ok(email)
}

/// Trim a display name (business or cash book); reject blanks.
pub fn normalize_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name must not be empty"));
    }
    Ok(name.to_string())
}
