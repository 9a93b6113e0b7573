use cashbook_core::{BusinessId, UserId};

use crate::{AuthzError, Operation, Role, authorize};

/// A caller resolved against one business: who they are and the role they hold there.
///
/// Construction is decoupled from storage; the service layer builds this from
/// the business's member record before consulting the gate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub business_id: BusinessId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, business_id: BusinessId, role: Role) -> Self {
        Self {
            user_id,
            business_id,
            role,
        }
    }

    pub fn authorize(&self, operation: Operation) -> Result<(), AuthzError> {
        authorize(self.role, operation)
    }
}
