use serde::Serialize;
use thiserror::Error;

use cashbook_core::UserId;

use crate::{Operation, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: '{operation}' requires role '{required}', caller has '{role}'")]
    Forbidden {
        operation: Operation,
        required: Role,
        role: Role,
    },

    #[error("you cannot remove yourself from the business")]
    SelfRemoval,

    #[error("you cannot demote yourself from the owner role")]
    SelfDemotion,

    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// Membership mutation requested by an owner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemberChange {
    Add(Role),
    Remove,
    ChangeRole(Role),
}

/// Decide whether `role` may attempt `operation`.
///
/// - No IO
/// - No panics
/// - No state
pub fn authorize(role: Role, operation: Operation) -> Result<(), AuthzError> {
    let required = operation.required_role();
    if role.at_least(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            operation,
            required,
            role,
        })
    }
}

/// Gate a membership change made by `actor` against `target`.
///
/// Self-removal and self-demotion away from `owner` are rejected before the
/// role check, whatever the actor's role. Changes against *other* owners pass
/// once the actor is an owner, so a business can still end up with no owner
/// through a co-owner's action.
pub fn authorize_member_change(
    actor: UserId,
    actor_role: Role,
    target: UserId,
    change: MemberChange,
) -> Result<(), AuthzError> {
    if actor == target {
        match change {
            MemberChange::Remove => return Err(AuthzError::SelfRemoval),
            MemberChange::ChangeRole(new_role) if new_role != Role::Owner => {
                return Err(AuthzError::SelfDemotion);
            }
            _ => {}
        }
    }

    authorize(actor_role, Operation::ManageMembers)
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    InsufficientRole,
}

/// Detailed, serialisable record of a gate decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub operation: Operation,
    pub role: Role,
    pub required_role: Role,
    pub granted: bool,
    pub reason: String,
    pub denial: Option<DenialKind>,
}

/// Explain why `role` is (or is not) allowed to attempt `operation`.
pub fn explain(role: Role, operation: Operation) -> AuthorizationExplanation {
    let required_role = operation.required_role();
    let granted = authorize(role, operation).is_ok();

    let reason = if granted {
        format!("role '{role}' meets the '{required_role}' minimum for '{operation}'")
    } else {
        format!("role '{role}' is below the '{required_role}' minimum for '{operation}'")
    };

    AuthorizationExplanation {
        operation,
        role,
        required_role,
        granted,
        reason,
        denial: (!granted).then_some(DenialKind::InsufficientRole),
    }
}
