//! `cashbook-auth`: the business role/permission gate.
//!
//! This crate is intentionally decoupled from HTTP and storage: role values are
//! consumed as given facts and every check is a pure predicate.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{
    AuthorizationExplanation, AuthzError, DenialKind, MemberChange, authorize,
    authorize_member_change, explain,
};
pub use permissions::Operation;
pub use principal::Principal;
pub use roles::Role;
