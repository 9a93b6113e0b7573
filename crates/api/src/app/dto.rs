use serde::Deserialize;

use cashbook_auth::Role;
use cashbook_infra::ServiceError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBusinessRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    #[serde(default = "default_member_role")]
    pub role: String,
}

fn default_member_role() -> String {
    Role::Viewer.as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCashBookRequest {
    pub name: String,
}

/// `?q=` on list, ledger, stream and export routes.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

// -------------------------
// Mapping helpers
// -------------------------

pub fn parse_role(raw: &str) -> Result<Role, ServiceError> {
    raw.parse::<Role>().map_err(ServiceError::from)
}
