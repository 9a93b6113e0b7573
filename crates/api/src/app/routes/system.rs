use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::{dto, errors, services::AppServices};
use crate::context::UserContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /whoami
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.cashbooks.whoami(user.user_id()) {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /users
///
/// Registers the calling identity in the user directory so owners can invite it by email.
pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::RegisterUserRequest>,
) -> axum::response::Response {
    match services
        .cashbooks
        .register_user(user.user_id(), &body.email, body.display_name)
    {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
