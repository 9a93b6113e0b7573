use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use cashbook_core::{BusinessId, UserId};

use crate::app::routes::common::parse_id;
use crate::app::{dto, errors, services::AppServices};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/:business_id/members", get(list_members).post(add_member))
        .route(
            "/:business_id/members/:user_id",
            put(change_member_role).delete(remove_member),
        )
}

pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(business_id): Path<String>,
) -> axum::response::Response {
    let business_id = match parse_id::<BusinessId>(&business_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.cashbooks.list_members(user.user_id(), business_id) {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /businesses/:business_id/members
///
/// Invite an already-registered user by email (owner only).
pub async fn add_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(business_id): Path<String>,
    Json(body): Json<dto::AddMemberRequest>,
) -> axum::response::Response {
    let business_id = match parse_id::<BusinessId>(&business_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let role = match dto::parse_role(&body.role) {
        Ok(role) => role,
        Err(e) => return errors::service_error_to_response(e),
    };

    match services
        .cashbooks
        .add_member(user.user_id(), business_id, &body.email, role)
    {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn change_member_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, target)): Path<(String, String)>,
    Json(body): Json<dto::ChangeRoleRequest>,
) -> axum::response::Response {
    let (business_id, target) = match (
        parse_id::<BusinessId>(&business_id),
        parse_id::<UserId>(&target),
    ) {
        (Ok(b), Ok(u)) => (b, u),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    let role = match dto::parse_role(&body.role) {
        Ok(role) => role,
        Err(e) => return errors::service_error_to_response(e),
    };

    match services
        .cashbooks
        .change_member_role(user.user_id(), business_id, target, role)
    {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, target)): Path<(String, String)>,
) -> axum::response::Response {
    let (business_id, target) = match (
        parse_id::<BusinessId>(&business_id),
        parse_id::<UserId>(&target),
    ) {
        (Ok(b), Ok(u)) => (b, u),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };

    match services
        .cashbooks
        .remove_member(user.user_id(), business_id, target)
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
