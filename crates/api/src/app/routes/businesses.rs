use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::{dto, errors, services::AppServices};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_businesses).post(create_business))
}

/// Businesses the caller belongs to.
pub async fn list_businesses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.cashbooks.list_businesses(user.user_id()) {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_business(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::CreateBusinessRequest>,
) -> axum::response::Response {
    match services.cashbooks.create_business(user.user_id(), &body.name) {
        Ok(business) => (StatusCode::CREATED, Json(business)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
