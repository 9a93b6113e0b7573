use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};

use cashbook_core::BusinessId;

use crate::app::routes::common::{cashbook_ref, parse_id};
use crate::app::{dto, errors, services::AppServices};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/:business_id/cashbooks", get(list_cashbooks).post(create_cashbook))
        .route("/:business_id/cashbooks/:cashbook_id", delete(delete_cashbook))
}

/// GET /businesses/:business_id/cashbooks?q=
pub async fn list_cashbooks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(business_id): Path<String>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    let business_id = match parse_id::<BusinessId>(&business_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services
        .cashbooks
        .list_cashbooks(user.user_id(), business_id, &params.q)
    {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_cashbook(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(business_id): Path<String>,
    Json(body): Json<dto::CreateCashBookRequest>,
) -> axum::response::Response {
    let business_id = match parse_id::<BusinessId>(&business_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services
        .cashbooks
        .create_cashbook(user.user_id(), business_id, &body.name)
    {
        Ok(book) => (StatusCode::CREATED, Json(book)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// DELETE /businesses/:business_id/cashbooks/:cashbook_id
///
/// Cascade: entries first, then the book. A partial failure answers `500`
/// with the number of entries already gone.
pub async fn delete_cashbook(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, cashbook_id)): Path<(String, String)>,
) -> axum::response::Response {
    let cashbook = match cashbook_ref(&business_id, &cashbook_id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services
        .cashbooks
        .delete_cashbook_cascade(user.user_id(), cashbook)
    {
        Ok(deleted_entries) => (
            StatusCode::OK,
            Json(serde_json::json!({ "deleted_entries": deleted_entries })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
