use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
};

use cashbook_ledger::EntryDraft;

use crate::app::routes::common::{cashbook_ref, entry_ref};
use crate::app::{errors, services::AppServices};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/:business_id/cashbooks/:cashbook_id/entries", post(create_entry))
        .route(
            "/:business_id/cashbooks/:cashbook_id/entries/:entry_id",
            put(update_entry).delete(delete_entry),
        )
}

pub async fn create_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, cashbook_id)): Path<(String, String)>,
    Json(draft): Json<EntryDraft>,
) -> axum::response::Response {
    let cashbook = match cashbook_ref(&business_id, &cashbook_id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.cashbooks.create_entry(user.user_id(), cashbook, draft) {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, cashbook_id, entry_id)): Path<(String, String, String)>,
    Json(draft): Json<EntryDraft>,
) -> axum::response::Response {
    let entry = match entry_ref(&business_id, &cashbook_id, &entry_id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.cashbooks.update_entry(user.user_id(), entry, draft) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, cashbook_id, entry_id)): Path<(String, String, String)>,
) -> axum::response::Response {
    let entry = match entry_ref(&business_id, &cashbook_id, &entry_id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.cashbooks.delete_entry(user.user_id(), entry) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
