use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path, Query},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use cashbook_export::{export_file_name, render_csv, render_document};

use crate::app::routes::common::cashbook_ref;
use crate::app::{dto, errors, services::AppServices};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/:business_id/cashbooks/:cashbook_id/export.csv", get(export_csv))
        .route("/:business_id/cashbooks/:cashbook_id/export.txt", get(export_document))
}

fn attachment(content_type: &str, file_name: &str, body: String) -> axum::response::Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Spreadsheet export of the filtered ledger (raw amounts).
pub async fn export_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, cashbook_id)): Path<(String, String)>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    let cashbook = match cashbook_ref(&business_id, &cashbook_id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let (book, view) = match services.cashbooks.export_view(user.user_id(), cashbook, &params.q) {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e),
    };

    match render_csv(&view) {
        Ok(body) => attachment(
            "text/csv; charset=utf-8",
            &export_file_name(&book.name, "csv"),
            body,
        ),
        Err(e) => errors::export_error_to_response(e),
    }
}

/// Printable document export: title, INR summary line and a text table.
pub async fn export_document(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, cashbook_id)): Path<(String, String)>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    let cashbook = match cashbook_ref(&business_id, &cashbook_id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.cashbooks.export_view(user.user_id(), cashbook, &params.q) {
        Ok((book, view)) => attachment(
            "text/plain; charset=utf-8",
            &export_file_name(&book.name, "txt"),
            render_document(&book.name, &view),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}
