use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use cashbook_export::ExportError;
use cashbook_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::Forbidden(e) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())
        }
        e @ ServiceError::NotMember { .. } => {
            json_error(StatusCode::FORBIDDEN, "not_member", e.to_string())
        }
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::Store(e) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            e.to_string(),
        ),
        e @ ServiceError::CascadeIncomplete { .. } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "cascade_incomplete",
            e.to_string(),
        ),
    }
}

pub fn export_error_to_response(err: ExportError) -> axum::response::Response {
    tracing::error!(error = %err, "export render failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "export_error", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
