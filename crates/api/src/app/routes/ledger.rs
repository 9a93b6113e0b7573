//! Ledger reads: one-shot projection and a live SSE stream.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
    routing::get,
};
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::wrappers::UnboundedReceiverStream;

use cashbook_infra::LiveLedger;

use crate::app::routes::common::cashbook_ref;
use crate::app::{dto, errors, services::AppServices};
use crate::context::UserContext;

const HEARTBEAT_EVERY: Duration = Duration::from_secs(15);

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/:business_id/cashbooks/:cashbook_id/ledger", get(get_ledger))
        .route("/:business_id/cashbooks/:cashbook_id/ledger/stream", get(stream_ledger))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /businesses/:business_id/cashbooks/:cashbook_id/ledger?q=
pub async fn get_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, cashbook_id)): Path<(String, String)>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    let cashbook = match cashbook_ref(&business_id, &cashbook_id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.cashbooks.ledger(user.user_id(), cashbook, &params.q) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /businesses/:business_id/cashbooks/:cashbook_id/ledger/stream?q=
///
/// Server-Sent Events:
/// - `ledger`: the full filtered view, sent once on connect and after every change
/// - `closed`: the cash book was deleted; the stream ends
/// - `heartbeat`: after 15s without changes
pub async fn stream_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((business_id, cashbook_id)): Path<(String, String)>,
    Query(params): Query<dto::SearchParams>,
) -> axum::response::Response {
    let cashbook = match cashbook_ref(&business_id, &cashbook_id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    // Gate and subscribe up front so failures answer with a normal status code.
    let subscription = match services.cashbooks.subscribe(user.user_id(), cashbook) {
        Ok(s) => s,
        Err(e) => return errors::service_error_to_response(e),
    };

    let (tx, rx) = unbounded_channel::<Result<SseEvent, Infallible>>();
    let poll = services.stream_poll;
    let query = params.q;

    // The subscription is blocking; bridge it from a blocking task. Dropping
    // `live` on exit unregisters the subscriber.
    tokio::task::spawn_blocking(move || {
        let mut live = LiveLedger::new(subscription);
        let mut last_sent = Instant::now();

        loop {
            if live.wait_next(poll) {
                let data = match serde_json::to_string(&live.view(&query)) {
                    Ok(s) => s,
                    Err(err) => {
                        tracing::error!(
                            cashbook = %cashbook,
                            error = %err,
                            "ledger view serialization failed"
                        );
                        break;
                    }
                };
                if tx.send(Ok(SseEvent::default().event("ledger").data(data))).is_err() {
                    break; // Client went away
                }
                last_sent = Instant::now();
            } else if live.is_closed() {
                let _ = tx.send(Ok(SseEvent::default().event("closed").data("{}")));
                break;
            } else if last_sent.elapsed() > HEARTBEAT_EVERY {
                if tx.send(Ok(SseEvent::default().event("heartbeat").data("{}"))).is_err() {
                    break;
                }
                last_sent = Instant::now();
            } else if tx.is_closed() {
                break;
            }
        }

        tracing::debug!(
            cashbook = %cashbook,
            snapshots = live.snapshots_seen(),
            rows = live.projection().len(),
            "ledger stream ended"
        );
    });

    let stream = UnboundedReceiverStream::new(rx);
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(HEARTBEAT_EVERY))
        .into_response()
}
