use axum::{
    Router,
    routing::{get, post},
};

pub mod businesses;
pub mod cashbooks;
pub mod common;
pub mod entries;
pub mod export;
pub mod ledger;
pub mod members;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/users", post(system::register_user))
        .nest(
            "/businesses",
            businesses::router()
                .merge(members::router())
                .merge(cashbooks::router())
                .merge(entries::router())
                .merge(ledger::router())
                .merge(export::router()),
        )
}
