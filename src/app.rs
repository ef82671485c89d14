use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/alerts",
            get(handlers::list_alerts).post(handlers::create_alert),
        )
        .route("/api/engagement", get(handlers::get_engagement))
        .route("/api/summary", get(handlers::get_summary))
        .with_state(state)
}
