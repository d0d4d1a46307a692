use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};

use crate::services::AppServices;

const INDEX_HTML: &str = include_str!("../../../static/index.html");

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/accounts", get(accounts))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /: the built-in page with the forms and the live balances table.
pub async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /accounts: current snapshot, same JSON shape as the pushed updates.
pub async fn accounts(Extension(services): Extension<AppServices>) -> impl IntoResponse {
    Json(services.snapshot())
}
