//! Control plane: account registration and peer-to-peer transfers.

use axum::{
    extract::{Extension, Form},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Router,
};

use crate::app::{dto, errors};
use crate::protocol;
use crate::services::AppServices;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/donate", post(donate))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /register
///
/// Create-if-absent. Registering an existing name is a successful no-op.
pub async fn register(
    Extension(services): Extension<AppServices>,
    Form(body): Form<dto::RegisterForm>,
) -> Response {
    let name = body.name.trim();

    match services.ledger().register(name) {
        Ok(commit) => {
            if commit.value.is_created() {
                tracing::info!(account = name, "account registered");
                services.publish(commit.snapshot);
            } else {
                tracing::debug!(account = name, "register ignored: account exists");
            }
            Redirect::to("/").into_response()
        }
        Err(err) => {
            tracing::warn!(account = name, "register rejected: {err}");
            errors::ledger_error_page(&err)
        }
    }
}

/// POST /donate
///
/// Atomic transfer between two existing accounts.
pub async fn donate(
    Extension(services): Extension<AppServices>,
    Form(body): Form<dto::DonateForm>,
) -> Response {
    let amount = match protocol::parse_amount(&body.amount) {
        Ok(a) => a,
        Err(_) => {
            tracing::warn!(amount = %body.amount, "donate rejected: invalid amount format");
            return errors::error_page(StatusCode::BAD_REQUEST, "Invalid amount format");
        }
    };

    let from = body.from.trim();
    let to = body.to.trim();

    match services.ledger().transfer(from, to, amount) {
        Ok(commit) => {
            tracing::info!(
                from,
                to,
                amount,
                from_balance = commit.value.from_balance,
                to_balance = commit.value.to_balance,
                "donation committed"
            );
            services.publish(commit.snapshot);
            Redirect::to("/").into_response()
        }
        Err(err) => {
            tracing::warn!(from, to, amount, "donate rejected: {err}");
            errors::ledger_error_page(&err)
        }
    }
}
