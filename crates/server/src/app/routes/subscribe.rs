//! Push channel: GET /ws.
//!
//! The upgraded socket is registered as a subscriber and then forwards every
//! snapshot the registry hands it. Inbound frames only prove liveness; a close
//! frame, a read error or a failed write ends the subscription.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};

use crate::services::AppServices;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new().route("/ws", get(subscribe))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

pub async fn subscribe(ws: WebSocketUpgrade, Extension(services): Extension<AppServices>) -> Response {
    ws.on_upgrade(move |socket| serve_subscriber(socket, services))
}

async fn serve_subscriber(socket: WebSocket, services: AppServices) {
    let mut subscription = services.registry().subscribe();
    let id = subscription.id();
    let (mut sink, mut inbound) = socket.split();

    loop {
        tokio::select! {
            next = subscription.next() => {
                let Some(snapshot) = next else {
                    tracing::debug!(subscriber = %id, "subscription closed by registry");
                    break;
                };
                if let Err(e) = sink.send(Message::Text(snapshot.to_json())).await {
                    tracing::info!(subscriber = %id, error = %e, "push failed");
                    break;
                }
            }
            frame = inbound.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::info!(subscriber = %id, error = %e, "read failed");
                    break;
                }
            },
        }
    }

    // Dropping the subscription closes its slot; the delivery task removes the
    // registry entry on its next push.
    drop(subscription);
    let _ = sink.close().await;
    tracing::info!(subscriber = %id, "subscriber disconnected");
}
