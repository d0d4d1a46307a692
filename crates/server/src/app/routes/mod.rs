use axum::Router;

pub mod control;
pub mod subscribe;
pub mod system;

/// All HTTP routes; shared state is layered on by `build_app`.
pub fn router() -> Router {
    Router::new()
        .merge(system::router())
        .merge(control::router())
        .merge(subscribe::router())
}
