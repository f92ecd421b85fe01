use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::authorized_keys;
use super::health;
use super::state::AppState;

/// Create the router; `metrics` is merged in when Prometheus is enabled
pub fn create_router(state: AppState, metrics: Option<Router>) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/user/{name}/authorized_keys",
            get(authorized_keys::get_authorized_keys),
        )
        .with_state(state);

    let router = match metrics {
        Some(metrics) => router.merge(metrics),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}
