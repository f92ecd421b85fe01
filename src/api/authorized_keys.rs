//! Authorized keys endpoint

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::api::state::AppState;

/// GET /user/{name}/authorized_keys
///
/// Answers with the newline-joined keys of the account, possibly empty.
/// Every failure collapses into an empty 404.
pub async fn get_authorized_keys(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    let account = name.to_lowercase();

    match tokio::time::timeout(state.lookup_timeout, state.key_store.get(&account)).await {
        Ok(Ok(keys)) => {
            debug!(account = %account, bytes = keys.len(), "Serving authorized keys");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                keys,
            )
                .into_response()
        }
        Ok(Err(e)) => {
            debug!(account = %account, error = %e, "No authorized keys");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(_) => {
            warn!(account = %account, timeout = ?state.lookup_timeout, "Key lookup timed out");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
