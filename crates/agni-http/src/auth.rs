use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::server::AppState;

/// Checked against every route except `/live`. The spec's route table
/// marks a couple of reserved unit-admin endpoints with an unclear auth
/// column; applied uniformly here per the general rule stated in the
/// prose ("all routes except `/live` require an apikey header") — see
/// `DESIGN.md`.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let authorized = req
        .headers()
        .get("apikey")
        .and_then(|value| value.to_str().ok())
        .map(|key| state.api_keys.contains(key))
        .unwrap_or(false);

    if authorized {
        next.run(req).await
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}
