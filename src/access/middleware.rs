//! Access gate middleware for axum.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ZoneError;
use crate::AppState;

/// Reject callers whose origin is not permitted before any handler runs.
///
/// Denied requests never reach disk or the zone store.
pub async fn require_permitted_origin(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = peer.ip();

    if !state.policy.permitted(origin) {
        tracing::warn!(
            origin = %origin,
            method = %request.method(),
            path = %request.uri().path(),
            "Blocked request"
        );
        return ZoneError::AccessDenied.into_response();
    }

    next.run(request).await
}
