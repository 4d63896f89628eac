//! HTTP request handlers.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::Method,
};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::api::types::{Reply, SaveResponse};
use crate::assets::INDEX_FILE;
use crate::error::{ZoneError, ZoneResult};
use crate::AppState;

/// Placeholder in the index page replaced by the configured colour.
pub const ZONE_COLOUR_PLACEHOLDER: &str = "{{ ZONE_COLOUR }}";

/// Render the editor page with the zone colour filled in.
///
/// GET /
pub async fn index(State(state): State<AppState>) -> ZoneResult<Reply> {
    let path = state.settings.paths.asset_root.join(INDEX_FILE);

    let template = match tokio::fs::read_to_string(&path).await {
        Ok(template) => template,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ZoneError::NotFound("/".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Reply::html(render_index(&template, &state.settings.zone_colour)))
}

/// Substitute the colour, quoted, for every placeholder occurrence.
pub fn render_index(template: &str, zone_colour: &str) -> String {
    template.replace(ZONE_COLOUR_PLACEHOLDER, &format!("\"{zone_colour}\""))
}

/// Stream a static asset from the route table.
///
/// GET /<static path>
pub async fn static_asset(State(state): State<AppState>, request: Request<Body>) -> ZoneResult<Reply> {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return Err(ZoneError::MethodNotAllowed);
    }

    // The table holds file-system names, so match against the decoded path.
    let raw = request.uri().path();
    let path = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| ZoneError::NotFound(raw.to_string()))?;
    let file = state
        .assets
        .resolve(&path)
        .ok_or_else(|| ZoneError::NotFound(raw.to_string()))?
        .to_path_buf();

    tracing::debug!(path = %path, file = %file.display(), "Serving static asset");

    // A file removed since startup comes back as 404 from ServeFile.
    let response = ServeFile::new(file)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    Ok(Reply::static_file(response.map(Body::new)))
}

/// Return the current zone document.
///
/// GET /zones.json
pub async fn zones_json(State(state): State<AppState>) -> ZoneResult<Reply> {
    let document = state.zones.read().await?;

    Ok(Reply::uncached_json(document))
}

/// Replace the zone document with the request body.
///
/// POST /save_zones
pub async fn save_zones(State(state): State<AppState>, body: Bytes) -> ZoneResult<Reply> {
    let document: serde_json::Value =
        serde_json::from_slice(&body).map_err(ZoneError::MalformedBody)?;

    state.zones.replace(&document).await?;

    Ok(Reply::json(
        axum::http::StatusCode::OK,
        serde_json::json!(SaveResponse::ok()),
    ))
}
