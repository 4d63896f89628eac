//! Route definitions for the HTTP front.

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::access::require_permitted_origin;
use crate::api::handlers;
use crate::AppState;

/// Largest zone document accepted by the save endpoint.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the router.
///
/// Everything except `/zones.json` sits behind the origin gate,
/// including the static asset fallback. `/zones.json` is open to any
/// origin since the editor may be loaded from elsewhere.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let gated_routes = Router::new()
        .route("/", get(handlers::index))
        .route(
            "/save_zones",
            post(handlers::save_zones).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .fallback(handlers::static_asset)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permitted_origin,
        ));

    let public_routes = Router::new().route("/zones.json", get(handlers::zones_json).layer(cors));

    gated_routes
        .merge(public_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::net::SocketAddr;
    use std::path::Path;
    use std::sync::Arc;

    use axum::{
        body::Body,
        extract::connect_info::MockConnectInfo,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::access::AccessPolicy;
    use crate::assets::RouteTable;
    use crate::config::{Paths, Settings};
    use crate::storage::{empty_collection, ZoneStore};

    const INGRESS: &str = "172.30.32.2:40000";
    const STRANGER: &str = "10.0.0.5:40000";

    struct Fixture {
        _dir: TempDir,
        state: AppState,
    }

    async fn fixture(allow_all_ips: bool) -> Fixture {
        crate::logging::init_test();

        let dir = tempfile::tempdir().unwrap();
        let asset_root = dir.path().join("static");
        std::fs::create_dir_all(asset_root.join("docs")).unwrap();
        std::fs::write(asset_root.join("index.html"), "<html>{{ ZONE_COLOUR }}</html>").unwrap();
        std::fs::write(asset_root.join("app.js"), "console.log('zones')").unwrap();
        std::fs::write(asset_root.join("docs/index.html"), "<p>docs</p>").unwrap();
        std::fs::write(asset_root.join("zones.json"), "{\"stale\": true}").unwrap();
        std::fs::write(asset_root.join("my map.png"), "png bytes").unwrap();
        std::fs::write(asset_root.join("café.js"), "let cafe = 1;").unwrap();

        let paths = Paths {
            asset_root: asset_root.clone(),
            zones_file: dir.path().join("data").join("zones.json"),
            options_file: dir.path().join("data").join("options.json"),
        };
        let settings = Settings {
            allow_all_ips,
            zone_colour: "red".to_string(),
            paths,
        };

        let zones = ZoneStore::new(settings.paths.zones_file.clone());
        zones.ensure_initialized().await.unwrap();
        let assets = RouteTable::build(&asset_root, OsStr::new("zones.json")).unwrap();

        let state = AppState {
            policy: AccessPolicy::from_settings(&settings),
            settings: Arc::new(settings),
            zones,
            assets: Arc::new(assets),
        };

        Fixture { _dir: dir, state }
    }

    async fn send(state: &AppState, from: &str, request: Request<Body>) -> Response {
        let peer: SocketAddr = from.parse().unwrap();
        build_router(state.clone())
            .layer(MockConnectInfo(peer))
            .oneshot(request)
            .await
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn save_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/save_zones")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_substitutes_colour() {
        let f = fixture(false).await;

        let response = send(&f.state, INGRESS, get_request("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert_eq!(body_string(response).await, "<html>\"red\"</html>");
    }

    #[tokio::test]
    async fn test_index_missing_is_not_found() {
        let f = fixture(false).await;
        std::fs::remove_file(f.state.settings.paths.asset_root.join("index.html")).unwrap();

        let response = send(&f.state, INGRESS, get_request("/")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_asset_served_to_ingress() {
        let f = fixture(false).await;

        let response = send(&f.state, INGRESS, get_request("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .contains("javascript"));
        assert_eq!(body_string(response).await, "console.log('zones')");
    }

    #[tokio::test]
    async fn test_directory_index_resolves() {
        let f = fixture(false).await;

        let dir = send(&f.state, INGRESS, get_request("/docs/")).await;
        let file = send(&f.state, INGRESS, get_request("/docs/index.html")).await;
        assert_eq!(dir.status(), StatusCode::OK);
        assert_eq!(file.status(), StatusCode::OK);
        assert_eq!(body_string(dir).await, body_string(file).await);
    }

    #[tokio::test]
    async fn test_percent_encoded_asset_names_resolve() {
        let f = fixture(true).await;

        let response = send(&f.state, STRANGER, get_request("/my%20map.png")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "png bytes");

        let response = send(&f.state, STRANGER, get_request("/caf%C3%A9.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "let cafe = 1;");
    }

    #[tokio::test]
    async fn test_invalid_utf8_path_is_not_found() {
        let f = fixture(true).await;

        let response = send(&f.state, STRANGER, get_request("/%FF%FE.js")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let f = fixture(false).await;

        let response = send(&f.state, INGRESS, get_request("/missing.css")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_vanished_file_is_not_found() {
        let f = fixture(false).await;
        std::fs::remove_file(f.state.settings.paths.asset_root.join("app.js")).unwrap();

        let response = send(&f.state, INGRESS, get_request("/app.js")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_asset_rejects_post() {
        let f = fixture(false).await;
        let request = Request::builder()
            .method("POST")
            .uri("/app.js")
            .body(Body::empty())
            .unwrap();

        let response = send(&f.state, INGRESS, request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_stranger_is_denied_everywhere_gated() {
        let f = fixture(false).await;

        for uri in ["/", "/app.js", "/docs/", "/missing.css"] {
            let response = send(&f.state, STRANGER, get_request(uri)).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
            assert_eq!(body_string(response).await, "not allowed");
        }

        let response = send(&f.state, STRANGER, save_request(r#"{"hijacked": true}"#)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_string(response).await, "not allowed");
        assert_eq!(f.state.zones.read().await.unwrap(), empty_collection());
    }

    #[tokio::test]
    async fn test_allow_all_permits_stranger() {
        let f = fixture(true).await;

        let response = send(&f.state, STRANGER, get_request("/app.js")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_zone_document_not_served_as_static() {
        let f = fixture(false).await;
        assert!(!f.state.assets.contains("/zones.json"));

        // the dedicated endpoint answers with the stored document, not the asset copy
        let response = send(&f.state, INGRESS, get_request("/zones.json")).await;
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, empty_collection());
    }

    #[tokio::test]
    async fn test_zones_json_is_public_and_uncached() {
        let f = fixture(false).await;

        let request = Request::builder()
            .uri("/zones.json")
            .header(header::ORIGIN, "http://editor.example")
            .body(Body::empty())
            .unwrap();
        let response = send(&f.state, STRANGER, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(headers[header::EXPIRES], "0");
        assert_eq!(headers[header::PRAGMA], "no-cache");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_zones_json_answers_preflight() {
        let f = fixture(false).await;
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/zones.json")
            .header(header::ORIGIN, "http://editor.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = send(&f.state, STRANGER, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap()
            .contains("GET"));
    }

    #[tokio::test]
    async fn test_save_then_fetch() {
        let f = fixture(false).await;
        let document = r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]},"properties":{}}]}"#;

        let response = send(&f.state, INGRESS, save_request(document)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let ack: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(ack, json!({"status": "ok"}));

        let response = send(&f.state, INGRESS, get_request("/zones.json")).await;
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        let fetched: Value = serde_json::from_str(&body_string(response).await).unwrap();
        let expected: Value = serde_json::from_str(document).unwrap();
        assert_eq!(fetched, expected);
    }

    #[tokio::test]
    async fn test_save_accepts_any_json_shape() {
        let f = fixture(true).await;

        let response = send(&f.state, STRANGER, save_request("[1, 2, 3]")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(f.state.zones.read().await.unwrap(), json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_malformed_body_leaves_store_untouched() {
        let f = fixture(false).await;

        let response = send(&f.state, INGRESS, save_request("{\"type\": ")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(f.state.zones.read().await.unwrap(), empty_collection());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_server_error() {
        let f = fixture(false).await;
        std::fs::write(f.state.zones.path(), "not json").unwrap();

        let response = send(&f.state, INGRESS, get_request("/zones.json")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_fresh_start_seeds_document() {
        let f = fixture(false).await;
        let raw = std::fs::read_to_string(Path::new(f.state.zones.path())).unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, json!({"type": "FeatureCollection", "features": []}));
    }
}
