//! API request and response types.

use axum::{
    body::Body,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Body of the denial response sent for every gated route.
pub const NOT_ALLOWED: &str = "not allowed";

/// How a JSON reply may be cached by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// No caching headers are added.
    Default,
    /// Browsers must revalidate on every fetch.
    NoStore,
}

/// Every response the front can produce.
///
/// Each variant carries its own status code so dispatch never needs to
/// inspect what kind of body it is holding.
#[derive(Debug)]
pub enum Reply {
    /// A response streamed from a backing asset file.
    StaticFile { status: StatusCode, response: Response },
    PlainText { status: StatusCode, body: &'static str },
    Json {
        status: StatusCode,
        body: Value,
        cache: CachePolicy,
    },
    Html { status: StatusCode, body: String },
}

impl Reply {
    /// The fixed `403 not allowed` reply.
    pub fn not_allowed() -> Self {
        Reply::PlainText {
            status: StatusCode::FORBIDDEN,
            body: NOT_ALLOWED,
        }
    }

    pub fn static_file(response: Response) -> Self {
        Reply::StaticFile {
            status: response.status(),
            response,
        }
    }

    pub fn json(status: StatusCode, body: Value) -> Self {
        Reply::Json {
            status,
            body,
            cache: CachePolicy::Default,
        }
    }

    /// A `200` JSON reply the browser must always refetch.
    pub fn uncached_json(body: Value) -> Self {
        Reply::Json {
            status: StatusCode::OK,
            body,
            cache: CachePolicy::NoStore,
        }
    }

    pub fn html(body: String) -> Self {
        Reply::Html {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Reply::StaticFile { status, .. }
            | Reply::PlainText { status, .. }
            | Reply::Json { status, .. }
            | Reply::Html { status, .. } => *status,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::StaticFile {
                status,
                mut response,
            } => {
                *response.status_mut() = status;
                response
            }
            Reply::PlainText { status, body } => (status, body).into_response(),
            Reply::Json {
                status,
                body,
                cache,
            } => {
                let mut response = (status, Json(body)).into_response();
                if cache == CachePolicy::NoStore {
                    let headers = response.headers_mut();
                    headers.insert(
                        CACHE_CONTROL,
                        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
                    );
                    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
                    headers.insert(EXPIRES, HeaderValue::from_static("0"));
                }
                response
            }
            Reply::Html { status, body } => {
                let mut response = (status, Body::from(body)).into_response();
                response.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                );
                response
            }
        }
    }
}

/// Acknowledgment returned after the zones were saved.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: &'static str,
}

impl SaveResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}
