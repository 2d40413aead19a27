//! Static file serving for the control page.
//!
//! The page is embedded in the binary so the controller needs nothing but
//! its config file on the device.

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::Path;

/// Embedded control page assets from the `web` directory.
#[derive(Embed)]
#[folder = "web"]
pub struct StaticAssets;

/// Serves static files with an `index.html` fallback.
///
/// This handler:
/// 1. Serves `index.html` for `/`
/// 2. Serves the exact requested path if it is embedded
/// 3. Returns 404 for missing files and for unknown `/api/` paths
/// 4. Serves `index.html` for any other path
pub async fn serve_static(request: Request) -> Response {
    let path = request.uri().path().trim_start_matches('/');

    if path.is_empty() {
        return serve_file("index.html");
    }

    if let Some(content) = StaticAssets::get(path) {
        return file_response(path, content.data.as_ref());
    }

    let looks_like_file = Path::new(path)
        .extension()
        .is_some_and(|ext| !ext.is_empty());

    if looks_like_file || path.starts_with("api/") {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    serve_file("index.html")
}

/// Serves a specific file from embedded assets.
fn serve_file(path: &str) -> Response {
    match StaticAssets::get(path) {
        Some(content) => file_response(path, content.data.as_ref()),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Creates an HTTP response for a file with appropriate content type.
fn file_response(path: &str, content: &[u8]) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, cache_control_for_path(path))
        .body(Body::from(content.to_vec()))
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create response",
            )
                .into_response()
        })
}

/// Returns the Cache-Control header for a path.
///
/// HTML always revalidates so a new release is picked up on the next load;
/// scripts and styles are cached for an hour.
fn cache_control_for_path(path: &str) -> &'static str {
    if Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    {
        "no-cache, must-revalidate"
    } else {
        "public, max-age=3600"
    }
}
