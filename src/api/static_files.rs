//! Static frontend hosting
//!
//! Serves the bundled single-page frontend from the configured build
//! directory. Unmatched routes fall back to index.html so client-side
//! routing keeps working. The fallback is only registered when the
//! directory exists; without it, non-API paths get a plain 404.

use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::Response,
};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Serve a file from the frontend bundle, falling back to index.html
/// for unmatched (client-routed) paths.
pub async fn serve_spa(root: PathBuf, uri: Uri) -> Response {
    let path = uri.path();
    // Decode percent-escapes so paths like /assets/logo%20dark.svg resolve
    let decoded = urlencoding::decode(path).unwrap_or_else(|_| path.into());
    let trimmed = decoded.trim_start_matches('/');

    if let Some(file_path) = sanitize_path(&root, trimmed) {
        if let Ok(contents) = fs::read(&file_path).await {
            return file_response(&file_path, contents);
        }
    }

    // SPA fallback: unmatched routes get the app shell
    let index = root.join("index.html");
    match fs::read(&index).await {
        Ok(contents) => file_response(&index, contents),
        Err(_) => not_found(),
    }
}

/// Resolve a request path inside the bundle root, rejecting traversal
fn sanitize_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    if request_path.is_empty() {
        return None;
    }

    let relative = Path::new(request_path);
    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            _ => return None,
        }
    }

    Some(root.join(relative))
}

fn file_response(path: &Path, contents: Vec<u8>) -> Response {
    let content_type = get_content_type(path);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(contents))
        .unwrap()
}

fn not_found() -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from("Not Found"))
        .unwrap()
}

/// Map a file extension to its content type
fn get_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
        .as_str()
    {
        "html" => "text/html; charset=utf-8",
        "js" => "application/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
