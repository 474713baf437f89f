//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};

/// Create a plain-text response with the given status code.
pub fn text_response(
    status: u16,
    message: impl Into<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    let message: String = message.into();
    let response = Response::builder()
        .status(status)
        .header("content-type", "text/plain; charset=utf-8")
        .body(Body::from(message))?;

    Ok(response)
}

/// 200 response announcing that `file_path` was updated.
pub fn success_response(file_path: &str) -> Result<Response<Body>, lambda_http::Error> {
    text_response(200, format!("✅ Success! {} updated on GitHub.", file_path))
}

/// 500 response carrying the underlying cause.
pub fn failure_response(
    cause: impl std::fmt::Display,
) -> Result<Response<Body>, lambda_http::Error> {
    text_response(500, format!("❌ Error: {}", cause))
}
