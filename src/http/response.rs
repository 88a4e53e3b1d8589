//! HTTP response building module
//!
//! Every response leaves through here so that each one carries the CORS
//! headers and the configured `Server` header.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// CORS headers attached to every response
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

const INTERNAL_ERROR_BODY: &str = r#"{"error":"Internal server error"}"#;

fn base_builder(status: StatusCode, server_name: &str) -> Builder {
    CORS_HEADERS.iter().fold(
        Response::builder().status(status).header("Server", server_name),
        |builder, (name, value)| builder.header(*name, *value),
    )
}

/// Build JSON response
///
/// Serialization failures degrade to a bare 500.
pub fn build_json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let (status, json) = match serde_json::to_vec(body) {
        Ok(json) => (status, Bytes::from(json)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(INTERNAL_ERROR_BODY.as_bytes()),
            )
        }
    };

    base_builder(status, server_name)
        .header("Content-Type", "application/json")
        .header("Content-Length", json.len())
        .body(Full::new(json))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(INTERNAL_ERROR_BODY.as_bytes())))
        })
}

/// Build OPTIONS response (preflight request): 200, empty body
pub fn build_options_response(server_name: &str) -> Response<Full<Bytes>> {
    base_builder(StatusCode::OK, server_name)
        .header("Content-Length", 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
