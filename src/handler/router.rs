//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: path dispatch, body reading,
//! error mapping and access logging.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};

use super::error::ApiError;
use super::items::{self, Reply};
use super::validation::{parse_item_body, parse_item_id};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::store::ItemFields;

/// Where a path points, before the method is considered
#[derive(Debug, PartialEq, Eq)]
enum Route {
    /// `/items`
    Collection,
    /// `/items/<raw id>`
    Member(String),
    Unmatched,
}

fn resolve_route(path: &str) -> Route {
    match path.strip_prefix("/items") {
        Some("") => Route::Collection,
        Some(rest) => match rest.strip_prefix('/') {
            Some(id) if !id.contains('/') => Route::Member(id.to_string()),
            _ => Route::Unmatched,
        },
        None => Route::Unmatched,
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let server_name = state.config.http.server_name.as_str();
    let entry = state
        .access_log_enabled()
        .then(|| access_entry(&req, remote_addr));
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = if method == Method::OPTIONS {
        http::build_options_response(server_name)
    } else {
        match dispatch(req, &state).await {
            Ok(reply) => http::build_json_response(reply.status, &reply.body, server_name),
            Err(err) => {
                if let ApiError::Storage(cause) = &err {
                    logger::log_error(&format!("Storage failure on {method} {path}: {cause}"));
                }
                http::build_json_response(err.status(), &err.body(), server_name)
            }
        }
    };

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Match method and route, then run the item handler
async fn dispatch<B>(req: Request<B>, state: &AppState) -> Result<Reply, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let store = state.store.as_ref();
    let max_body_size = state.config.http.max_body_size;
    let route = resolve_route(req.uri().path());
    let method = req.method().clone();

    match (method, route) {
        (Method::GET, Route::Collection) => items::list_items(store),
        (Method::POST, Route::Collection) => {
            let fields = read_item_body(req, max_body_size).await?;
            items::create_item(store, fields)
        }
        (Method::GET, Route::Member(raw)) => items::get_item(store, parse_item_id(&raw)?),
        (Method::PUT, Route::Member(raw)) => {
            let id = parse_item_id(&raw)?;
            let fields = read_item_body(req, max_body_size).await?;
            items::update_item(store, id, fields)
        }
        (Method::DELETE, Route::Member(raw)) => items::delete_item(store, parse_item_id(&raw)?),
        _ => Err(ApiError::RouteNotFound),
    }
}

/// Read the whole body under the size limit and validate it as item fields
async fn read_item_body<B>(req: Request<B>, max_body_size: u64) -> Result<ItemFields, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(size) = declared_content_length(&req) {
        if size > max_body_size {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            return Err(ApiError::PayloadTooLarge);
        }
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!(
                "Request body exceeded {max_body_size} bytes while streaming"
            ));
            return Err(ApiError::PayloadTooLarge);
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(ApiError::BodyRead);
        }
    };

    parse_item_body(&body)
}

/// Content-Length header value, if present and well formed
fn declared_content_length<B>(req: &Request<B>) -> Option<u64> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) => Some(size),
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
        },
    )
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}
