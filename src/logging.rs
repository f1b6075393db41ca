//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a body that are logged at the `info` level.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full text is logged at the `debug` level.
///
/// Bodies that are not text, such as photo uploads, zip archives and images,
/// are passed through untouched and only their headers are logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let request = if is_text(&parts.headers) {
        let Ok(body_bytes) = axum::body::to_bytes(body, usize::MAX).await else {
            tracing::error!("Could not read the body of the request to {}", parts.uri);
            return StatusCode::BAD_REQUEST.into_response();
        };

        log_request(&parts, &String::from_utf8_lossy(&body_bytes));
        Request::from_parts(parts, Body::from(body_bytes))
    } else {
        log_request(&parts, "<binary>");
        Request::from_parts(parts, body)
    };

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();

    if !is_text(&parts.headers) {
        log_response(&parts, "<binary>");
        return Response::from_parts(parts, body);
    }

    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body_bytes) => {
            log_response(&parts, &String::from_utf8_lossy(&body_bytes));
            Response::from_parts(parts, Body::from(body_bytes))
        }
        Err(error) => {
            tracing::error!("Could not read the response body: {error}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Whether a body with these headers is safe to log as text.
///
/// A missing content type is treated as text since it is used for empty
/// bodies such as GET requests and redirects.
fn is_text(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return true;
    };

    content_type.starts_with("text/")
        || content_type.starts_with("application/x-www-form-urlencoded")
        || content_type.starts_with("application/json")
}

/// Cut `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}
