//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    middleware::Next,
    response::Response,
};

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a text body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Bodies that are not UTF-8 text, such as chart images, are logged by
/// their length only.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = read_body(body).await;
    tracing::info!("Received request: {parts:#?}\nbody: {}", describe_body(&body));
    log_full_body("request", &body);

    let request = Request::from_parts(parts, Body::from(body));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body = read_body(body).await;
    tracing::info!("Sending response: {parts:#?}\nbody: {}", describe_body(&body));
    log_full_body("response", &body);

    Response::from_parts(parts, Body::from(body))
}

async fn read_body(body: Body) -> Bytes {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read body for logging: {error}");
            Bytes::new()
        }
    }
}

fn describe_body(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => match text.char_indices().nth(LOG_BODY_LENGTH_LIMIT) {
            Some((end, _)) => format!("{}...", &text[..end]),
            None => format!("{text:?}"),
        },
        Err(_) => format!("<{} bytes of binary data>", body.len()),
    }
}

fn log_full_body(direction: &str, body: &[u8]) {
    if let Ok(text) = std::str::from_utf8(body) {
        if text.chars().count() > LOG_BODY_LENGTH_LIMIT {
            tracing::debug!("Full {direction} body: {text:?}");
        }
    }
}
