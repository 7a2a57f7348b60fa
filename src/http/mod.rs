//! # HTTP Surfaces
//!
//! `axum` routers for the three services. Handlers read the raw body, decode it with the
//! [wire codec](crate::wire) and answer with a [`WireResponse`]. Each service runs behind a
//! `tower` concurrency limit.
//!
//! - [`order::router`]: `POST /order`
//! - [`user::router`]: `GET /user/{id}`, `POST /user`
//! - [`product::router`]: `GET /product/{id}`, `POST /product`

pub mod order;
pub mod product;
pub mod user;

use crate::wire::{self, FieldError, FlatObject};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tracing::{debug, info};

/// A status code and an optional flat JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    pub status: StatusCode,
    pub body: Option<FlatObject>,
}

impl WireResponse {
    pub fn new(status: StatusCode, body: FlatObject) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn ok(body: FlatObject) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// A response with no body.
    pub fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    /// Status codes arrive as `u16` from the protocol types; anything invalid is a 500.
    pub fn from_code(code: u16, body: FlatObject) -> Self {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, body)
    }

    pub fn bad_request() -> Self {
        Self::empty(StatusCode::BAD_REQUEST)
    }
}

impl From<FieldError> for WireResponse {
    fn from(e: FieldError) -> Self {
        debug!(error = %e, "Rejecting request");
        Self::bad_request()
    }
}

impl IntoResponse for WireResponse {
    fn into_response(self) -> Response {
        let body = self.body.as_ref().map(wire::encode).unwrap_or_default();
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

/// Decode a request body, answering 400 when it is not a flat object.
pub fn decode_request(bytes: &[u8]) -> Result<FlatObject, WireResponse> {
    wire::decode(bytes).map_err(|e| {
        debug!(error = %e, "Rejecting malformed body");
        WireResponse::bad_request()
    })
}

/// The `command` field of a body, as text.
pub fn command(body: &FlatObject) -> Result<String, WireResponse> {
    body.get_str("command")
        .map(|c| c.into_owned())
        .ok_or_else(WireResponse::bad_request)
}

/// A text field that must be present and non-blank.
pub fn required_text(body: &FlatObject, key: &str) -> Result<String, WireResponse> {
    match body.get_str(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.into_owned()),
        _ => Err(WireResponse::bad_request()),
    }
}

/// Like [`required_text`], but an absent field is `Ok(None)`.
pub fn optional_text(body: &FlatObject, key: &str) -> Result<Option<String>, WireResponse> {
    if body.contains_key(key) {
        required_text(body, key).map(Some)
    } else {
        Ok(None)
    }
}

/// Serve `router` on `listener` until `shutdown` resolves, admitting at most
/// `max_concurrent_requests` requests at a time.
pub async fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    max_concurrent_requests: usize,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    // One semaphore shared by every route of the service.
    let router = router.layer(GlobalConcurrencyLimitLayer::new(max_concurrent_requests.max(1)));
    info!(service = name, addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!(service = name, "Stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_must_not_be_blank() {
        let body = FlatObject::new()
            .with_text("name", "lamp")
            .with_text("description", "  ");
        assert_eq!(required_text(&body, "name"), Ok("lamp".to_string()));
        assert_eq!(
            required_text(&body, "description"),
            Err(WireResponse::bad_request())
        );
        assert_eq!(optional_text(&body, "email"), Ok(None));
    }

    #[test]
    fn malformed_body_is_bad_request() {
        assert_eq!(
            decode_request(br#"{"a":{"b":1}}"#),
            Err(WireResponse::bad_request())
        );
    }
}
