//! Order service: `POST /order`.

use super::{decode_request, WireResponse};
use crate::orchestrator::{OrderError, OrderOrchestrator, OrderResult};
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::Router;

pub fn router(orchestrator: OrderOrchestrator) -> Router {
    Router::new()
        .route("/order", post(place_order))
        .with_state(orchestrator)
}

async fn place_order(State(orchestrator): State<OrderOrchestrator>, body: Bytes) -> WireResponse {
    let result = match decode_request(&body) {
        Ok(body) => orchestrator.place(&body).await,
        Err(_) => OrderResult::Rejected {
            reason: OrderError::Validation("malformed body".into()),
        },
    };
    WireResponse::from_code(result.status_code(), result.to_wire())
}
