//! Product service: `GET /product/{id}` and `POST /product` with `create`, `update`,
//! `delete` and the token-gated `reserve`.
//!
//! A product's token is its store version (`t0` when created). `reserve` hands the expected
//! token to the store as a guarded action, so the check and the stock change happen in one
//! actor message.

use super::{command, decode_request, optional_text, required_text, WireResponse};
use crate::clients::ProductClient;
use crate::model::{Product, ProductCreate, ProductDelete, ProductId, ProductUpdate};
use crate::product_actor::ProductError;
use crate::reservation::{ReserveCommand, ReserveReply, StockToken};
use crate::wire::FlatObject;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use store_actor::{EntityClient, Version, Versioned};
use tracing::{error, info, warn};

pub fn router(products: ProductClient) -> Router {
    Router::new()
        .route("/product/{id}", get(get_product))
        .route("/product", post(post_product))
        .with_state(products)
}

fn product_to_wire(product: &Versioned<Product>) -> FlatObject {
    let Versioned { value, version } = product;
    FlatObject::new()
        .with_int("id", value.id.0)
        .with_text("name", value.name.clone())
        .with_text("description", value.description.clone())
        .with_float("price", value.price)
        .with_int("quantity", value.quantity)
        .with_text("token", version.to_string())
}

fn error_response(e: ProductError) -> WireResponse {
    let status = match &e {
        ProductError::NotFound(_) | ProductError::Mismatch(_) => StatusCode::NOT_FOUND,
        ProductError::AlreadyExists(_)
        | ProductError::VersionConflict { .. }
        | ProductError::InsufficientStock { .. } => StatusCode::CONFLICT,
        ProductError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ProductError::ActorCommunicationError(_) => {
            error!(error = %e, "Product store unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    WireResponse::empty(status)
}

async fn get_product(
    State(products): State<ProductClient>,
    Path(id): Path<String>,
) -> WireResponse {
    let Ok(id) = id.trim().parse::<i64>() else {
        return WireResponse::bad_request();
    };
    match products.get(ProductId(id)).await {
        Ok(Some(product)) => WireResponse::ok(product_to_wire(&product)),
        Ok(None) => WireResponse::empty(StatusCode::NOT_FOUND),
        Err(e) => error_response(e),
    }
}

async fn post_product(State(products): State<ProductClient>, body: Bytes) -> WireResponse {
    handle_post(&products, &body)
        .await
        .unwrap_or_else(|response| response)
}

async fn handle_post(
    products: &ProductClient,
    bytes: &[u8],
) -> Result<WireResponse, WireResponse> {
    let body = decode_request(bytes)?;
    let command = command(&body)?;
    let id = ProductId(body.parse("id")?);

    match command.as_str() {
        "create" => {
            let params = ProductCreate {
                name: required_text(&body, "name")?,
                description: required_text(&body, "description")?,
                price: body.parse("price")?,
                quantity: body.parse("quantity")?,
            };
            let product = products
                .create_product(id, params)
                .await
                .map_err(error_response)?;
            info!(product_id = %id, "Product created");
            Ok(WireResponse::ok(product_to_wire(&product)))
        }
        "update" => {
            let update = ProductUpdate {
                name: optional_text(&body, "name")?,
                description: optional_text(&body, "description")?,
                price: body.parse_optional("price")?,
                quantity: body.parse_optional("quantity")?,
            };
            let product = products
                .update_product(id, update)
                .await
                .map_err(error_response)?;
            info!(product_id = %id, token = %product.version, "Product updated");
            Ok(WireResponse::ok(product_to_wire(&product)))
        }
        "delete" => {
            let confirm = ProductDelete {
                name: required_text(&body, "name")?,
                description: optional_text(&body, "description")?,
                price: body.parse("price")?,
                quantity: body.parse("quantity")?,
            };
            products.delete(id, confirm).await.map_err(error_response)?;
            info!(product_id = %id, "Product deleted");
            Ok(WireResponse::ok(FlatObject::new()))
        }
        ReserveCommand::NAME => reserve(products, ReserveCommand::from_wire(&body)?).await,
        _ => Err(WireResponse::bad_request()),
    }
}

async fn reserve(
    products: &ProductClient,
    command: ReserveCommand,
) -> Result<WireResponse, WireResponse> {
    let id = ProductId(command.id);
    // A token this service never issued cannot match the current one.
    let Ok(expected) = command.expected_token.0.parse::<Version>() else {
        warn!(product_id = %id, token = %command.expected_token, "Unknown token");
        return stale_token(products, id).await;
    };

    let reply = match products.reserve_stock(id, expected, command.delta).await {
        Ok(reserved) => {
            info!(product_id = %id, quantity = reserved.value, token = %reserved.version, "Stock reserved");
            ReserveReply::Applied {
                id: command.id,
                quantity: reserved.value,
                token: StockToken(reserved.version.to_string()),
            }
        }
        Err(ProductError::VersionConflict {
            expected,
            current,
            quantity: Some(quantity),
        }) => {
            info!(product_id = %id, %expected, %current, "Stale token");
            ReserveReply::Conflict {
                id: command.id,
                quantity,
                token: StockToken(current.to_string()),
            }
        }
        Err(ProductError::VersionConflict { expected, current, .. }) => {
            info!(product_id = %id, %expected, %current, "Stale token");
            return stale_token(products, id).await;
        }
        // The guard held, so the product is still at the expected version.
        Err(ProductError::InsufficientStock {
            requested,
            available,
        }) => {
            info!(product_id = %id, requested, available, "Insufficient stock");
            ReserveReply::Exceeded {
                id: command.id,
                quantity: available,
                token: StockToken(expected.to_string()),
            }
        }
        Err(e) => return Err(error_response(e)),
    };
    Ok(WireResponse::from_code(reply.status_code(), reply.to_wire()))
}

/// A `Conflict` 409 carrying the quantity and token read back from the store.
async fn stale_token(products: &ProductClient, id: ProductId) -> Result<WireResponse, WireResponse> {
    let current = products
        .get(id)
        .await
        .map_err(error_response)?
        .ok_or_else(|| WireResponse::empty(StatusCode::NOT_FOUND))?;
    let reply = ReserveReply::Conflict {
        id: current.value.id.0,
        quantity: current.value.quantity,
        token: StockToken(current.version.to_string()),
    };
    Ok(WireResponse::from_code(reply.status_code(), reply.to_wire()))
}
