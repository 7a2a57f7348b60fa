//! User service: `GET /user/{id}` and `POST /user` with `create`, `update` and `delete`.

use super::{command, decode_request, optional_text, required_text, WireResponse};
use crate::clients::UserClient;
use crate::model::{User, UserCreate, UserDelete, UserId, UserUpdate};
use crate::user_actor::UserError;
use crate::wire::FlatObject;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use store_actor::EntityClient;
use tracing::{error, info};

pub fn router(users: UserClient) -> Router {
    Router::new()
        .route("/user/{id}", get(get_user))
        .route("/user", post(post_user))
        .with_state(users)
}

fn user_to_wire(user: &User) -> FlatObject {
    FlatObject::new()
        .with_int("id", user.id.0)
        .with_text("username", user.username.clone())
        .with_text("email", user.email.clone())
        .with_text("password", user.password.clone())
}

fn error_response(e: UserError) -> WireResponse {
    let status = match &e {
        UserError::NotFound(_) | UserError::Mismatch(_) => StatusCode::NOT_FOUND,
        UserError::AlreadyExists(_) => StatusCode::CONFLICT,
        UserError::ValidationError(_) => StatusCode::BAD_REQUEST,
        UserError::ActorCommunicationError(_) => {
            error!(error = %e, "User store unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    WireResponse::empty(status)
}

/// `email` must be sent as a JSON string.
fn email_text(body: &FlatObject) -> Result<(), WireResponse> {
    match body.get("email") {
        Some(value) if !value.is_text() => Err(WireResponse::bad_request()),
        _ => Ok(()),
    }
}

async fn get_user(State(users): State<UserClient>, Path(id): Path<String>) -> WireResponse {
    let Ok(id) = id.trim().parse::<i64>() else {
        return WireResponse::bad_request();
    };
    match users.find(UserId(id)).await {
        Ok(Some(user)) => WireResponse::ok(user_to_wire(&user)),
        Ok(None) => WireResponse::empty(StatusCode::NOT_FOUND),
        Err(e) => error_response(e),
    }
}

async fn post_user(State(users): State<UserClient>, body: Bytes) -> WireResponse {
    handle_post(&users, &body)
        .await
        .unwrap_or_else(|response| response)
}

async fn handle_post(users: &UserClient, bytes: &[u8]) -> Result<WireResponse, WireResponse> {
    let body = decode_request(bytes)?;
    let command = command(&body)?;
    let id = UserId(body.parse("id")?);

    match command.as_str() {
        "create" => {
            email_text(&body)?;
            let params = UserCreate {
                username: required_text(&body, "username")?,
                email: required_text(&body, "email")?,
                password: required_text(&body, "password")?,
            };
            let user = users.create_user(id, params).await.map_err(error_response)?;
            info!(user_id = %id, "User created");
            Ok(WireResponse::ok(user_to_wire(&user)))
        }
        "update" => {
            email_text(&body)?;
            let update = UserUpdate {
                username: optional_text(&body, "username")?,
                email: optional_text(&body, "email")?,
                password: optional_text(&body, "password")?,
            };
            let user = users.update_user(id, update).await.map_err(error_response)?;
            info!(user_id = %id, "User updated");
            Ok(WireResponse::ok(user_to_wire(&user)))
        }
        "delete" => {
            let confirm = UserDelete {
                username: required_text(&body, "username")?,
                email: required_text(&body, "email")?,
                password: required_text(&body, "password")?,
            };
            users.delete(id, confirm).await.map_err(error_response)?;
            info!(user_id = %id, "User deleted");
            Ok(WireResponse::ok(FlatObject::new()))
        }
        _ => Err(WireResponse::bad_request()),
    }
}
