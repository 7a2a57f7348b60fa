//! # Stock Reservation Protocol
//!
//! A product's stock may only be decremented for an order through the `reserve` command:
//!
//! ```text
//! POST /product {"command":"reserve","id":7,"delta":-3,"expected_token":"t0"}
//! ```
//!
//! The Product service applies `quantity += delta` only while the product is still at
//! `expected_token`, and advances the token in the same step. Replies are described by
//! [`ReserveReply`]. Because a consumed token never matches again, replaying a reserve is
//! answered with a conflict and cannot decrement twice.
//!
//! The orchestrator side of the protocol is the [`ProductSnapshot`] it observed, the
//! [`ReserveCommand`] built from it, and the [`RetryPolicy`] applied on conflicts.

use crate::wire::{FieldError, FlatObject};
use std::fmt::{self, Display};
use std::time::Duration;

/// Status sent with a 409 when the token did not match.
pub const STATUS_CONFLICT: &str = "Conflict";
/// Status sent with a 409 when the stock cannot cover the request.
pub const STATUS_EXCEEDED: &str = "Exceeded quantity limit";

/// Opaque concurrency token of a product, as seen on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StockToken(pub String);

impl Display for StockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a product lookup showed at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: i64,
    pub quantity: i64,
    pub token: StockToken,
}

impl ProductSnapshot {
    /// Read `id`, `quantity` and `token` from a product lookup.
    pub fn from_wire(attributes: &FlatObject) -> Result<Self, FieldError> {
        let token = attributes
            .get_str("token")
            .ok_or_else(|| FieldError::Missing("token".into()))?;
        if token.trim().is_empty() {
            return Err(FieldError::Invalid {
                key: "token".into(),
                value: token.into_owned(),
            });
        }
        Ok(Self {
            id: attributes.parse("id")?,
            quantity: attributes.parse("quantity")?,
            token: StockToken(token.into_owned()),
        })
    }
}

/// A token-gated stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveCommand {
    pub id: i64,
    pub delta: i64,
    pub expected_token: StockToken,
}

impl ReserveCommand {
    pub const NAME: &'static str = "reserve";

    /// The reservation that takes `quantity` units of product `id`, gated on `snapshot`.
    pub fn take(id: i64, snapshot: &ProductSnapshot, quantity: i64) -> Self {
        Self {
            id,
            delta: -quantity,
            expected_token: snapshot.token.clone(),
        }
    }

    /// Fields sent after `command` and `id`.
    pub fn payload(&self) -> FlatObject {
        FlatObject::new()
            .with_int("delta", self.delta)
            .with_text("expected_token", self.expected_token.0.clone())
    }

    /// Parse a `reserve` body as received by the Product service.
    pub fn from_wire(body: &FlatObject) -> Result<Self, FieldError> {
        let expected_token = body
            .get_str("expected_token")
            .ok_or_else(|| FieldError::Missing("expected_token".into()))?;
        Ok(Self {
            id: body.parse("id")?,
            delta: body.parse("delta")?,
            expected_token: StockToken(expected_token.into_owned()),
        })
    }
}

/// The Product service's answer to a [`ReserveCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveReply {
    /// 200: the adjustment was applied and the token advanced.
    Applied {
        id: i64,
        quantity: i64,
        token: StockToken,
    },
    /// 409: the expected token is not the current one. Carries the current state.
    Conflict {
        id: i64,
        quantity: i64,
        token: StockToken,
    },
    /// 409: the token matched but the stock would go negative. Nothing changed.
    Exceeded {
        id: i64,
        quantity: i64,
        token: StockToken,
    },
}

impl ReserveReply {
    pub fn status_code(&self) -> u16 {
        match self {
            ReserveReply::Applied { .. } => 200,
            ReserveReply::Conflict { .. } | ReserveReply::Exceeded { .. } => 409,
        }
    }

    pub fn to_wire(&self) -> FlatObject {
        let (status, id, quantity, token) = match self {
            ReserveReply::Applied {
                id,
                quantity,
                token,
            } => (None, id, quantity, token),
            ReserveReply::Conflict {
                id,
                quantity,
                token,
            } => (Some(STATUS_CONFLICT), id, quantity, token),
            ReserveReply::Exceeded {
                id,
                quantity,
                token,
            } => (Some(STATUS_EXCEEDED), id, quantity, token),
        };
        let mut body = FlatObject::new();
        if let Some(status) = status {
            body = body.with_text("status", status);
        }
        body.with_int("id", *id)
            .with_int("quantity", *quantity)
            .with_text("token", token.0.clone())
    }
}

/// Current quantity reported in a 409 reply, if it carried one.
pub fn reported_quantity(reply: Option<&FlatObject>) -> Option<i64> {
    reply.and_then(|body| body.parse("quantity").ok())
}

/// How often the orchestrator re-runs lookup and reserve after a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total reserve attempts, including the first. At least 1.
    pub max_attempts: u32,
    /// Pause before each retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::ZERO)
    }
}
