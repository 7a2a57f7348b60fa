//! Error types for order placement.

use thiserror::Error;

/// Why an order was not placed. Each variant has a fixed wire status and HTTP code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The request is not a well-formed `place order` command.
    #[error("Invalid order request: {0}")]
    Validation(String),

    /// The user or product does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A collaborator did not answer in time.
    #[error("Service unreachable: {0}")]
    Unreachable(String),

    /// A collaborator answered with something the protocol does not allow.
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    /// The stock cannot cover the requested quantity.
    #[error("Exceeded quantity limit: requested {requested}, available {available}")]
    Capacity { requested: i64, available: i64 },

    /// Every reservation attempt lost a race with another writer.
    #[error("Reservation conflicted {attempts} times")]
    ReservationConflict { attempts: u32 },

    /// The Product service refused the reservation for a reason other than a conflict.
    #[error("Reservation rejected with status {0}")]
    ReservationRejected(u16),
}

impl OrderError {
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::NotFound(_) => 404,
            OrderError::Capacity { .. } | OrderError::ReservationConflict { .. } => 409,
            OrderError::Validation(_)
            | OrderError::Unreachable(_)
            | OrderError::UnexpectedReply(_)
            | OrderError::ReservationRejected(_) => 400,
        }
    }

    /// The `status` string sent to the caller.
    pub fn status(&self) -> &'static str {
        match self {
            OrderError::Capacity { .. } => "Exceeded quantity limit",
            OrderError::ReservationConflict { .. } => "Conflict",
            _ => "Invalid Request",
        }
    }
}
