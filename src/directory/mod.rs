//! # Directory Client
//!
//! How the order orchestrator talks to the collaborator services. A [`Directory`] offers two
//! calls, both over the flat wire format:
//!
//! - [`Directory::lookup`]: `GET /{service}/{id}`
//! - [`Directory::mutate`]: `POST /{service}` with a command body
//!
//! Transport failures, timeouts and status codes are folded into [`LookupOutcome`] and
//! [`MutateOutcome`] so the caller decides what each one means. A 409 from a mutation is
//! always reported as [`MutateOutcome::Conflict`], never as a generic rejection. This layer
//! does not retry.

pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpDirectory;

use crate::wire::FlatObject;
use async_trait::async_trait;
use std::fmt::{self, Display};

/// A collaborator service reachable through a [`Directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    User,
    Product,
}

impl Service {
    /// The path segment the service is mounted at.
    pub fn path(self) -> &'static str {
        match self {
            Service::User => "user",
            Service::Product => "product",
        }
    }
}

impl Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Result of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// 200. An empty body is an empty attribute set.
    Found(FlatObject),
    /// 404.
    NotFound,
    /// Transport error or timeout.
    Unreachable,
    /// Any other status, or a 200 whose body is not a flat object.
    Unexpected(u16),
}

/// Result of a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutateOutcome {
    /// 200 with the attributes the service reported.
    Applied(FlatObject),
    /// 409, carrying the service's view of the current state when it sent one.
    Conflict(Option<FlatObject>),
    /// Any other status.
    Rejected(u16),
    /// Transport error or timeout.
    Unreachable,
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn lookup(&self, service: Service, id: i64) -> LookupOutcome;

    /// Send `command` for entity `id`. The body is `command` and `id` followed by `payload`.
    async fn mutate(
        &self,
        service: Service,
        id: i64,
        command: &str,
        payload: FlatObject,
    ) -> MutateOutcome;
}

/// The body a mutation sends: `command`, `id`, then the payload fields in order.
pub fn command_body(command: &str, id: i64, payload: &FlatObject) -> FlatObject {
    let mut body = FlatObject::new().with_text("command", command).with_int("id", id);
    for (key, value) in payload.iter() {
        body.insert(key, value.clone());
    }
    body
}
