//! [`Directory`] over HTTP with `reqwest`.

use super::{command_body, Directory, LookupOutcome, MutateOutcome, Service};
use crate::wire::{self, FlatObject};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Calls the User and Product services at fixed base URLs (`http://ip:port`).
#[derive(Clone)]
pub struct HttpDirectory {
    client: Client,
    user_base: String,
    product_base: String,
}

impl HttpDirectory {
    /// Every request made through the directory is bounded by `timeout`.
    pub fn new(
        user_base: impl Into<String>,
        product_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            user_base: user_base.into(),
            product_base: product_base.into(),
        })
    }

    fn base(&self, service: Service) -> &str {
        match service {
            Service::User => &self.user_base,
            Service::Product => &self.product_base,
        }
    }
}

#[async_trait]
impl Directory for HttpDirectory {
    #[instrument(skip(self))]
    async fn lookup(&self, service: Service, id: i64) -> LookupOutcome {
        let url = format!("{}/{}/{}", self.base(service), service.path(), id);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "Lookup failed");
                return LookupOutcome::Unreachable;
            }
        };

        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return LookupOutcome::NotFound,
            other => return LookupOutcome::Unexpected(other.as_u16()),
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, error = %e, "Lookup body could not be read");
                return LookupOutcome::Unreachable;
            }
        };
        if body.iter().all(u8::is_ascii_whitespace) {
            return LookupOutcome::Found(FlatObject::new());
        }
        match wire::decode(&body) {
            Ok(attributes) => {
                debug!(%attributes, "Lookup ok");
                LookupOutcome::Found(attributes)
            }
            Err(e) => {
                warn!(%url, error = %e, "Lookup returned a malformed body");
                LookupOutcome::Unexpected(status.as_u16())
            }
        }
    }

    #[instrument(skip(self, payload))]
    async fn mutate(
        &self,
        service: Service,
        id: i64,
        command: &str,
        payload: FlatObject,
    ) -> MutateOutcome {
        let url = format!("{}/{}", self.base(service), service.path());
        let body = wire::encode(&command_body(command, id, &payload));
        let sent = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "Mutation failed");
                return MutateOutcome::Unreachable;
            }
        };

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CONFLICT {
            return MutateOutcome::Rejected(status.as_u16());
        }

        let attributes = match response.bytes().await {
            Ok(body) if body.iter().all(u8::is_ascii_whitespace) => None,
            Ok(body) => match wire::decode(&body) {
                Ok(attributes) => Some(attributes),
                Err(e) => {
                    warn!(%url, error = %e, %status, "Mutation reply is not a flat object");
                    None
                }
            },
            Err(e) => {
                warn!(%url, error = %e, "Mutation reply could not be read");
                return MutateOutcome::Unreachable;
            }
        };

        if status == StatusCode::CONFLICT {
            debug!(?attributes, "Mutation conflicted");
            MutateOutcome::Conflict(attributes)
        } else {
            MutateOutcome::Applied(attributes.unwrap_or_default())
        }
    }
}
