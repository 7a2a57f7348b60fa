//! # Workload Driver
//!
//! Replays a workload file against running services, one request per line, printing the
//! status and body of every reply. Lines look like:
//!
//! ```text
//! USER create 1 ada ada@example.com secret
//! USER get 1
//! USER update 1 email:ada@example.org
//! USER delete 1 ada ada@example.org secret
//! PRODUCT create 7 lamp desk-lamp 9.5 5
//! PRODUCT info 7
//! PRODUCT update 7 quantity:8 price:10.0
//! PRODUCT delete 7 lamp 10.0 8
//! ORDER place 7 1 3
//! ```
//!
//! `ORDER place` takes the product id before the user id. Blank lines and lines starting
//! with `[` are skipped. USER and PRODUCT lines go straight to their service, ORDER lines to
//! the order service.

use crate::config::Config;
use crate::wire::{self, FlatObject};
use reqwest::{header, Client, Method};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Which service a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    User,
    Product,
    Order,
}

/// One request parsed from a workload line.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadRequest {
    pub target: Target,
    pub method: Method,
    pub path: String,
    pub body: Option<FlatObject>,
}

impl WorkloadRequest {
    fn get(target: Target, path: String) -> Self {
        Self {
            target,
            method: Method::GET,
            path,
            body: None,
        }
    }

    fn post(target: Target, path: &str, body: FlatObject) -> Self {
        Self {
            target,
            method: Method::POST,
            path: path.to_string(),
            body: Some(body),
        }
    }
}

struct Line<'a> {
    number: usize,
    words: Vec<&'a str>,
}

impl<'a> Line<'a> {
    fn error(&self, message: impl Into<String>) -> WorkloadError {
        WorkloadError::Parse {
            line: self.number,
            message: message.into(),
        }
    }

    fn word(&self, index: usize, name: &str) -> Result<&'a str, WorkloadError> {
        self.words
            .get(index)
            .copied()
            .ok_or_else(|| self.error(format!("missing {name}")))
    }

    fn int(&self, index: usize, name: &str) -> Result<i64, WorkloadError> {
        let word = self.word(index, name)?;
        word.parse()
            .map_err(|_| self.error(format!("{name} must be an integer, got {word:?}")))
    }

    fn float(&self, index: usize, name: &str) -> Result<f64, WorkloadError> {
        let word = self.word(index, name)?;
        word.parse()
            .map_err(|_| self.error(format!("{name} must be a number, got {word:?}")))
    }

    /// `key:value` pairs from `start` on.
    fn fields(&self, start: usize) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.words
            .iter()
            .copied()
            .skip(start)
            .filter_map(|word| word.split_once(':'))
    }
}

/// Parse one workload line. Blank and `[` lines yield `Ok(None)`.
pub fn parse_line(number: usize, text: &str) -> Result<Option<WorkloadRequest>, WorkloadError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('[') {
        return Ok(None);
    }
    let line = Line {
        number,
        words: text.split_whitespace().collect(),
    };
    let service = line.word(0, "service")?;
    let action = line.word(1, "action")?;

    let request = match (service, action) {
        ("USER", "get") => WorkloadRequest::get(Target::User, format!("/user/{}", line.int(2, "id")?)),
        ("USER", "create" | "delete") => {
            let body = FlatObject::new()
                .with_text("command", action)
                .with_int("id", line.int(2, "id")?)
                .with_text("username", line.word(3, "username")?)
                .with_text("email", line.word(4, "email")?)
                .with_text("password", line.word(5, "password")?);
            WorkloadRequest::post(Target::User, "/user", body)
        }
        ("USER", "update") => {
            let mut body = FlatObject::new()
                .with_text("command", "update")
                .with_int("id", line.int(2, "id")?);
            for (key, value) in line.fields(3) {
                body = body.with_text(key, value);
            }
            WorkloadRequest::post(Target::User, "/user", body)
        }
        ("PRODUCT", "info") => WorkloadRequest::get(
            Target::Product,
            format!("/product/{}", line.int(2, "id")?),
        ),
        ("PRODUCT", "create") => {
            let body = FlatObject::new()
                .with_text("command", "create")
                .with_int("id", line.int(2, "id")?)
                .with_text("name", line.word(3, "name")?)
                .with_text("description", line.word(4, "description")?)
                .with_float("price", line.float(5, "price")?)
                .with_int("quantity", line.int(6, "quantity")?);
            WorkloadRequest::post(Target::Product, "/product", body)
        }
        ("PRODUCT", "update") => {
            let mut body = FlatObject::new()
                .with_text("command", "update")
                .with_int("id", line.int(2, "id")?);
            for (key, value) in line.fields(3) {
                body = match key {
                    "price" => body.with_float(key, parse_field(&line, key, value)?),
                    "quantity" => body.with_int(key, parse_field(&line, key, value)?),
                    _ => body.with_text(key, value),
                };
            }
            WorkloadRequest::post(Target::Product, "/product", body)
        }
        ("PRODUCT", "delete") => {
            let body = FlatObject::new()
                .with_text("command", "delete")
                .with_int("id", line.int(2, "id")?)
                .with_text("name", line.word(3, "name")?)
                .with_float("price", line.float(4, "price")?)
                .with_int("quantity", line.int(5, "quantity")?);
            WorkloadRequest::post(Target::Product, "/product", body)
        }
        ("ORDER", "place") => {
            let body = FlatObject::new()
                .with_text("command", "place order")
                .with_int("product_id", line.int(2, "product_id")?)
                .with_int("user_id", line.int(3, "user_id")?)
                .with_int("quantity", line.int(4, "quantity")?);
            WorkloadRequest::post(Target::Order, "/order", body)
        }
        _ => return Err(line.error(format!("unknown command `{service} {action}`"))),
    };
    Ok(Some(request))
}

fn parse_field<T: std::str::FromStr>(
    line: &Line<'_>,
    key: &str,
    value: &str,
) -> Result<T, WorkloadError> {
    value
        .parse()
        .map_err(|_| line.error(format!("invalid {key} {value:?}")))
}

/// Sends workload requests to the services named in a [`Config`].
pub struct WorkloadDriver {
    client: Client,
    user_base: String,
    product_base: String,
    order_base: String,
}

/// Counts of what a workload run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadSummary {
    pub sent: usize,
    pub skipped: usize,
}

impl WorkloadDriver {
    pub fn new(config: &Config) -> Result<Self, WorkloadError> {
        // An order spans several remote calls, each bounded by the request timeout.
        let client = Client::builder()
            .timeout(config.orchestrator.request_timeout() * 5)
            .build()?;
        Ok(Self {
            client,
            user_base: config.user_service.base_url(),
            product_base: config.product_service.base_url(),
            order_base: config.order_service.base_url(),
        })
    }

    /// Send one request and return the status and raw body.
    pub async fn send(&self, request: &WorkloadRequest) -> Result<(u16, String), WorkloadError> {
        let base = match request.target {
            Target::User => &self.user_base,
            Target::Product => &self.product_base,
            Target::Order => &self.order_base,
        };
        let mut builder = self
            .client
            .request(request.method.clone(), format!("{base}{}", request.path));
        if let Some(body) = &request.body {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(wire::encode(body));
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Replay every line of `path`, printing each reply.
    ///
    /// Lines that do not parse, and requests that fail in transport, are reported and
    /// skipped.
    pub async fn run_file(&self, path: impl AsRef<Path>) -> Result<WorkloadSummary, WorkloadError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| WorkloadError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let mut summary = WorkloadSummary::default();
        for (index, text) in text.lines().enumerate() {
            let request = match parse_line(index + 1, text) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "Skipping workload line");
                    summary.skipped += 1;
                    continue;
                }
            };
            match self.send(&request).await {
                Ok((status, body)) => {
                    println!("{} {} -> {status} {body}", request.method, request.path);
                    summary.sent += 1;
                }
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Request failed");
                    summary.skipped += 1;
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(request: Option<WorkloadRequest>) -> String {
        request.unwrap().body.unwrap().to_string()
    }

    #[test]
    fn test_skips_blank_and_bracket_lines() {
        assert_eq!(parse_line(1, "   ").unwrap(), None);
        assert_eq!(parse_line(2, "[users]").unwrap(), None);
    }

    #[test]
    fn test_order_place_takes_product_first() {
        let request = parse_line(1, "ORDER place 7 1 3").unwrap();
        assert_eq!(
            body(request),
            r#"{"command":"place order","product_id":7,"user_id":1,"quantity":3}"#
        );
    }

    #[test]
    fn test_product_lines() {
        let info = parse_line(1, "PRODUCT info 7").unwrap().unwrap();
        assert_eq!(info.target, Target::Product);
        assert_eq!(info.method, Method::GET);
        assert_eq!(info.path, "/product/7");

        assert_eq!(
            body(parse_line(2, "PRODUCT create 7 lamp desk 9.5 5").unwrap()),
            r#"{"command":"create","id":7,"name":"lamp","description":"desk","price":9.5,"quantity":5}"#
        );
        assert_eq!(
            body(parse_line(3, "PRODUCT update 7 quantity:8 name:bulb").unwrap()),
            r#"{"command":"update","id":7,"quantity":8,"name":"bulb"}"#
        );
    }

    #[test]
    fn test_user_update_passes_fields_as_text() {
        assert_eq!(
            body(parse_line(1, "USER update 1 email:a@b.c password:pw").unwrap()),
            r#"{"command":"update","id":1,"email":"a@b.c","password":"pw"}"#
        );
    }

    #[test]
    fn test_errors_name_the_line() {
        let err = parse_line(4, "ORDER place 7 x 3").unwrap_err();
        assert!(matches!(err, WorkloadError::Parse { line: 4, .. }));

        let err = parse_line(5, "USER create 1 ada").unwrap_err();
        assert_eq!(err.to_string(), "line 5: missing email");

        assert!(parse_line(6, "CART add 1").is_err());
        assert!(parse_line(7, "PRODUCT update 7 quantity:many").is_err());
    }
}
