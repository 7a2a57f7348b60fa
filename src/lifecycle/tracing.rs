//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter. The level comes from
//! `RUST_LOG` and defaults to `info`. Module paths are hidden; log lines carry structured
//! fields (`entity_type`, `user_id`, `product_id`, `token`, `attempt`) instead.
//!
//! ```bash
//! # Service lifecycle, orders placed or refused, stock reservations
//! RUST_LOG=info order-saga all --config config.json
//!
//! # Every directory call, snapshot and store message
//! RUST_LOG=debug order-saga all --config config.json
//! ```
//!
//! A reservation that lost one race and then went through reads like:
//!
//! ```text
//! INFO place_order: Reserving stock attempt=1 product_id=7 token=t0
//! INFO place_order: Reserving stock attempt=2 product_id=7 token=t1
//! INFO place_order: Order placed user_id=1 product_id=7 quantity=3
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Later calls are no-ops, so tests may call it freely.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
