//! TeraBox gateway - cached share-link resolution and streaming download proxy
//!
//! Resolves public share links into direct, time-limited download URLs,
//! deduplicates the expensive resolution work behind an expiring cache, and
//! re-streams downloads through itself so clients avoid the origin's access
//! restrictions.

mod config;
mod error;
mod proxy;
mod server;
mod types;

use crate::config::Config;
use crate::server::{start_server, ServerState, SharedState};
use expiring_cache::DEFAULT_SWEEP_INTERVAL;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terabox_gateway=info".into()),
        )
        .init();

    let config = Config::from_env();
    info!(
        port = config.port,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "Starting terabox-gateway"
    );

    if config.cookie.is_none() {
        warn!("TERABOX_COOKIE is not set; the origin will likely reject resolution requests");
    }

    let state: SharedState = Arc::new(ServerState::new(&config));
    state.cache.spawn_sweeper(DEFAULT_SWEEP_INTERVAL);

    // Failing to bind the listening socket is the only fatal error; request
    // failures are handled at the route boundary.
    start_server(state, config.port)
        .await
        .expect("Server failed");
}
