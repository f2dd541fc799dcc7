//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics before anything else logs
//! - Build the HTTP server and bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and exits non-zero
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_startup_config, ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::observability;
use crate::security::cors::CorsConfigError;
use crate::upstream::TargetError;

/// Anything that prevents the proxy from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("CORS configuration error: {0}")]
    Cors(#[from] CorsConfigError),

    #[error("upstream target error: {0}")]
    Target(#[from] TargetError),

    #[error("failed to build upstream client: {0}")]
    Client(reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// A server ready to accept traffic.
pub struct Prepared {
    pub server: HttpServer,
    pub listener: TcpListener,
    pub local_addr: SocketAddr,
}

/// Load configuration from an optional file plus the environment.
pub fn load(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<ProxyConfig, StartupError> {
    let mut config = load_startup_config(config_path)?;
    if let Some(port) = port_override {
        config.listener.port = port;
    }
    Ok(config)
}

/// Initialize observability, build the server and bind its listener.
pub async fn prepare(config: ProxyConfig) -> Result<Prepared, StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(|source| StartupError::Bind {
        address: address.clone(),
        source,
    })?;

    tracing::info!(address = %local_addr, "Listening for connections");
    Ok(Prepared {
        server,
        listener,
        local_addr,
    })
}
