//! CORS edge proxy
//!
//! A small same-origin front for a browser app that talks to a remote API.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────────┐
//!                              │                    EDGE PROXY                         │
//!                              │                                                       │
//!     Browser Request          │  ┌─────────┐    ┌──────────────┐                      │
//!     ─────────────────────────┼─▶│  http   │───▶│   routing    │                      │
//!                              │  │ server  │    │  dispatcher  │                      │
//!                              │  └─────────┘    └──────┬───────┘                      │
//!                              │                        │                              │
//!                              │         ┌──────────────┼──────────────┐               │
//!                              │         ▼              ▼              ▼               │
//!                              │   ┌──────────┐  ┌────────────┐  ┌──────────┐          │
//!                              │   │  health  │  │  upstream  │  │ statics  │          │
//!                              │   │          │  │  pipeline  │  │  files   │          │
//!                              │   └──────────┘  └─────┬──────┘  └──────────┘          │
//!                              │                       │                               │
//!     Browser Response         │  ┌──────────────┐     ▼                               │
//!     ◀────────────────────────┼──│ CORS headers │◀── reqwest ◀─────────────────────────┼──── Upstream API
//!                              │  └──────────────┘                                     │
//!                              │                                                       │
//!                              │  ┌─────────────────────────────────────────────────┐  │
//!                              │  │              Cross-Cutting Concerns              │  │
//!                              │  │  ┌────────┐  ┌──────────────┐  ┌────────────┐   │  │
//!                              │  │  │ config │  │observability │  │ lifecycle  │   │  │
//!                              │  │  └────────┘  └──────────────┘  └────────────┘   │  │
//!                              │  └─────────────────────────────────────────────────┘  │
//!                              └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use cors_edge_proxy::lifecycle::{signals, startup, Shutdown};
use cors_edge_proxy::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "cors-edge-proxy", version, about = "CORS-fixing edge proxy and static file server")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match startup::load(cli.config.as_deref(), cli.port) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cors-edge-proxy: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        upstream = %config.upstream.base_url,
        mode = ?config.upstream.mode,
        cors_mode = ?config.cors.mode,
        static_root = %config.static_files.root,
        "Configuration loaded"
    );

    let prepared = match startup::prepare(config).await {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            std::process::exit(1);
        }
    };

    let shutdown = Shutdown::new();
    let signal_task = signals::spawn_signal_listener(&shutdown);

    if let Err(e) = prepared
        .server
        .run(prepared.listener, shutdown.subscribe())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    signal_task.abort();
    tracing::info!("Shutdown complete");
}
