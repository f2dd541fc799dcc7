//! Outbound HTTP client construction.
//!
//! # Design Decisions
//! - One client per process; it pools connections internally
//! - Redirects are relayed to the browser, never followed
//! - Connect timeout bounds DNS + TCP + TLS; the response-header deadline
//!   is enforced by the pipeline with `tokio::time::timeout`

use std::time::Duration;

use crate::config::UpstreamConfig;

/// Build the client used for every upstream call.
pub fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
}
