//! Header forwarding policy.
//!
//! # Responsibilities
//! - Choose which inbound headers reach the upstream
//! - Choose which upstream headers reach the client
//! - Strip hop-by-hop headers in both directions
//! - Drop every upstream `Access-Control-*` header before CORS is applied
//!
//! # Design Decisions
//! - Allow-list mode copies a fixed, minimal header set in each direction
//! - Passthrough mode copies everything except hop-by-hop and CORS headers
//! - The policy is a pure function over `HeaderMap`s; it never touches I/O

use axum::http::{header, HeaderMap, HeaderName};

use crate::config::ProxyMode;

/// Headers meaningful only for a single transport hop (RFC 9110 §7.6.1).
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Request headers forwarded by allow-list routes.
const ALLOW_LIST_REQUEST: &[&str] = &["authorization", "content-type"];

/// Response headers relayed by allow-list routes.
const ALLOW_LIST_RESPONSE: &[&str] = &["content-type"];

/// Which leg of the exchange a header set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client request headers on their way to the upstream.
    ToUpstream,
    /// Upstream response headers on their way to the client.
    ToClient,
}

/// Returns true for any `Access-Control-*` header.
pub fn is_cors_header(name: &HeaderName) -> bool {
    // HeaderName is always stored lowercase.
    name.as_str().starts_with("access-control-")
}

/// Returns true for connection-scoped headers that proxies must not forward.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Header policy for one proxy mode.
#[derive(Debug, Clone, Copy)]
pub struct HeaderPolicy {
    mode: ProxyMode,
}

impl HeaderPolicy {
    pub fn new(mode: ProxyMode) -> Self {
        Self { mode }
    }

    /// Filter `headers` for the given direction.
    ///
    /// In the `ToUpstream` direction `Host` is always dropped; the pipeline
    /// decides what the upstream sees.
    pub fn apply(&self, headers: &HeaderMap, direction: Direction) -> HeaderMap {
        let mut out = HeaderMap::with_capacity(headers.len());

        match self.mode {
            ProxyMode::AllowList => {
                let keep = match direction {
                    Direction::ToUpstream => ALLOW_LIST_REQUEST,
                    Direction::ToClient => ALLOW_LIST_RESPONSE,
                };
                for (name, value) in headers {
                    if keep.contains(&name.as_str()) {
                        out.append(name.clone(), value.clone());
                    }
                }
            }
            ProxyMode::Passthrough => {
                for (name, value) in headers {
                    if is_hop_by_hop(name) {
                        continue;
                    }
                    match direction {
                        Direction::ToUpstream if name == header::HOST => continue,
                        Direction::ToClient if is_cors_header(name) => continue,
                        _ => {}
                    }
                    out.append(name.clone(), value.clone());
                }
            }
        }

        out
    }
}
