//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Upstream origin and forwarding mode.
    pub upstream: UpstreamConfig,

    /// CORS policy applied to proxied and health responses.
    pub cors: CorsConfig,

    /// Static frontend asset serving.
    pub static_files: StaticConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// Full socket address string ("host:port").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Selects how requests are forwarded to the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProxyMode {
    /// Only the configured named routes are proxied, to fixed upstream paths.
    #[default]
    AllowList,
    /// Everything under `passthrough_prefix` is mirrored to the upstream.
    Passthrough,
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream (scheme, host and base path).
    pub base_url: String,

    /// Forwarding mode.
    pub mode: ProxyMode,

    /// Named routes used in allow-list mode.
    pub routes: Vec<NamedRouteConfig>,

    /// Path prefix proxied in passthrough mode.
    pub passthrough_prefix: String,

    /// Time allowed to establish the upstream connection, in seconds.
    pub connect_timeout_secs: u64,

    /// Time allowed until upstream response headers arrive, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://platform.zone01.gr/api".to_string(),
            mode: ProxyMode::AllowList,
            routes: vec![
                NamedRouteConfig::post("signin", "/signin", "/auth/signin"),
                NamedRouteConfig::post("graphql", "/graphql", "/graphql-engine/v1/graphql"),
            ],
            passthrough_prefix: "/api/".to_string(),
            connect_timeout_secs: 10,
            timeout_secs: 30,
        }
    }
}

/// A named route mapping an exact inbound path to a fixed upstream path.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NamedRouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Inbound path to match (exact match).
    pub path: String,

    /// Upstream path appended to the base URL.
    pub upstream_path: String,

    /// Methods accepted on this route.
    #[serde(default = "default_route_methods")]
    pub methods: Vec<String>,
}

impl NamedRouteConfig {
    /// A POST-only route.
    pub fn post(name: &str, path: &str, upstream_path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            upstream_path: upstream_path.to_string(),
            methods: default_route_methods(),
        }
    }
}

fn default_route_methods() -> Vec<String> {
    vec!["POST".to_string()]
}

/// Which CORS policy variant to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorsMode {
    /// Always `*`, never credentials.
    Wildcard,
    /// Echo the request origin (or the default) and allow credentials.
    #[default]
    Reflect,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Policy variant.
    pub mode: CorsMode,

    /// Origin used when the request carries none (reflect mode).
    pub default_origin: String,

    /// If non-empty, only these origins are echoed back.
    pub allowed_origins: Vec<String>,

    /// Value of `Access-Control-Allow-Methods`.
    pub allow_methods: Vec<String>,

    /// Value of `Access-Control-Allow-Headers`.
    pub allow_headers: Vec<String>,

    /// `Access-Control-Max-Age` for preflight responses.
    pub max_age_secs: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            mode: CorsMode::Reflect,
            default_origin: "http://localhost:8080".to_string(),
            allowed_origins: Vec::new(),
            allow_methods: vec!["GET".into(), "POST".into(), "OPTIONS".into()],
            allow_headers: vec!["Content-Type".into(), "Authorization".into()],
            max_age_secs: None,
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Serve static files for unmatched paths.
    pub enabled: bool,

    /// Directory files are served from.
    pub root: String,

    /// File served for `/`.
    pub index: String,

    /// Path prefixes that receive a `Cache-Control` header.
    pub cache_prefixes: Vec<String>,

    /// `max-age` used for cached prefixes, in seconds.
    pub cache_max_age_secs: u64,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: "./docs".to_string(),
            index: "index.html".to_string(),
            cache_prefixes: vec!["/css/".into(), "/js/".into()],
            cache_max_age_secs: 3600,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound on handler time before the response starts, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
