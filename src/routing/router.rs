//! Request dispatch.
//!
//! # Responsibilities
//! - Store the compiled route table
//! - Decide which handler serves a request
//! - Return an explicit `NotFound` rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) named route lookup via HashMap
//! - Order: health, then proxy routes, then static files

use std::collections::HashMap;

use axum::http::{Method, Request};

use crate::config::{ProxyConfig, ProxyMode};
use crate::routing::matcher::{ExactPathMatcher, Matcher, PathPrefixMatcher};

/// Path answered by the health handler.
pub const HEALTH_PATH: &str = "/health";

/// A compiled allow-list route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRoute {
    pub name: String,
    pub path: String,
    pub upstream_path: String,
    pub methods: Vec<Method>,
}

impl NamedRoute {
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }
}

/// Which handler a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision<'a> {
    Health,
    Named(&'a NamedRoute),
    Passthrough,
    Static,
    NotFound,
}

impl RouteDecision<'_> {
    /// Label used in logs and metrics.
    pub fn label(&self) -> &str {
        match self {
            RouteDecision::Health => "health",
            RouteDecision::Named(route) => &route.name,
            RouteDecision::Passthrough => "passthrough",
            RouteDecision::Static => "static",
            RouteDecision::NotFound => "none",
        }
    }
}

/// Path-based dispatcher.
#[derive(Debug)]
pub struct Dispatcher {
    health: ExactPathMatcher,
    named: HashMap<String, NamedRoute>,
    passthrough: Option<PathPrefixMatcher>,
    static_enabled: bool,
}

impl Dispatcher {
    /// Compile the route table. Expects a validated configuration.
    pub fn from_config(config: &ProxyConfig) -> Self {
        let mut named = HashMap::new();
        let mut passthrough = None;

        match config.upstream.mode {
            ProxyMode::AllowList => {
                for route in &config.upstream.routes {
                    let methods = route
                        .methods
                        .iter()
                        .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
                        .collect();
                    named.insert(
                        route.path.clone(),
                        NamedRoute {
                            name: route.name.clone(),
                            path: route.path.clone(),
                            upstream_path: route.upstream_path.clone(),
                            methods,
                        },
                    );
                }
            }
            ProxyMode::Passthrough => {
                passthrough = Some(PathPrefixMatcher::new(
                    config.upstream.passthrough_prefix.clone(),
                ));
            }
        }

        tracing::debug!(
            mode = ?config.upstream.mode,
            named_routes = named.len(),
            static_enabled = config.static_files.enabled,
            "Route table compiled"
        );

        Self {
            health: ExactPathMatcher::new(HEALTH_PATH),
            named,
            passthrough,
            static_enabled: config.static_files.enabled,
        }
    }

    pub fn dispatch<B>(&self, req: &Request<B>) -> RouteDecision<'_> {
        self.dispatch_path(req.uri().path())
    }

    pub fn dispatch_path(&self, path: &str) -> RouteDecision<'_> {
        if self.health.matches_path(path) {
            return RouteDecision::Health;
        }
        if let Some(route) = self.named.get(path) {
            return RouteDecision::Named(route);
        }
        if self.passthrough.as_ref().is_some_and(|m| m.matches_path(path)) {
            return RouteDecision::Passthrough;
        }
        if self.static_enabled {
            RouteDecision::Static
        } else {
            RouteDecision::NotFound
        }
    }
}
