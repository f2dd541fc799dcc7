//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream URL and named route table
//! - Validate value ranges (timeouts > 0, request deadline outlasts the upstream one)
//! - Reject CORS settings browsers would refuse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use axum::http::{HeaderName, Method};
use thiserror::Error;
use url::Url;

use crate::config::schema::{CorsMode, ProxyConfig, ProxyMode};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url `{0}` is not a valid URL")]
    InvalidUpstreamUrl(String),

    #[error("upstream.base_url scheme `{0}` is not http or https")]
    UnsupportedScheme(String),

    #[error("upstream.base_url must not carry a query or fragment")]
    UpstreamUrlHasQuery,

    #[error("allow_list mode requires at least one upstream route")]
    NoRoutes,

    #[error("route `{name}`: path `{path}` must start with '/'")]
    RelativePath { name: String, path: String },

    #[error("route `{0}` is declared more than once")]
    DuplicateRoute(String),

    #[error("route `{name}`: method `{method}` is invalid")]
    InvalidMethod { name: String, method: String },

    #[error("route `{0}` must allow at least one method")]
    NoMethods(String),

    #[error("upstream.passthrough_prefix `{0}` must start with '/'")]
    InvalidPrefix(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error(
        "timeouts.request_secs ({request_secs}) must be greater than upstream.timeout_secs ({upstream_secs})"
    )]
    RequestTimeoutTooShort { request_secs: u64, upstream_secs: u64 },

    #[error("cors.default_origin is required in reflect mode")]
    MissingDefaultOrigin,

    #[error("cors: `{0}` is not a valid header name")]
    InvalidHeaderName(String),

    #[error("cors: `{0}` is not a valid method")]
    InvalidCorsMethod(String),

    #[error("static_files.root must not be empty")]
    EmptyStaticRoot,
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_upstream(config, &mut errors);
    validate_cors(config, &mut errors);

    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.connect_timeout_secs"));
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    // The outer timeout must never fire before the pipeline's own 502.
    if config.upstream.timeout_secs > 0
        && config.timeouts.request_secs > 0
        && config.timeouts.request_secs <= config.upstream.timeout_secs
    {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs: config.timeouts.request_secs,
            upstream_secs: config.upstream.timeout_secs,
        });
    }
    if config.static_files.enabled && config.static_files.root.trim().is_empty() {
        errors.push(ValidationError::EmptyStaticRoot);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_upstream(config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    let upstream = &config.upstream;

    match Url::parse(&upstream.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::UpstreamUrlHasQuery);
            }
        }
        Err(_) => errors.push(ValidationError::InvalidUpstreamUrl(upstream.base_url.clone())),
    }

    match upstream.mode {
        ProxyMode::AllowList => {
            if upstream.routes.is_empty() {
                errors.push(ValidationError::NoRoutes);
            }

            let mut seen = HashSet::new();
            for route in &upstream.routes {
                for path in [&route.path, &route.upstream_path] {
                    if !path.starts_with('/') {
                        errors.push(ValidationError::RelativePath {
                            name: route.name.clone(),
                            path: path.clone(),
                        });
                    }
                }
                if !seen.insert(route.path.as_str()) {
                    errors.push(ValidationError::DuplicateRoute(route.path.clone()));
                }
                if route.methods.is_empty() {
                    errors.push(ValidationError::NoMethods(route.name.clone()));
                }
                for method in &route.methods {
                    if Method::from_bytes(method.as_bytes()).is_err() {
                        errors.push(ValidationError::InvalidMethod {
                            name: route.name.clone(),
                            method: method.clone(),
                        });
                    }
                }
            }
        }
        ProxyMode::Passthrough => {
            if !upstream.passthrough_prefix.starts_with('/') {
                errors.push(ValidationError::InvalidPrefix(upstream.passthrough_prefix.clone()));
            }
        }
    }
}

fn validate_cors(config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    let cors = &config.cors;

    if cors.mode == CorsMode::Reflect && cors.default_origin.trim().is_empty() {
        errors.push(ValidationError::MissingDefaultOrigin);
    }
    for name in &cors.allow_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        }
    }
    for method in &cors.allow_methods {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidCorsMethod(method.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::NamedRouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "ftp://example.org".into();
        config.upstream.timeout_secs = 0;
        config.cors.default_origin = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::UnsupportedScheme("ftp".into())));
        assert!(errors.contains(&ValidationError::ZeroTimeout("upstream.timeout_secs")));
        assert!(errors.contains(&ValidationError::MissingDefaultOrigin));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_rejects_bad_routes() {
        let mut config = ProxyConfig::default();
        config.upstream.routes = vec![
            NamedRouteConfig::post("a", "signin", "/auth/signin"),
            NamedRouteConfig::post("b", "/x", "/y"),
            NamedRouteConfig::post("c", "/x", "/z"),
        ];
        config.upstream.routes[1].methods = vec!["BAD METHOD".into()];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::RelativePath { .. })));
        assert!(errors.contains(&ValidationError::DuplicateRoute("/x".into())));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidMethod { .. })));
    }

    #[test]
    fn test_allow_list_needs_routes_but_passthrough_does_not() {
        let mut config = ProxyConfig::default();
        config.upstream.routes.clear();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoRoutes]));

        config.upstream.mode = ProxyMode::Passthrough;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_request_timeout_must_outlast_upstream_timeout() {
        let mut config = ProxyConfig::default();
        config.timeouts.request_secs = 1;
        config.upstream.timeout_secs = 5;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::RequestTimeoutTooShort {
                request_secs: 1,
                upstream_secs: 5,
            }])
        );

        config.timeouts.request_secs = 5;
        assert!(validate_config(&config).is_err());

        config.timeouts.request_secs = 6;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_wildcard_mode_does_not_need_default_origin() {
        let mut config = ProxyConfig::default();
        config.cors.mode = CorsMode::Wildcard;
        config.cors.default_origin = String::new();
        assert_eq!(validate_config(&config), Ok(()));
    }
}
