//! CORS policy.
//!
//! # Responsibilities
//! - Compile the configured policy into header values once at startup
//! - Derive a per-request `CorsDecision` from the inbound `Origin`
//! - Write the decision onto a response after upstream CORS headers are gone
//!
//! # Design Decisions
//! - Wildcard origin never carries `Access-Control-Allow-Credentials`;
//!   the type has no way to express that combination
//! - `Vary: Origin` is appended, never replacing an upstream `Vary`

use axum::http::{header, HeaderMap, HeaderValue};
use thiserror::Error;

use crate::config::{CorsConfig, CorsMode};

/// Error raised when the CORS configuration cannot be turned into header values.
#[derive(Debug, Error)]
pub enum CorsConfigError {
    #[error("invalid value for {field}: `{value}`")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Clone)]
enum OriginPolicy {
    Any,
    Reflect {
        default_origin: HeaderValue,
        allowed: Vec<HeaderValue>,
    },
}

/// Compiled, immutable CORS policy.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origin: OriginPolicy,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: Option<HeaderValue>,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, CorsConfigError> {
        let origin = match config.mode {
            CorsMode::Wildcard => OriginPolicy::Any,
            CorsMode::Reflect => OriginPolicy::Reflect {
                default_origin: value("cors.default_origin", &config.default_origin)?,
                allowed: config
                    .allowed_origins
                    .iter()
                    .map(|o| value("cors.allowed_origins", o))
                    .collect::<Result<_, _>>()?,
            },
        };

        Ok(Self {
            origin,
            allow_methods: value("cors.allow_methods", &config.allow_methods.join(", "))?,
            allow_headers: value("cors.allow_headers", &config.allow_headers.join(", "))?,
            max_age: config
                .max_age_secs
                .map(|secs| value("cors.max_age_secs", &secs.to_string()))
                .transpose()?,
        })
    }

    /// Compute the header set for one request.
    pub fn decide(&self, request_headers: &HeaderMap) -> CorsDecision {
        let (allow_origin, allow_credentials) = match &self.origin {
            OriginPolicy::Any => (HeaderValue::from_static("*"), false),
            OriginPolicy::Reflect { default_origin, allowed } => {
                let origin = request_headers
                    .get(header::ORIGIN)
                    .filter(|o| !o.is_empty())
                    .filter(|o| allowed.is_empty() || allowed.contains(*o))
                    .unwrap_or(default_origin);
                (origin.clone(), true)
            }
        };

        CorsDecision {
            allow_origin,
            allow_credentials,
            allow_methods: self.allow_methods.clone(),
            allow_headers: self.allow_headers.clone(),
            max_age: self.max_age.clone(),
        }
    }
}

fn value(field: &'static str, raw: &str) -> Result<HeaderValue, CorsConfigError> {
    HeaderValue::from_str(raw).map_err(|_| CorsConfigError::InvalidValue {
        field,
        value: raw.to_string(),
    })
}

/// The `Access-Control-*` header set chosen for a single request.
#[derive(Debug, Clone)]
pub struct CorsDecision {
    allow_origin: HeaderValue,
    allow_credentials: bool,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: Option<HeaderValue>,
}

impl CorsDecision {
    pub fn allow_origin(&self) -> &HeaderValue {
        &self.allow_origin
    }

    pub fn allows_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Write the CORS headers. Existing values for these keys are replaced.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        if self.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        } else {
            headers.remove(header::ACCESS_CONTROL_ALLOW_CREDENTIALS);
        }
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        append_vary_origin(headers);
    }

    /// Headers for a preflight answer: the regular set plus `Max-Age`.
    pub fn apply_preflight(&self, headers: &mut HeaderMap) {
        self.apply(headers);
        if let Some(max_age) = &self.max_age {
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, max_age.clone());
        }
    }
}

fn append_vary_origin(headers: &mut HeaderMap) {
    let already_varies = headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|v| v == "*" || v.eq_ignore_ascii_case("origin"));

    if !already_varies {
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_origin(origin: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(origin) = origin {
            headers.insert(header::ORIGIN, HeaderValue::from_str(origin).unwrap());
        }
        headers
    }

    #[test]
    fn test_reflect_echoes_origin() {
        let policy = CorsPolicy::from_config(&CorsConfig::default()).unwrap();
        let decision = policy.decide(&request_with_origin(Some("http://localhost:5173")));

        let mut headers = HeaderMap::new();
        decision.apply(&mut headers);

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization");
        assert_eq!(headers[header::VARY], "Origin");
    }

    #[test]
    fn test_reflect_falls_back_to_default() {
        let policy = CorsPolicy::from_config(&CorsConfig::default()).unwrap();
        let decision = policy.decide(&request_with_origin(None));
        assert_eq!(decision.allow_origin(), "http://localhost:8080");
        assert!(decision.allows_credentials());
    }

    #[test]
    fn test_reflect_with_allow_list_rejects_unknown_origin() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example.com".into()],
            ..CorsConfig::default()
        };
        let policy = CorsPolicy::from_config(&config).unwrap();

        let known = policy.decide(&request_with_origin(Some("https://app.example.com")));
        assert_eq!(known.allow_origin(), "https://app.example.com");

        let unknown = policy.decide(&request_with_origin(Some("https://evil.example")));
        assert_eq!(unknown.allow_origin(), "http://localhost:8080");
    }

    #[test]
    fn test_wildcard_never_sends_credentials() {
        let config = CorsConfig {
            mode: CorsMode::Wildcard,
            ..CorsConfig::default()
        };
        let policy = CorsPolicy::from_config(&config).unwrap();
        let decision = policy.decide(&request_with_origin(Some("http://localhost:5173")));

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        decision.apply(&mut headers);

        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }

    #[test]
    fn test_vary_is_appended_once() {
        let policy = CorsPolicy::from_config(&CorsConfig::default()).unwrap();
        let decision = policy.decide(&HeaderMap::new());

        let mut headers = HeaderMap::new();
        headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
        decision.apply(&mut headers);
        decision.apply(&mut headers);

        let vary: Vec<_> = headers.get_all(header::VARY).iter().collect();
        assert_eq!(vary, vec!["Accept-Encoding", "Origin"]);
    }

    #[test]
    fn test_max_age_only_on_preflight() {
        let config = CorsConfig {
            max_age_secs: Some(600),
            ..CorsConfig::default()
        };
        let decision = CorsPolicy::from_config(&config).unwrap().decide(&HeaderMap::new());

        let mut regular = HeaderMap::new();
        decision.apply(&mut regular);
        assert!(regular.get(header::ACCESS_CONTROL_MAX_AGE).is_none());

        let mut preflight = HeaderMap::new();
        decision.apply_preflight(&mut preflight);
        assert_eq!(preflight[header::ACCESS_CONTROL_MAX_AGE], "600");
    }

    #[test]
    fn test_invalid_origin_is_a_config_error() {
        let config = CorsConfig {
            default_origin: "bad\norigin".into(),
            ..CorsConfig::default()
        };
        assert!(CorsPolicy::from_config(&config).is_err());
    }
}
