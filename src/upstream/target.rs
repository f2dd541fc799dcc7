//! The fixed upstream origin.

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

/// Error raised when the configured base URL cannot be used as a target.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid upstream URL `{0}`")]
    InvalidUrl(String),

    #[error("upstream URL `{0}` has no host")]
    MissingHost(String),

    #[error("upstream authority `{0}` is not a valid Host header")]
    InvalidAuthority(String),
}

/// Immutable (scheme, authority, base path) triple built once at startup.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: String,
    authority: String,
    base_path: String,
    host_header: HeaderValue,
}

impl UpstreamTarget {
    pub fn parse(base_url: &str) -> Result<Self, TargetError> {
        let url = Url::parse(base_url).map_err(|_| TargetError::InvalidUrl(base_url.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| TargetError::MissingHost(base_url.to_string()))?;

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let host_header = HeaderValue::from_str(&authority)
            .map_err(|_| TargetError::InvalidAuthority(authority.clone()))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
            base_path: url.path().trim_end_matches('/').to_string(),
            host_header,
        })
    }

    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Full upstream URL for a path (and optional query) relative to the base path.
    pub fn url_for(&self, path_and_query: &str) -> String {
        self.join(&self.base_path, path_and_query)
    }

    /// Upstream URL for a mirrored request: the inbound path and query on the
    /// bare origin. The base path is not prepended, so `/api/x` stays `/api/x`.
    pub fn mirror_url_for(&self, path_and_query: &str) -> String {
        self.join("", path_and_query)
    }

    fn join(&self, base_path: &str, path_and_query: &str) -> String {
        let separator = if path_and_query.starts_with('/') || path_and_query.is_empty() {
            ""
        } else {
            "/"
        };
        format!(
            "{}://{}{}{}{}",
            self.scheme, self.authority, base_path, separator, path_and_query
        )
    }
}
