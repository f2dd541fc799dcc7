//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map every per-request failure to a fixed status and short plain-text body
//! - Keep internal detail (upstream errors, filesystem paths) out of responses
//!
//! # Design Decisions
//! - Errors stop at the request boundary; nothing here can end the process
//! - 502 and 500 bodies differ so clients can tell them apart

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body returned when the upstream request could not be built.
pub const BODY_INVALID_UPSTREAM_REQUEST: &str = "failed to create upstream request";
/// Body returned when the upstream could not be reached.
pub const BODY_UPSTREAM_UNREACHABLE: &str = "failed to contact upstream";

/// Per-request failures.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream request could not be constructed (bad method, URL or header).
    #[error("invalid upstream request: {0}")]
    InvalidUpstreamRequest(String),

    /// Connection, DNS, TLS failure or timeout while waiting for the upstream.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The route does not accept this method.
    #[error("method {method} not allowed")]
    MethodNotAllowed { method: Method, allowed: Vec<Method> },

    /// The static path tried to leave the served root.
    #[error("path traversal attempt: {0}")]
    PathTraversal(String),

    /// The static path names a directory.
    #[error("directory access: {0}")]
    DirectoryListing(String),

    /// Nothing is served at this path.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidUpstreamRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::PathTraversal(_) | ProxyError::DirectoryListing(_) => StatusCode::FORBIDDEN,
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Short, client-safe body text.
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::InvalidUpstreamRequest(_) => BODY_INVALID_UPSTREAM_REQUEST,
            ProxyError::UpstreamUnreachable(_) => BODY_UPSTREAM_UNREACHABLE,
            ProxyError::MethodNotAllowed { .. } => "method not allowed",
            ProxyError::PathTraversal(_) | ProxyError::DirectoryListing(_) => "Forbidden",
            ProxyError::NotFound(_) => "Not Found",
        }
    }

    /// Short label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::InvalidUpstreamRequest(_) => "invalid_request",
            ProxyError::UpstreamUnreachable(_) => "unreachable",
            ProxyError::MethodNotAllowed { .. } => "method_not_allowed",
            ProxyError::PathTraversal(_) => "traversal",
            ProxyError::DirectoryListing(_) => "directory",
            ProxyError::NotFound(_) => "not_found",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.public_message()).into_response();

        if let ProxyError::MethodNotAllowed { allowed, .. } = &self {
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gateway_and_internal_bodies_differ() {
        let bad_gateway = ProxyError::UpstreamUnreachable("dns error".into()).into_response();
        let internal = ProxyError::InvalidUpstreamRequest("bad uri".into()).into_response();

        assert_eq!(bad_gateway.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let a = axum::body::to_bytes(bad_gateway.into_body(), 1024).await.unwrap();
        let b = axum::body::to_bytes(internal.into_body(), 1024).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(&a[..], BODY_UPSTREAM_UNREACHABLE.as_bytes());
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_exposed() {
        let response =
            ProxyError::UpstreamUnreachable("tcp connect error 10.0.0.1".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("10.0.0.1"));
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = ProxyError::MethodNotAllowed {
            method: Method::GET,
            allowed: vec![Method::POST],
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
