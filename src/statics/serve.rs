//! Static file serving for the frontend.
//!
//! # Responsibilities
//! - Resolve a request path to a file under the static root
//! - Refuse traversal, directories and symlink escapes with 403
//! - Hand the resolved file to tower-http's `ServeFile` with a fixed content type
//! - Mark configured asset prefixes as cacheable

use std::path::PathBuf;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::config::StaticConfig;
use crate::http::request::RequestIdExt;
use crate::http::response::ProxyError;
use crate::observability::metrics;
use crate::security::paths::sanitize_request_path;
use crate::statics::content_type::content_type_for;

/// Serves files from one directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index: String,
    cache_prefixes: Vec<String>,
    cache_control: Option<HeaderValue>,
}

impl StaticFiles {
    pub fn from_config(config: &StaticConfig) -> Self {
        let root = PathBuf::from(&config.root);
        if !root.is_dir() {
            tracing::warn!(
                root = %root.display(),
                "Static root is not a directory; every file will be 404"
            );
        }

        Self {
            root,
            index: config.index.clone(),
            cache_prefixes: config.cache_prefixes.clone(),
            cache_control: HeaderValue::from_str(&format!(
                "public, max-age={}",
                config.cache_max_age_secs
            ))
            .ok(),
        }
    }

    /// Serve one request. Never fails; errors become 4xx responses.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let path = request.uri().path().to_string();
        let request_id = request.request_id().to_string();

        let response = match self.try_serve(&path, request).await {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    ProxyError::PathTraversal(_) => {
                        tracing::warn!(
                            request_id = %request_id,
                            path = %path,
                            "Security: blocked path traversal attempt"
                        );
                    }
                    other => {
                        tracing::debug!(
                            request_id = %request_id,
                            path = %path,
                            error = %other,
                            "Static request refused"
                        );
                    }
                }
                err.into_response()
            }
        };

        metrics::record_static(response.status().as_u16());
        response
    }

    async fn try_serve(&self, path: &str, request: Request<Body>) -> Result<Response, ProxyError> {
        let method = request.method();
        if method != Method::GET && method != Method::HEAD {
            return Err(ProxyError::MethodNotAllowed {
                method: method.clone(),
                allowed: vec![Method::GET, Method::HEAD],
            });
        }

        let file = self.resolve(path).await?;
        let content_type = content_type_for(&file);
        tracing::debug!(path = %path, content_type, "Serving static file");

        let mut response = match ServeFile::new(&file).oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(infallible) => match infallible {},
        };

        if response.status().is_success() {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            if self.is_cacheable(path) {
                if let Some(value) = &self.cache_control {
                    response.headers_mut().insert(header::CACHE_CONTROL, value.clone());
                }
            }
        }
        Ok(response)
    }

    /// Map a URI path to an existing regular file inside the root.
    pub async fn resolve(&self, path: &str) -> Result<PathBuf, ProxyError> {
        let relative = sanitize_request_path(path, &self.index)
            .map_err(|e| ProxyError::PathTraversal(format!("{}: {}", path, e)))?;
        let candidate = self.root.join(&relative);

        let metadata = tokio::fs::metadata(&candidate)
            .await
            .map_err(|_| ProxyError::NotFound(path.to_string()))?;
        if metadata.is_dir() {
            return Err(ProxyError::DirectoryListing(path.to_string()));
        }

        let canonical_root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|_| ProxyError::NotFound(path.to_string()))?;
        let canonical = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(|_| ProxyError::NotFound(path.to_string()))?;
        if !canonical.starts_with(&canonical_root) {
            return Err(ProxyError::PathTraversal(path.to_string()));
        }

        Ok(canonical)
    }

    fn is_cacheable(&self, path: &str) -> bool {
        self.cache_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}
