//! Request forwarding to the upstream origin.
//!
//! # Flow
//! ```text
//! inbound request
//!     → OPTIONS?        → 204 + CORS (no upstream call)
//!     → method allowed? → 405 + CORS (no upstream call)
//!     → build URL, filter headers, stream body
//!     → upstream call (bounded wait for response headers)
//!     → filter upstream headers, then append CORS
//!     → stream upstream body to client
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, HttpBody},
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::TryStreamExt;

use crate::config::ProxyConfig;
use crate::http::request::RequestIdExt;
use crate::http::response::ProxyError;
use crate::observability::metrics;
use crate::routing::NamedRoute;
use crate::security::{CorsPolicy, Direction, HeaderPolicy};
use crate::upstream::target::UpstreamTarget;

/// Which rule the pipeline uses to build the upstream request.
#[derive(Debug, Clone, Copy)]
pub enum ForwardRoute<'a> {
    /// Fixed upstream path, minimal headers.
    Named(&'a NamedRoute),
    /// Inbound path and query mirrored, all end-to-end headers.
    Passthrough,
}

impl ForwardRoute<'_> {
    fn label(&self) -> &str {
        match self {
            ForwardRoute::Named(route) => &route.name,
            ForwardRoute::Passthrough => "passthrough",
        }
    }
}

/// The proxy pipeline. Cheap to clone; all state is immutable or internally shared.
#[derive(Clone)]
pub struct ProxyPipeline {
    client: reqwest::Client,
    target: Arc<UpstreamTarget>,
    headers: HeaderPolicy,
    cors: Arc<CorsPolicy>,
    response_timeout: Duration,
}

impl ProxyPipeline {
    pub fn new(
        config: &ProxyConfig,
        client: reqwest::Client,
        target: Arc<UpstreamTarget>,
        cors: Arc<CorsPolicy>,
    ) -> Self {
        Self {
            client,
            target,
            headers: HeaderPolicy::new(config.upstream.mode),
            cors,
            response_timeout: Duration::from_secs(config.upstream.timeout_secs),
        }
    }

    /// Forward one request and produce the client response.
    ///
    /// Every response leaving this function, errors included, carries the CORS headers.
    pub async fn forward(&self, route: ForwardRoute<'_>, request: Request<Body>) -> Response {
        let start = Instant::now();
        let request_id = request.request_id().to_string();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let cors = self.cors.decide(request.headers());

        if method == Method::OPTIONS {
            tracing::debug!(request_id = %request_id, path = %path, "Answering preflight");
            let mut response = StatusCode::NO_CONTENT.into_response();
            cors.apply_preflight(response.headers_mut());
            metrics::record_request(route.label(), StatusCode::NO_CONTENT.as_u16(), start);
            return response;
        }

        let mut response = match self.relay(route, request, &request_id).await {
            Ok(response) => {
                tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    route = route.label(),
                    status = response.status().as_u16(),
                    "Proxied request"
                );
                response
            }
            Err(err) => {
                match &err {
                    ProxyError::MethodNotAllowed { .. } => {
                        tracing::info!(
                            request_id = %request_id,
                            method = %method,
                            path = %path,
                            "Method not allowed"
                        );
                    }
                    _ => {
                        tracing::error!(
                            request_id = %request_id,
                            method = %method,
                            path = %path,
                            error = %err,
                            "Upstream call failed"
                        );
                        metrics::record_upstream_error(err.kind());
                    }
                }
                err.into_response()
            }
        };

        cors.apply(response.headers_mut());
        metrics::record_request(route.label(), response.status().as_u16(), start);
        response
    }

    async fn relay(
        &self,
        route: ForwardRoute<'_>,
        request: Request<Body>,
        request_id: &str,
    ) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();

        let url = match route {
            ForwardRoute::Named(named) => {
                if !named.allows(&parts.method) {
                    return Err(ProxyError::MethodNotAllowed {
                        method: parts.method,
                        allowed: named.methods.clone(),
                    });
                }
                self.target.url_for(&named.upstream_path)
            }
            ForwardRoute::Passthrough => {
                let path_and_query = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                self.target.mirror_url_for(path_and_query)
            }
        };
        let url = reqwest::Url::parse(&url)
            .map_err(|e| ProxyError::InvalidUpstreamRequest(format!("{}: {}", url, e)))?;

        let mut headers = self.headers.apply(&parts.headers, Direction::ToUpstream);
        if let ForwardRoute::Passthrough = route {
            headers.insert(header::HOST, self.target.host_header().clone());
        }

        let mut builder = self.client.request(parts.method.clone(), url).headers(headers);
        if !body.is_end_stream() {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }
        let upstream_request = builder
            .build()
            .map_err(|e| ProxyError::InvalidUpstreamRequest(e.to_string()))?;

        tracing::debug!(
            request_id = %request_id,
            method = %parts.method,
            target = %upstream_request.url(),
            "Forwarding to upstream"
        );

        let upstream = match tokio::time::timeout(
            self.response_timeout,
            self.client.execute(upstream_request),
        )
        .await
        {
            Ok(Ok(upstream)) => upstream,
            Ok(Err(e)) if e.is_builder() => {
                return Err(ProxyError::InvalidUpstreamRequest(e.to_string()))
            }
            Ok(Err(e)) => return Err(ProxyError::UpstreamUnreachable(e.to_string())),
            Err(_) => {
                return Err(ProxyError::UpstreamUnreachable(format!(
                    "no response within {:?}",
                    self.response_timeout
                )))
            }
        };

        let status = upstream.status();
        let headers = self.headers.apply(upstream.headers(), Direction::ToClient);

        let stream_request_id = request_id.to_string();
        let body = upstream.bytes_stream().inspect_err(move |e| {
            tracing::error!(
                request_id = %stream_request_id,
                error = %e,
                "Error copying response body"
            );
            metrics::record_stream_error();
        });

        let mut response = Response::new(Body::from_stream(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
