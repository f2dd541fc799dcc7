//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Dispatch requests to health, proxy pipeline or static files
//! - Stop accepting on shutdown signal

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::http::response::ProxyError;
use crate::lifecycle::startup::StartupError;
use crate::observability::metrics;
use crate::routing::{Dispatcher, RouteDecision};
use crate::security::CorsPolicy;
use crate::statics::StaticFiles;
use crate::upstream::{build_client, ForwardRoute, ProxyPipeline, UpstreamTarget};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub pipeline: ProxyPipeline,
    pub statics: Option<Arc<StaticFiles>>,
    pub cors: Arc<CorsPolicy>,
}

impl AppState {
    /// Build every request-time component from a validated configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, StartupError> {
        let cors = Arc::new(CorsPolicy::from_config(&config.cors)?);
        let target = Arc::new(UpstreamTarget::parse(&config.upstream.base_url)?);
        let client = build_client(&config.upstream).map_err(StartupError::Client)?;

        Ok(Self {
            dispatcher: Arc::new(Dispatcher::from_config(config)),
            pipeline: ProxyPipeline::new(config, client, target, cors.clone()),
            statics: config
                .static_files
                .enabled
                .then(|| Arc::new(StaticFiles::from_config(&config.static_files))),
            cors,
        })
    }
}

/// HTTP server for the edge proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config: Arc::new(config),
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %req.request_id(),
                )
            }))
            .layer(RequestIdLayer)
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            mode = ?self.config.upstream.mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point: pick exactly one handler for the request.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.dispatcher.dispatch(&request) {
        RouteDecision::Health => health_handler(&state, request),
        RouteDecision::Named(route) => {
            state
                .pipeline
                .forward(ForwardRoute::Named(route), request)
                .await
        }
        RouteDecision::Passthrough => {
            state
                .pipeline
                .forward(ForwardRoute::Passthrough, request)
                .await
        }
        RouteDecision::Static => match &state.statics {
            Some(statics) => statics.serve(request).await,
            None => ProxyError::NotFound(request.uri().path().to_string()).into_response(),
        },
        RouteDecision::NotFound => {
            tracing::debug!(
                request_id = %request.request_id(),
                path = %request.uri().path(),
                "No route matched"
            );
            ProxyError::NotFound(request.uri().path().to_string()).into_response()
        }
    }
}

/// Liveness check. Carries CORS headers so the frontend can poll it.
fn health_handler(state: &AppState, request: Request<Body>) -> Response {
    let start = Instant::now();
    let cors = state.cors.decide(request.headers());

    let response = if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        cors.apply_preflight(response.headers_mut());
        response
    } else {
        let mut response = (StatusCode::OK, "OK").into_response();
        cors.apply(response.headers_mut());
        response
    };

    metrics::record_request("health", response.status().as_u16(), start);
    response
}
