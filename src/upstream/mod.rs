//! Upstream subsystem: the reverse-proxy pipeline.
//!
//! # Data Flow
//! ```text
//! RouteDecision (Named | Passthrough)
//!     → forward.rs (preflight, method check, request build, relay)
//!     → target.rs (upstream URL + Host value)
//!     → client.rs (shared reqwest client)
//!     → streamed response back to the client
//! ```
//!
//! # Design Decisions
//! - One pipeline, two forwarding rules selected by `ProxyMode`
//! - Bodies stream in both directions, never fully buffered
//! - No retries: a failed upstream call is a 502
//! - Dropping the handler future (client gone) cancels the upstream call

pub mod client;
pub mod forward;
pub mod target;

pub use client::build_client;
pub use forward::{ForwardRoute, ProxyPipeline};
pub use target::{TargetError, UpstreamTarget};
