//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: Health | Named | Passthrough | Static | NotFound
//!
//! Route Compilation (at startup):
//!     UpstreamConfig
//!     → Parse methods, index named routes by path
//!     → Freeze as immutable Dispatcher
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same route
//! - Exactly one handler per request, no fallthrough

pub mod matcher;
pub mod router;

pub use router::{Dispatcher, NamedRoute, RouteDecision, HEALTH_PATH};
