//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Proxied request:
//!     → headers.rs (minimize / sanitize forwarded headers)
//!     → [upstream call]
//!     → headers.rs (drop upstream CORS + hop-by-hop headers)
//!     → cors.rs (append the proxy's own CORS headers)
//!
//! Static request:
//!     → paths.rs (decode, reject traversal before filesystem access)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any path check failure
//! - No trust in upstream CORS headers
//! - No trust in client input

pub mod cors;
pub mod headers;
pub mod paths;

pub use cors::{CorsDecision, CorsPolicy};
pub use headers::{Direction, HeaderPolicy};
