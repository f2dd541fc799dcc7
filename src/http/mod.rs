//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (add and propagate request ID)
//!     → [routing decides: health | proxy | static]
//!     → response.rs (error taxonomy → status + body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::{AppState, HttpServer};
