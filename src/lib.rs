//! CORS edge proxy library.
//!
//! Fronts a single HTTPS API for a browser frontend: forwards an allow-list
//! of named routes (or a passthrough prefix), attaches the proxy's own CORS
//! headers, and serves the frontend's static files.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod statics;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
