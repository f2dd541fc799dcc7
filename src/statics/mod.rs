//! Static frontend assets.
//!
//! # Data Flow
//! ```text
//! RouteDecision::Static
//!     → security::paths (decode + traversal check, no filesystem access)
//!     → serve.rs (exists? directory? inside root?)
//!     → content_type.rs (fixed extension table)
//!     → tower-http ServeFile (streams the file)
//! ```

pub mod content_type;
pub mod serve;

pub use content_type::content_type_for;
pub use serve::StaticFiles;
