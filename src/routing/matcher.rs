//! Route matching logic.
//!
//! # Responsibilities
//! - Match exact paths (named routes, health)
//! - Match path prefixes (passthrough namespace)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - The query string never takes part in matching
//! - No regex to guarantee O(n) matching

use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches<B>(&self, req: &Request<B>) -> bool
    where
        Self: Sized,
    {
        self.matches_path(req.uri().path())
    }

    /// Returns true if the path matches this condition.
    fn matches_path(&self, path: &str) -> bool;
}

/// Matches one path exactly.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches_path(&self, path: &str) -> bool {
        path == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches_path(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}
