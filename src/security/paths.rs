//! Request path sanitization for static file serving.
//!
//! # Responsibilities
//! - Percent-decode the request path
//! - Reject `..`, backslashes and NUL bytes before any filesystem access
//! - Map `/` to the index file
//!
//! # Design Decisions
//! - Any path containing `..` is rejected outright, even inside a file name
//! - The output is always a relative path with only normal components

use std::path::PathBuf;

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Reasons a request path is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is not valid UTF-8 after percent-decoding")]
    Encoding,

    #[error("path contains a parent-directory segment or forbidden character")]
    Traversal,
}

/// Turn a URI path into a path relative to the static root.
pub fn sanitize_request_path(raw: &str, index: &str) -> Result<PathBuf, PathError> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| PathError::Encoding)?;

    if decoded.contains('\0') || decoded.contains('\\') || decoded.contains("..") {
        return Err(PathError::Traversal);
    }

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            // Drive prefixes would make `join` replace the root on Windows.
            s if s.contains(':') => return Err(PathError::Traversal),
            s => relative.push(s),
        }
    }

    if relative.as_os_str().is_empty() {
        relative.push(index);
    }
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_maps_to_index() {
        assert_eq!(sanitize_request_path("/", "index.html"), Ok(PathBuf::from("index.html")));
    }

    #[test]
    fn test_regular_paths_are_relative() {
        assert_eq!(
            sanitize_request_path("/css/style.css", "index.html"),
            Ok(PathBuf::from("css/style.css"))
        );
        assert_eq!(
            sanitize_request_path("/./js//app.js", "index.html"),
            Ok(PathBuf::from("js/app.js"))
        );
    }

    #[test]
    fn test_parent_segments_are_rejected() {
        for raw in ["/../secret.txt", "/css/../../etc/passwd", "/a/..", "/%2e%2e/secret.txt", "/%2E%2E%2Fsecret"] {
            assert_eq!(sanitize_request_path(raw, "index.html"), Err(PathError::Traversal), "{raw}");
        }
    }

    #[test]
    fn test_forbidden_characters_are_rejected() {
        assert_eq!(sanitize_request_path("/a%5c..%5cb", "index.html"), Err(PathError::Traversal));
        assert_eq!(sanitize_request_path("/a%00b", "index.html"), Err(PathError::Traversal));
        assert_eq!(sanitize_request_path("/C:/windows", "index.html"), Err(PathError::Traversal));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        assert_eq!(sanitize_request_path("/%ff%fe", "index.html"), Err(PathError::Encoding));
    }

    #[test]
    fn test_double_dot_anywhere_is_rejected() {
        for raw in ["/file..txt", "/..hidden/app.js", "/css/a..b/style.css", "/file%2e%2etxt"] {
            assert_eq!(sanitize_request_path(raw, "index.html"), Err(PathError::Traversal), "{raw}");
        }
    }

    #[test]
    fn test_single_dots_in_names_are_allowed() {
        assert_eq!(
            sanitize_request_path("/.well-known/app.min.js", "index.html"),
            Ok(PathBuf::from(".well-known/app.min.js"))
        );
    }
}
