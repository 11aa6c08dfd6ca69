//! Path utilities shared by the tree builder and the matcher
//!
//! All functions are pure. Canonical paths start with `/`, never end with
//! `/` (except the root itself) and contain no empty segments.

use std::borrow::Cow;

pub mod hierarchy;
pub use hierarchy::PathHierarchy;

/// Checks whether a path is already in canonical form
///
/// ```
/// use tuono_router::path::is_canonical;
///
/// assert!(is_canonical("/"));
/// assert!(is_canonical("/posts/[post]"));
///
/// assert!(!is_canonical(""));
/// assert!(!is_canonical("posts"));
/// assert!(!is_canonical("/posts/"));
/// assert!(!is_canonical("/posts//a"));
/// assert!(!is_canonical("/posts\\a"));
/// ```
pub fn is_canonical(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }
    if path.contains("//") || path.contains('\\') {
        return false;
    }
    path == "/" || !path.ends_with('/')
}

/// Normalizes a path to canonical form
///
/// Returns `Cow::Borrowed` when nothing needs to change.
///
/// ```
/// use tuono_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/about"), Cow::Borrowed("/about")));
/// assert_eq!(normalize_path("/posts/"), "/posts");
/// assert_eq!(normalize_path("\\users\\123"), "/users/123");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_canonical(path) {
        return Cow::Borrowed(path);
    }

    let joined = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{joined}"))
    }
}

/// Drops a `?query` and `#fragment` suffix from a request path
///
/// ```
/// use tuono_router::path::strip_query_and_hash;
///
/// assert_eq!(strip_query_and_hash("/posts?page=2#top"), "/posts");
/// assert_eq!(strip_query_and_hash("/posts#top?x"), "/posts");
/// assert_eq!(strip_query_and_hash("/posts"), "/posts");
/// ```
pub fn strip_query_and_hash(path: &str) -> &str {
    match path.find(['?', '#']) {
        Some(pos) => &path[..pos],
        None => path,
    }
}

/// Non-empty segments of a path, in order
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Number of non-empty segments; `/` has zero
pub fn segment_count(path: &str) -> usize {
    segments(path).count()
}
