//! Mount-path matching and path rewriting.
//!
//! # Responsibilities
//! - Decide whether a request path falls under a mount path
//! - Strip a configured prefix from the path before forwarding
//!
//! # Design Decisions
//! - Matching is anchored at path-segment boundaries: `/api` matches
//!   `/api` and `/api/v1` but not `/apifoo`, so a sibling prefix can
//!   never shadow the catch-all's traffic
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

/// Returns true when `path` falls under `mount_path`.
///
/// The root mount `/` matches every path.
pub fn mount_matches(mount_path: &str, path: &str) -> bool {
    if mount_path == "/" {
        return true;
    }
    match path.strip_prefix(mount_path) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Remove exactly one leading occurrence of `prefix` from `path`.
///
/// An empty remainder forwards as `/`. A path that does not carry the
/// prefix is returned unchanged.
pub fn strip_prefix_once(path: &str, prefix: &str) -> String {
    match path.strip_prefix(prefix) {
        Some("") => "/".to_string(),
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_matches_segments() {
        assert!(mount_matches("/api", "/api"));
        assert!(mount_matches("/api", "/api/v1/games"));
        assert!(!mount_matches("/api", "/apifoo"));
        assert!(!mount_matches("/api", "/images"));
        assert!(!mount_matches("/users", "/api/users"));
    }

    #[test]
    fn root_mount_matches_everything() {
        assert!(mount_matches("/", "/"));
        assert!(mount_matches("/", "/anything/else"));
        assert!(mount_matches("/", "/api"));
    }

    #[test]
    fn strip_removes_one_leading_occurrence() {
        assert_eq!(strip_prefix_once("/api/v1/games/42", "/api"), "/v1/games/42");
        assert_eq!(strip_prefix_once("/users/createuser", "/users"), "/createuser");
        // The prefix is only stripped at the start, and only once.
        assert_eq!(strip_prefix_once("/api/api/x", "/api"), "/api/x");
    }

    #[test]
    fn empty_remainder_becomes_root() {
        assert_eq!(strip_prefix_once("/api", "/api"), "/");
    }

    #[test]
    fn unrelated_path_is_unchanged() {
        assert_eq!(strip_prefix_once("/other", "/api"), "/other");
    }
}
