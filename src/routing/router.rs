//! Route table compilation and lookup.
//!
//! # Responsibilities
//! - Parse route targets once, at startup
//! - Look up the first rule whose mount path covers a request path
//! - Derive the upstream URI for a matched request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) first-match scan in declaration order; the validated table
//!   always ends with the catch-all, so every path matches
//! - Targets are pre-parsed into scheme/authority so the hot path never
//!   parses a URL

use axum::http::header::HeaderValue;
use axum::http::uri::{Authority, Scheme};
use axum::http::Uri;
use thiserror::Error;

use crate::config::RouteConfig;
use crate::routing::matcher;

/// Error building the routing table from configuration.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route {route}: target {target:?} is not a valid URI")]
    InvalidTarget { route: String, target: String },

    #[error("route {route}: target {target:?} must carry scheme and authority")]
    IncompleteTarget { route: String, target: String },
}

/// One compiled routing rule. Static for the process lifetime.
#[derive(Debug, Clone)]
pub struct RouteRule {
    name: String,
    mount_path: String,
    strip_prefix: Option<String>,
    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
}

impl RouteRule {
    fn from_config(config: &RouteConfig) -> Result<Self, RouteError> {
        let uri: Uri = config.target.parse().map_err(|_| RouteError::InvalidTarget {
            route: config.name.clone(),
            target: config.target.clone(),
        })?;

        let (scheme, authority) = match (uri.scheme(), uri.authority()) {
            (Some(scheme), Some(authority)) => (scheme.clone(), authority.clone()),
            _ => {
                return Err(RouteError::IncompleteTarget {
                    route: config.name.clone(),
                    target: config.target.clone(),
                })
            }
        };

        let host_header =
            HeaderValue::from_str(authority.as_str()).map_err(|_| RouteError::InvalidTarget {
                route: config.name.clone(),
                target: config.target.clone(),
            })?;

        Ok(Self {
            name: config.name.clone(),
            mount_path: config.mount_path.clone(),
            strip_prefix: config.strip_prefix.clone(),
            scheme,
            authority,
            host_header,
        })
    }

    /// Route identifier for logging and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mount path this rule matches under.
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// Upstream scheme (`http` or `https`).
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Upstream authority (host and port).
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// `Host` header value carrying the upstream authority.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Whether `path` falls under this rule's mount path.
    pub fn matches(&self, path: &str) -> bool {
        matcher::mount_matches(&self.mount_path, path)
    }

    /// The path to forward upstream: the original path with the strip
    /// prefix removed once, or unchanged when no prefix is configured.
    pub fn rewrite_path(&self, path: &str) -> String {
        match &self.strip_prefix {
            Some(prefix) => matcher::strip_prefix_once(path, prefix),
            None => path.to_string(),
        }
    }

    /// Rewritten path plus the original query string, untouched.
    pub fn rewrite_path_and_query(&self, uri: &Uri) -> String {
        let path = self.rewrite_path(uri.path());
        match uri.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        }
    }

    /// The full upstream URI for a matched request.
    pub fn upstream_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(self.rewrite_path_and_query(uri))
            .build()
    }
}

/// Ordered, immutable routing table. Built once from configuration;
/// no request ever mutates it.
#[derive(Debug)]
pub struct RoutingTable {
    rules: Vec<RouteRule>,
}

impl RoutingTable {
    /// Compile the table from configuration, in declaration order.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, RouteError> {
        let rules = routes
            .iter()
            .map(RouteRule::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// First rule whose mount path covers `path`, in table order.
    pub fn match_path(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    fn deployment_table() -> RoutingTable {
        RoutingTable::from_config(&GatewayConfig::default().routes).unwrap()
    }

    #[test]
    fn specific_mounts_win_over_catch_all() {
        let table = deployment_table();
        assert_eq!(table.match_path("/api/v1/games").unwrap().name(), "gamey");
        assert_eq!(table.match_path("/users/createuser").unwrap().name(), "users");
        assert_eq!(table.match_path("/anything/else").unwrap().name(), "webapp");
        assert_eq!(table.match_path("/").unwrap().name(), "webapp");
    }

    #[test]
    fn sibling_prefix_falls_through_to_catch_all() {
        let table = deployment_table();
        assert_eq!(table.match_path("/apifoo").unwrap().name(), "webapp");
        assert_eq!(table.match_path("/users2").unwrap().name(), "webapp");
    }

    #[test]
    fn upstream_uri_strips_prefix() {
        let table = deployment_table();
        let uri: Uri = "/api/v1/games/42".parse().unwrap();
        let rule = table.match_path(uri.path()).unwrap();
        assert_eq!(
            rule.upstream_uri(&uri).unwrap().to_string(),
            "http://gamey:4000/v1/games/42"
        );

        let uri: Uri = "/users/createuser".parse().unwrap();
        let rule = table.match_path(uri.path()).unwrap();
        assert_eq!(
            rule.upstream_uri(&uri).unwrap().to_string(),
            "http://users:3000/createuser"
        );
    }

    #[test]
    fn catch_all_forwards_path_unchanged() {
        let table = deployment_table();
        let uri: Uri = "/anything/else".parse().unwrap();
        let rule = table.match_path(uri.path()).unwrap();
        assert_eq!(
            rule.upstream_uri(&uri).unwrap().to_string(),
            "http://webapp:80/anything/else"
        );
    }

    #[test]
    fn query_string_is_preserved() {
        let table = deployment_table();
        let uri: Uri = "/api/v1/games?status=open&page=2".parse().unwrap();
        let rule = table.match_path(uri.path()).unwrap();
        assert_eq!(
            rule.upstream_uri(&uri).unwrap().to_string(),
            "http://gamey:4000/v1/games?status=open&page=2"
        );
    }

    #[test]
    fn bare_mount_forwards_as_root() {
        let table = deployment_table();
        let uri: Uri = "/api".parse().unwrap();
        let rule = table.match_path(uri.path()).unwrap();
        assert_eq!(rule.upstream_uri(&uri).unwrap().to_string(), "http://gamey:4000/");
    }

    #[test]
    fn rewrite_is_stateless() {
        let table = deployment_table();
        let rule = table.match_path("/api/v1/games").unwrap();
        let first = rule.rewrite_path("/api/v1/games");
        let second = rule.rewrite_path("/api/v1/games");
        assert_eq!(first, second);
    }

    #[test]
    fn incomplete_target_is_rejected() {
        let config = RouteConfig {
            name: "bad".to_string(),
            mount_path: "/".to_string(),
            strip_prefix: None,
            target: "/just/a/path".to_string(),
        };
        assert!(matches!(
            RoutingTable::from_config(&[config]),
            Err(RouteError::IncompleteTarget { .. })
        ));
    }
}
