//! Route lookup.
//!
//! # Responsibilities
//! - Compile the ordered route table from the configured domains
//! - Look up the first route matching a method and path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in table order; first match wins
//! - `/health` is always first and accepts any method

use crate::domain::DomainProfile;
use crate::routing::matcher::{
    AndMatcher, Matcher, MethodMatcher, PathExactMatcher, PathPrefixMatcher,
};

pub const HEALTH_PATH: &str = "/health";

/// Operation a route dispatches to. Domain routes carry the index of their
/// profile in the configured domain list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Health,
    ListInstances { domain: usize },
    CreateInstance { domain: usize },
    ManageInstance { domain: usize },
    ListApplications { domain: usize },
}

/// A compiled route.
#[derive(Debug)]
pub struct Route {
    /// Stable name for logging/metrics, e.g. `web.create_instance`.
    pub name: String,
    pub target: RouteTarget,
    matcher: AndMatcher,
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub name: &'a str,
    pub target: RouteTarget,
    /// Last path segment, set for instance-scoped routes.
    pub instance_id: Option<String>,
}

/// Ordered route table.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile routes for `domains`, keeping their order.
    pub fn from_profiles(domains: &[DomainProfile]) -> Self {
        let mut routes = vec![Route {
            name: "health".to_string(),
            target: RouteTarget::Health,
            matcher: AndMatcher::new(vec![Box::new(PathExactMatcher::new(HEALTH_PATH))]),
        }];

        for (index, profile) in domains.iter().enumerate() {
            let instances = profile.instances_path();

            routes.push(route(
                profile,
                "list_instances",
                RouteTarget::ListInstances { domain: index },
                "GET",
                Box::new(PathExactMatcher::new(instances.clone())),
            ));
            routes.push(route(
                profile,
                "create_instance",
                RouteTarget::CreateInstance { domain: index },
                "POST",
                Box::new(PathExactMatcher::new(instances.clone())),
            ));
            routes.push(route(
                profile,
                "manage_instance",
                RouteTarget::ManageInstance { domain: index },
                "PUT",
                Box::new(PathPrefixMatcher::new(format!("{instances}/"))),
            ));
            if profile.catalog.is_some() {
                routes.push(route(
                    profile,
                    "list_applications",
                    RouteTarget::ListApplications { domain: index },
                    "GET",
                    Box::new(PathExactMatcher::new(profile.applications_path())),
                ));
            }
        }

        Self { routes }
    }

    /// Find the first route matching the request line.
    pub fn match_request(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        let route = self.routes.iter().find(|r| r.matcher.matches(method, path))?;

        let instance_id = match route.target {
            RouteTarget::ManageInstance { .. } => path.rsplit('/').next().map(String::from),
            _ => None,
        };

        Some(RouteMatch {
            name: &route.name,
            target: route.target,
            instance_id,
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

fn route(
    profile: &DomainProfile,
    operation: &str,
    target: RouteTarget,
    method: &str,
    path: Box<dyn Matcher>,
) -> Route {
    Route {
        name: format!("{}.{}", profile.name, operation),
        target,
        matcher: AndMatcher::new(vec![Box::new(MethodMatcher::new(method)), path]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::from_profiles(&[DomainProfile::gaming(), DomainProfile::web()])
    }

    #[test]
    fn test_route_order() {
        let binding = table();
        let names: Vec<&str> = binding.routes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "health",
                "gaming.list_instances",
                "gaming.create_instance",
                "gaming.manage_instance",
                "web.list_instances",
                "web.create_instance",
                "web.manage_instance",
                "web.list_applications",
            ]
        );
    }

    #[test]
    fn test_health_any_method() {
        let table = table();
        for method in ["GET", "POST", "DELETE", "PATCH"] {
            assert_eq!(
                table.match_request(method, "/health").unwrap().target,
                RouteTarget::Health
            );
        }
    }

    #[test]
    fn test_domain_routes() {
        let table = table();
        assert_eq!(
            table.match_request("GET", "/web/instances").unwrap().target,
            RouteTarget::ListInstances { domain: 1 }
        );
        assert_eq!(
            table.match_request("POST", "/gaming/instances").unwrap().target,
            RouteTarget::CreateInstance { domain: 0 }
        );
        assert_eq!(
            table.match_request("GET", "/web/applications").unwrap().name,
            "web.list_applications"
        );
        assert!(table.match_request("GET", "/gaming/applications").is_none());
        assert!(table.match_request("DELETE", "/web/instances").is_none());
        assert!(table.match_request("GET", "/unknown").is_none());
    }

    #[test]
    fn test_manage_extracts_last_segment() {
        let table = table();
        let m = table.match_request("PUT", "/web/instances/i-web-12345").unwrap();
        assert_eq!(m.target, RouteTarget::ManageInstance { domain: 1 });
        assert_eq!(m.instance_id.as_deref(), Some("i-web-12345"));

        let nested = table.match_request("PUT", "/web/instances/a/b").unwrap();
        assert_eq!(nested.instance_id.as_deref(), Some("b"));

        let empty = table.match_request("PUT", "/web/instances/").unwrap();
        assert_eq!(empty.instance_id.as_deref(), Some(""));

        assert!(table.match_request("GET", "/web/instances/i-1").is_none());
    }
}
