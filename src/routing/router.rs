//! Route registration and lookup.
//!
//! # Responsibilities
//! - Accept validated routes from the registrars, inside nested group scopes
//! - Reject would-be duplicate registrations (same predicate as the guard)
//! - Freeze into an immutable table and look up matching routes per request
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - First match wins, in registration order
//! - `where` constraints compile to anchored regexes once, at registration
//! - Host matching is case-insensitive; path matching is case-sensitive

use std::collections::{BTreeMap, BTreeSet, HashMap};

use axum::http::Method;
use regex::Regex;

use crate::actions::DispatchTarget;
use crate::node::NodeSource;
use crate::routing::pattern::{
    methods_intersect, patterns_conflict, placeholder_name, split_segments,
};
use crate::routing::path::{display_path, join_paths};

/// One segment of a compiled URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A group scope opened by the group registrar.
#[derive(Debug, Clone, Default)]
pub struct GroupScope {
    pub prefix: Option<String>,
    pub domain: Option<String>,
    pub namespace: Option<String>,
    pub middleware: Vec<String>,
    pub wheres: BTreeMap<String, String>,
}

/// What the route registrar hands over for one route.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub node_id: i64,
    pub source: NodeSource,
    pub uri: String,
    pub methods: BTreeSet<String>,
    pub name: Option<String>,
    pub domain: Option<String>,
    pub middleware: Vec<String>,
    pub wheres: BTreeMap<String, String>,
    pub defaults: BTreeMap<String, String>,
    pub target: DispatchTarget,
}

/// A mounted route, fully resolved against its group scopes.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub node_id: i64,
    pub source: NodeSource,
    pub full_path: String,
    pub segments: Vec<Segment>,
    pub methods: BTreeSet<String>,
    pub name: Option<String>,
    pub domain: Option<String>,
    /// Namespace tags inherited root-to-leaf; opaque to the router.
    pub namespaces: Vec<String>,
    pub middleware: Vec<String>,
    pub wheres: Vec<(String, Regex)>,
    pub defaults: BTreeMap<String, String>,
    pub target: DispatchTarget,
}

/// Registration failure for a single route.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("route {path} overlaps route {existing_path} ({existing_source}, node {existing_id})")]
    Duplicate {
        path: String,
        existing_id: i64,
        existing_path: String,
        existing_source: &'static str,
    },
    #[error("where pattern '{pattern}' for param '{param}' does not compile: {source}")]
    InvalidWhere {
        param: String,
        pattern: String,
        source: regex::Error,
    },
    #[error("route {path} declares no methods")]
    NoMethods { path: String },
}

/// Mutable registration surface consumed by the registrars.
#[derive(Default)]
pub struct RouterBuilder {
    scopes: Vec<GroupScope>,
    routes: Vec<CompiledRoute>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a group scope; everything registered until the matching
    /// `exit_scope` inherits it.
    pub fn enter_scope(&mut self, scope: GroupScope) {
        self.scopes.push(scope);
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// The prefix all currently open scopes contribute.
    pub fn current_prefix(&self) -> String {
        join_paths(self.scopes.iter().filter_map(|s| s.prefix.as_deref()))
    }

    /// Mount one route under the open scopes.
    pub fn register(&mut self, spec: RouteSpec) -> Result<(), RegisterError> {
        let full_path = join_paths(
            self.scopes
                .iter()
                .filter_map(|s| s.prefix.as_deref())
                .chain(std::iter::once(spec.uri.as_str())),
        );

        if spec.methods.is_empty() {
            return Err(RegisterError::NoMethods {
                path: display_path(&full_path),
            });
        }

        // The same overlap predicate the guard uses; a conflicting node that
        // somehow survived to registration is refused here rather than
        // silently shadowing an earlier route.
        if let Some(existing) = self.routes.iter().find(|r| {
            patterns_conflict(&r.full_path, &full_path)
                && methods_intersect(&r.methods, &spec.methods)
        }) {
            return Err(RegisterError::Duplicate {
                path: display_path(&full_path),
                existing_id: existing.node_id,
                existing_path: display_path(&existing.full_path),
                existing_source: existing.source.describe(),
            });
        }

        // Scope constraints first, the route's own override per param.
        let mut wheres = BTreeMap::new();
        for scope in &self.scopes {
            wheres.extend(scope.wheres.clone());
        }
        wheres.extend(spec.wheres);

        let mut compiled_wheres = Vec::with_capacity(wheres.len());
        for (param, pattern) in wheres {
            let anchored = format!("^(?:{})$", pattern);
            match Regex::new(&anchored) {
                Ok(regex) => compiled_wheres.push((param, regex)),
                Err(source) => {
                    return Err(RegisterError::InvalidWhere {
                        param,
                        pattern,
                        source,
                    })
                }
            }
        }

        let mut middleware: Vec<String> = self
            .scopes
            .iter()
            .flat_map(|s| s.middleware.iter().cloned())
            .collect();
        middleware.extend(spec.middleware);

        let domain = spec
            .domain
            .or_else(|| self.scopes.iter().rev().find_map(|s| s.domain.clone()));

        let namespaces = self
            .scopes
            .iter()
            .filter_map(|s| s.namespace.clone())
            .collect();

        let segments = split_segments(&full_path)
            .into_iter()
            .map(|s| match placeholder_name(s) {
                Some(param) => Segment::Param(param.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();

        self.routes.push(CompiledRoute {
            node_id: spec.node_id,
            source: spec.source,
            full_path,
            segments,
            methods: spec.methods,
            name: spec.name,
            domain,
            namespaces,
            middleware,
            wheres: compiled_wheres,
            defaults: spec.defaults,
            target: spec.target,
        });
        Ok(())
    }

    /// Freeze into the immutable lookup table.
    pub fn build(self) -> CompiledRouter {
        let mut by_name = HashMap::new();
        for (index, route) in self.routes.iter().enumerate() {
            if let Some(name) = &route.name {
                if by_name.contains_key(name) {
                    tracing::warn!(
                        name = %name,
                        node_id = route.node_id,
                        "Duplicate route name, keeping the first registration"
                    );
                } else {
                    by_name.insert(name.clone(), index);
                }
            }
        }
        CompiledRouter {
            routes: self.routes,
            by_name,
        }
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a CompiledRoute,
    /// Captured params merged over the route's defaults.
    pub params: BTreeMap<String, String>,
}

/// Immutable routing table; one per compile pass.
#[derive(Debug, Default)]
pub struct CompiledRouter {
    routes: Vec<CompiledRoute>,
    by_name: HashMap<String, usize>,
}

impl CompiledRouter {
    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn route_named(&self, name: &str) -> Option<&CompiledRoute> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    /// First matching route for a request, in registration order.
    pub fn match_request(
        &self,
        method: &Method,
        host: Option<&str>,
        path: &str,
    ) -> Option<RouteMatch<'_>> {
        let segments = split_segments(path);
        self.routes
            .iter()
            .find_map(|route| match_one(route, method, host, &segments))
    }
}

fn match_one<'a>(
    route: &'a CompiledRoute,
    method: &Method,
    host: Option<&str>,
    segments: &[&str],
) -> Option<RouteMatch<'a>> {
    if !method_allowed(route, method) {
        return None;
    }

    if let Some(domain) = &route.domain {
        // Host headers may carry a port; domains never do.
        let host = host?.split(':').next().unwrap_or_default();
        if !host.eq_ignore_ascii_case(domain) {
            return None;
        }
    }

    if segments.len() != route.segments.len() {
        return None;
    }

    let mut params = route.defaults.clone();
    for (expected, actual) in route.segments.iter().zip(segments) {
        match expected {
            Segment::Literal(literal) => {
                if literal != actual {
                    return None;
                }
            }
            Segment::Param(name) => {
                params.insert(name.clone(), (*actual).to_string());
            }
        }
    }

    for (param, regex) in &route.wheres {
        if let Some(value) = params.get(param) {
            if !regex.is_match(value) {
                return None;
            }
        }
    }

    Some(RouteMatch { route, params })
}

fn method_allowed(route: &CompiledRoute, method: &Method) -> bool {
    if route.methods.contains(method.as_str()) {
        return true;
    }
    // HEAD is answered by GET routes, as routers conventionally do.
    *method == Method::HEAD && route.methods.contains(Method::GET.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::pattern::normalize_methods;

    fn spec(id: i64, uri: &str, methods: &[&str]) -> RouteSpec {
        RouteSpec {
            node_id: id,
            source: NodeSource::Declarative,
            uri: uri.to_string(),
            methods: normalize_methods(methods),
            name: None,
            domain: None,
            middleware: Vec::new(),
            wheres: BTreeMap::new(),
            defaults: BTreeMap::new(),
            target: DispatchTarget::not_found("test"),
        }
    }

    #[test]
    fn test_scoped_prefixes_compose() {
        let mut builder = RouterBuilder::new();
        builder.enter_scope(GroupScope {
            prefix: Some("api".to_string()),
            ..GroupScope::default()
        });
        builder.enter_scope(GroupScope {
            prefix: Some("v1".to_string()),
            ..GroupScope::default()
        });
        builder.register(spec(-1, "users", &["GET"])).unwrap();
        builder.exit_scope();
        builder.exit_scope();

        let router = builder.build();
        assert_eq!(router.routes()[0].full_path, "api/v1/users");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut builder = RouterBuilder::new();
        builder.register(spec(-1, "blog/{slug}", &["GET"])).unwrap();
        let err = builder.register(spec(2, "blog/post", &["GET"])).unwrap_err();
        assert!(matches!(err, RegisterError::Duplicate { existing_id: -1, .. }));

        // Disjoint methods on the same path are fine.
        builder.register(spec(3, "blog/post", &["DELETE"])).unwrap();
    }

    #[test]
    fn test_match_captures_params_over_defaults() {
        let mut builder = RouterBuilder::new();
        let mut s = spec(-1, "blog/{slug}", &["GET"]);
        s.defaults.insert("slug".to_string(), "home".to_string());
        s.defaults.insert("page".to_string(), "1".to_string());
        builder.register(s).unwrap();
        let router = builder.build();

        let m = router
            .match_request(&Method::GET, None, "/blog/hello")
            .unwrap();
        assert_eq!(m.params.get("slug").map(String::as_str), Some("hello"));
        assert_eq!(m.params.get("page").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_where_constraint_filters_match() {
        let mut builder = RouterBuilder::new();
        let mut s = spec(-1, "post/{id}", &["GET"]);
        s.wheres.insert("id".to_string(), "[0-9]+".to_string());
        builder.register(s).unwrap();
        let router = builder.build();

        assert!(router.match_request(&Method::GET, None, "/post/42").is_some());
        assert!(router.match_request(&Method::GET, None, "/post/abc").is_none());
    }

    #[test]
    fn test_invalid_where_pattern_is_a_register_error() {
        let mut builder = RouterBuilder::new();
        let mut s = spec(-1, "post/{id}", &["GET"]);
        s.wheres.insert("id".to_string(), "[unclosed".to_string());
        assert!(matches!(
            builder.register(s),
            Err(RegisterError::InvalidWhere { .. })
        ));
    }

    #[test]
    fn test_domain_restriction_case_insensitive_with_port() {
        let mut builder = RouterBuilder::new();
        let mut s = spec(-1, "dash", &["GET"]);
        s.domain = Some("admin.example.com".to_string());
        builder.register(s).unwrap();
        let router = builder.build();

        assert!(router
            .match_request(&Method::GET, Some("Admin.Example.COM:8080"), "/dash")
            .is_some());
        assert!(router
            .match_request(&Method::GET, Some("example.com"), "/dash")
            .is_none());
        assert!(router.match_request(&Method::GET, None, "/dash").is_none());
    }

    #[test]
    fn test_head_served_by_get_route() {
        let mut builder = RouterBuilder::new();
        builder.register(spec(-1, "about", &["GET"])).unwrap();
        let router = builder.build();
        assert!(router.match_request(&Method::HEAD, None, "/about").is_some());
        assert!(router.match_request(&Method::POST, None, "/about").is_none());
    }

    #[test]
    fn test_first_match_wins_in_registration_order() {
        let mut builder = RouterBuilder::new();
        builder.register(spec(-1, "blog/{slug}", &["GET"])).unwrap();
        builder.register(spec(-2, "{page}/extra", &["POST"])).unwrap();
        let router = builder.build();

        let m = router.match_request(&Method::GET, None, "/blog/x").unwrap();
        assert_eq!(m.route.node_id, -1);
    }

    #[test]
    fn test_scope_wheres_and_middleware_inherited() {
        let mut builder = RouterBuilder::new();
        builder.enter_scope(GroupScope {
            prefix: Some("blog".to_string()),
            middleware: vec!["throttle".to_string()],
            wheres: BTreeMap::from([("slug".to_string(), "[a-z]+".to_string())]),
            ..GroupScope::default()
        });
        let mut s = spec(-1, "{slug}", &["GET"]);
        s.middleware.push("cache".to_string());
        builder.register(s).unwrap();
        builder.exit_scope();
        let router = builder.build();

        let route = &router.routes()[0];
        assert_eq!(route.middleware, vec!["throttle", "cache"]);
        assert!(router.match_request(&Method::GET, None, "/blog/abc").is_some());
        assert!(router.match_request(&Method::GET, None, "/blog/123").is_none());
    }
}
