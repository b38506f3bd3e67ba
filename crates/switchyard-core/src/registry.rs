//! Route storage
//!
//! Routes are kept in registration order and matched first to last, so the
//! first registered route wins when patterns overlap. Duplicates are allowed.

use crate::error::Result;
use crate::handler::{BoxedHandler, IntoReply, Reply};
use crate::middleware::SharedMiddleware;
use crate::output::Output;
use crate::pattern::RoutePattern;
use http::Method;
use std::sync::Arc;

/// Type-erased not-found callback
pub(crate) type NotFoundCallback = Arc<dyn Fn(&mut Output) -> Result<Reply> + Send + Sync>;

/// A registered route
pub struct Route {
    method: Method,
    pattern: RoutePattern,
    handler: BoxedHandler,
    middleware: Vec<SharedMiddleware>,
}

impl Route {
    pub(crate) fn new(
        method: Method,
        pattern: RoutePattern,
        handler: BoxedHandler,
        middleware: Vec<SharedMiddleware>,
    ) -> Self {
        Self {
            method,
            pattern,
            handler,
            middleware,
        }
    }

    /// HTTP method, uppercase
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full pattern, including any group prefix
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Parameter names in capture order
    pub fn param_names(&self) -> &[String] {
        self.pattern.param_names()
    }

    /// Route middleware, group middleware first
    pub fn middleware(&self) -> &[SharedMiddleware] {
        &self.middleware
    }

    pub(crate) fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Match method and whole path, returning the captured parameters
    pub fn matches<'p>(&self, method: &Method, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        if &self.method != method {
            return None;
        }
        self.pattern.captures(path)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("param_names", &self.pattern.param_names())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Ordered route store plus the not-found slot
#[derive(Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
    not_found: Option<NotFoundCallback>,
}

impl RouteRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route
    pub fn add(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Routes in registration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Install the not-found callback, replacing any previous one
    pub fn set_not_found<F, R>(&mut self, callback: F)
    where
        F: Fn(&mut Output) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        self.not_found = Some(Arc::new(move |out| callback(out).into_reply()));
    }

    /// Remove the not-found callback
    pub fn clear_not_found(&mut self) {
        self.not_found = None;
    }

    /// Check whether a custom not-found callback is installed
    pub fn has_not_found(&self) -> bool {
        self.not_found.is_some()
    }

    pub(crate) fn not_found(&self) -> Option<&NotFoundCallback> {
        self.not_found.as_ref()
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("routes", &self.routes)
            .field("not_found", &self.not_found.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::into_boxed_handler;
    use crate::request::Request;

    fn route(method: Method, pattern: &str, body: &'static str) -> Route {
        Route::new(
            method,
            RoutePattern::parse(pattern).unwrap(),
            into_boxed_handler(move |_req: Request| body),
            Vec::new(),
        )
    }

    #[test]
    fn test_routes_keep_insertion_order() {
        let mut registry = RouteRegistry::new();
        registry.add(route(Method::GET, "b", "b"));
        registry.add(route(Method::GET, "a", "a"));
        registry.add(route(Method::GET, "b", "b2"));

        let patterns: Vec<&str> = registry.routes().iter().map(Route::pattern).collect();
        assert_eq!(patterns, ["b", "a", "b"]);
    }

    #[test]
    fn test_route_matches_method_and_path() {
        let route = route(Method::GET, "users/{id}", "user");
        assert_eq!(route.matches(&Method::GET, "users/7"), Some(vec![("id", "7")]));
        assert_eq!(route.matches(&Method::POST, "users/7"), None);
        assert_eq!(route.matches(&Method::GET, "users"), None);
    }

    #[test]
    fn test_not_found_slot_last_write_wins() {
        let mut registry = RouteRegistry::new();
        assert!(!registry.has_not_found());

        registry.set_not_found(|out: &mut Output| out.push_str("first"));
        registry.set_not_found(|out: &mut Output| out.push_str("second"));

        let mut out = Output::new();
        let callback = registry.not_found().unwrap();
        callback(&mut out).unwrap();
        assert_eq!(out.as_bytes(), b"second");

        registry.clear_not_found();
        assert!(!registry.has_not_found());
    }
}
