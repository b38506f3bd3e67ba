//! Request resolution
//!
//! [`RouteDispatcher::dispatch`] tries, in order:
//!
//! 1. registered routes, first match wins, each with its own middleware
//! 2. API controllers, for paths under `api/` (a miss goes straight to 404)
//! 3. web controllers
//! 4. views named by the path
//! 5. the not-found handler
//!
//! Every attempt writes into a fresh [`Output`], so a body never carries
//! anything written by an attempt that did not handle the request.

use crate::controller::{ApiControllerHandler, WebControllerHandler};
use crate::error::Result;
use crate::middleware::MiddlewareQueue;
use crate::not_found::NotFoundHandler;
use crate::output::Output;
use crate::registry::RouteRegistry;
use crate::request::Request;
use crate::response::Response;
use crate::view::ViewRenderer;
use http::StatusCode;
use serde_json::{Map, Value};

/// Attribute holding the normalized path being dispatched
pub const REQUESTED_VIEW_ATTRIBUTE: &str = "requested_view";

const API_PREFIX: &str = "api/";

/// The resolution engine behind `Router::dispatch`
#[derive(Debug, Default)]
pub struct RouteDispatcher {
    api: Option<ApiControllerHandler>,
    web: Option<WebControllerHandler>,
    views: Option<ViewRenderer>,
    not_found: NotFoundHandler,
}

impl RouteDispatcher {
    /// Create a dispatcher that only knows registered routes
    pub fn new() -> Self {
        Self::default()
    }

    /// Install controller handlers
    pub fn set_controllers(&mut self, api: ApiControllerHandler, web: WebControllerHandler) {
        self.api = Some(api);
        self.web = Some(web);
    }

    /// Install the view renderer
    pub fn set_views(&mut self, views: ViewRenderer) {
        self.views = Some(views);
    }

    /// Resolve `req` against `registry` and the installed collaborators.
    ///
    /// # Errors
    ///
    /// Only faults raised by handlers, middleware, controller actions, views
    /// or the not-found callback. A request nothing handles is an `Ok` 404.
    pub fn dispatch(&self, registry: &RouteRegistry, req: Request) -> Result<Response> {
        let path = req.path().to_string();
        let req = req.with_attribute(REQUESTED_VIEW_ATTRIBUTE, path.as_str());

        for route in registry.routes() {
            let Some(params) = route.matches(req.method(), &path) else {
                continue;
            };
            tracing::debug!(method = %req.method(), pattern = route.pattern(), "Matched route");

            let req = params
                .into_iter()
                .fold(req, |req, (name, value)| req.with_attribute(name, value));
            let handler = route.handler();
            let mut queue = MiddlewareQueue::new(route.middleware(), move |req| {
                let mut out = Output::new();
                let reply = handler(req, &mut out)?;
                Ok(reply.into_response(out, StatusCode::OK))
            });
            return queue.handle(req);
        }

        if path.starts_with(API_PREFIX) {
            if let Some(api) = &self.api {
                let mut out = Output::new();
                if let Some(reply) = api.handle(&req, &mut out)? {
                    return Ok(reply.into_response(out, StatusCode::OK));
                }
            }
            tracing::debug!(path = %path, "No API controller handled request");
            return self.not_found.handle(registry);
        }

        if let Some(web) = &self.web {
            let mut out = Output::new();
            if let Some(reply) = web.handle(&req, &mut out)? {
                return Ok(reply.into_response(out, StatusCode::OK));
            }
        }

        if let Some(views) = &self.views {
            let mut out = Output::new();
            let mut data = Map::new();
            data.insert(REQUESTED_VIEW_ATTRIBUTE.to_string(), Value::String(path.clone()));
            if views.render(&path, &data, &mut out)? {
                return Ok(out.into_response(StatusCode::OK));
            }
        }

        tracing::debug!(method = %req.method(), path = %path, "No handler found");
        self.not_found.handle(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing;
    use crate::handler::into_boxed_handler;
    use crate::pattern::RoutePattern;
    use crate::registry::Route;
    use crate::view::testing::MemoryViews;
    use bytes::Bytes;
    use http::Method;
    use std::sync::Arc;

    fn dispatcher() -> RouteDispatcher {
        let source = Arc::new(testing::registry());
        let mut dispatcher = RouteDispatcher::new();
        dispatcher.set_controllers(
            ApiControllerHandler::new(source.clone()),
            WebControllerHandler::new(source),
        );
        let views = MemoryViews::default()
            .with_view("about", "about:{{requested_view}}")
            .with_view("api/docs", "docs")
            .with_view("blog/archive", "archive");
        dispatcher.set_views(ViewRenderer::new(Arc::new(views)));
        dispatcher
    }

    fn add(registry: &mut RouteRegistry, method: Method, pattern: &str, body: &'static str) {
        registry.add(Route::new(
            method,
            RoutePattern::parse(pattern).unwrap(),
            into_boxed_handler(move |_req: Request| body),
            Vec::new(),
        ));
    }

    fn body(response: &Response) -> &[u8] {
        response.body()
    }

    #[test]
    fn test_first_registered_route_wins() {
        let mut registry = RouteRegistry::new();
        add(&mut registry, Method::GET, "blog/{slug}", "first");
        add(&mut registry, Method::GET, "blog/{id}", "second");

        let response = dispatcher()
            .dispatch(&registry, Request::new(Method::GET, "/blog/hello"))
            .unwrap();
        assert_eq!(body(&response), b"first");
    }

    #[test]
    fn test_route_beats_controller() {
        let mut registry = RouteRegistry::new();
        add(&mut registry, Method::GET, "blog", "route");

        let response = dispatcher()
            .dispatch(&registry, Request::new(Method::GET, "/blog"))
            .unwrap();
        assert_eq!(body(&response), b"route");
    }

    #[test]
    fn test_method_must_match() {
        let mut registry = RouteRegistry::new();
        add(&mut registry, Method::POST, "about", "posted");

        let response = dispatcher()
            .dispatch(&registry, Request::new(Method::GET, "/about"))
            .unwrap();
        assert_eq!(body(&response), b"about:about");
    }

    #[test]
    fn test_api_controller() {
        let response = dispatcher()
            .dispatch(&RouteRegistry::new(), Request::new(Method::POST, "/api/sample/create/42/foo"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response), b"post_create(42,foo)");
    }

    #[test]
    fn test_api_miss_skips_web_and_views() {
        let response = dispatcher()
            .dispatch(&RouteRegistry::new(), Request::new(Method::GET, "/api/docs"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_web_controller() {
        let response = dispatcher()
            .dispatch(&RouteRegistry::new(), Request::new(Method::GET, "/blog/show/7"))
            .unwrap();
        assert_eq!(body(&response), b"show(7)");
    }

    #[test]
    fn test_web_action_miss_falls_through_to_view() {
        let response = dispatcher()
            .dispatch(&RouteRegistry::new(), Request::new(Method::GET, "/blog/archive"))
            .unwrap();
        assert_eq!(body(&response), b"archive");
    }

    #[test]
    fn test_view_gets_requested_view() {
        let response = dispatcher()
            .dispatch(&RouteRegistry::new(), Request::new(Method::GET, "/about/"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response), b"about:about");
    }

    #[test]
    fn test_fallback_is_default_404() {
        let response = dispatcher()
            .dispatch(&RouteRegistry::new(), Request::new(Method::GET, "/unknown-path"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), &Bytes::from("404 Not Found"));
    }

    #[test]
    fn test_bare_dispatcher_only_knows_routes() {
        let response = RouteDispatcher::new()
            .dispatch(&RouteRegistry::new(), Request::new(Method::GET, "/blog"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_requested_view_attribute() {
        let mut registry = RouteRegistry::new();
        registry.add(Route::new(
            Method::GET,
            RoutePattern::parse("home").unwrap(),
            into_boxed_handler(|req: Request| {
                req.param(REQUESTED_VIEW_ATTRIBUTE).unwrap_or_default().to_string()
            }),
            Vec::new(),
        ));

        let response = RouteDispatcher::new()
            .dispatch(&registry, Request::new(Method::GET, "/"))
            .unwrap();
        assert_eq!(body(&response), b"home");
    }
}
