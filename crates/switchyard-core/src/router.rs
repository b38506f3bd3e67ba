//! Router facade
//!
//! The router owns the route registry, the global middleware list and the
//! dispatcher. Registration needs `&mut Router`; dispatch only needs
//! `&Router`, so a fully configured router can be shared across threads.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_core::{Output, Request, Router};
//! use std::fmt::Write;
//!
//! let mut router = Router::new();
//! router.get("/", |_req: Request| "home")?;
//! router.get("/blog/{year}/{month}/{slug}", |req: Request, out: &mut Output| {
//!     write!(out, "{}", req.param("slug").unwrap_or_default())
//! })?;
//! router.group("/admin", vec![auth.into_shared()], |admin| {
//!     admin.get("/dashboard", dashboard)?;
//!     Ok(())
//! })?;
//! ```

use crate::controller::{ApiControllerHandler, ControllerSource, WebControllerHandler};
use crate::dispatcher::RouteDispatcher;
use crate::error::{Result, RouteError};
use crate::handler::{into_boxed_handler, Handler, IntoReply};
use crate::middleware::{Middleware, MiddlewareQueue, SharedMiddleware};
use crate::output::Output;
use crate::pattern::RoutePattern;
use crate::registry::{Route, RouteRegistry};
use crate::request::{Request, HOME_PATH};
use crate::response::Response;
use crate::view::{ViewRenderer, ViewSource};
use http::Method;
use std::sync::Arc;

/// Route registration and dispatch
#[derive(Default)]
pub struct Router {
    registry: RouteRegistry,
    middleware: Vec<SharedMiddleware>,
    dispatcher: RouteDispatcher,
}

impl Router {
    /// Create an empty router
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and `pattern` with route middleware.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] for an invalid method or pattern. Nothing is
    /// registered in that case.
    pub fn add<H, T>(
        &mut self,
        method: &str,
        pattern: &str,
        handler: H,
        middleware: Vec<SharedMiddleware>,
    ) -> Result<&mut Self, RouteError>
    where
        H: Handler<T>,
        T: 'static,
    {
        self.register("", &[], method, pattern, handler, middleware)?;
        Ok(self)
    }

    /// Register routes under `prefix` with `middleware` applied to each.
    ///
    /// The callback gets a [`RouteGroup`]; nested groups concatenate
    /// prefixes and middleware, outer first. Nothing of the group survives
    /// the callback, whether it succeeds or not.
    ///
    /// # Errors
    ///
    /// Returns the first [`RouteError`] raised inside the callback. Routes
    /// registered before the failure stay registered.
    pub fn group<F>(
        &mut self,
        prefix: &str,
        middleware: Vec<SharedMiddleware>,
        callback: F,
    ) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut RouteGroup<'_>) -> Result<(), RouteError>,
    {
        let mut group = RouteGroup {
            router: &mut *self,
            prefix: prefix.trim_matches('/').to_string(),
            middleware,
        };
        callback(&mut group)?;
        Ok(self)
    }

    /// Append global middleware, run before route resolution
    pub fn add_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Install the not-found callback, replacing any previous one
    pub fn set_not_found<F, R>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Output) -> R + Send + Sync + 'static,
        R: IntoReply,
    {
        self.registry.set_not_found(callback);
        self
    }

    /// Resolve controllers through `source`
    pub fn with_controllers<S: ControllerSource>(&mut self, source: S) -> &mut Self {
        let source: Arc<dyn ControllerSource> = Arc::new(source);
        self.dispatcher.set_controllers(
            ApiControllerHandler::new(Arc::clone(&source)),
            WebControllerHandler::new(source),
        );
        self
    }

    /// Render views from `source`
    pub fn with_views<S: ViewSource>(&mut self, source: S) -> &mut Self {
        self.dispatcher.set_views(ViewRenderer::new(Arc::new(source)));
        self
    }

    /// Dispatch `req` through the global middleware and the dispatcher.
    ///
    /// # Errors
    ///
    /// Faults raised while handling the request. Unmatched requests are an
    /// `Ok` 404 response.
    pub fn dispatch(&self, req: Request) -> Result<Response> {
        let mut queue = MiddlewareQueue::new(&self.middleware, |req| {
            self.dispatcher.dispatch(&self.registry, req)
        });
        queue.handle(req)
    }

    /// The route registry
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Registered routes in registration order
    pub fn routes(&self) -> &[Route] {
        self.registry.routes()
    }

    fn register<H, T>(
        &mut self,
        prefix: &str,
        inherited: &[SharedMiddleware],
        method: &str,
        pattern: &str,
        handler: H,
        middleware: Vec<SharedMiddleware>,
    ) -> Result<(), RouteError>
    where
        H: Handler<T>,
        T: 'static,
    {
        let method = parse_method(method)?;
        let full = join_pattern(prefix, pattern);
        let compiled = RoutePattern::parse(&full)?;

        let mut route_middleware = Vec::with_capacity(inherited.len() + middleware.len());
        route_middleware.extend(inherited.iter().cloned());
        route_middleware.extend(middleware);

        tracing::debug!(method = %method, pattern = %full, middleware = route_middleware.len(), "Registered route");
        self.registry.add(Route::new(
            method,
            compiled,
            into_boxed_handler(handler),
            route_middleware,
        ));
        Ok(())
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("middleware", &self.middleware.len())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

/// Registration scope of a [`Router::group`] callback
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    prefix: String,
    middleware: Vec<SharedMiddleware>,
}

impl RouteGroup<'_> {
    /// Register a route under this group's prefix and middleware
    ///
    /// # Errors
    ///
    /// Same as [`Router::add`].
    pub fn add<H, T>(
        &mut self,
        method: &str,
        pattern: &str,
        handler: H,
        middleware: Vec<SharedMiddleware>,
    ) -> Result<&mut Self, RouteError>
    where
        H: Handler<T>,
        T: 'static,
    {
        self.router
            .register(&self.prefix, &self.middleware, method, pattern, handler, middleware)?;
        Ok(self)
    }

    /// Open a nested group
    ///
    /// # Errors
    ///
    /// Same as [`Router::group`].
    pub fn group<F>(
        &mut self,
        prefix: &str,
        middleware: Vec<SharedMiddleware>,
        callback: F,
    ) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut RouteGroup<'_>) -> Result<(), RouteError>,
    {
        let mut inherited = self.middleware.clone();
        inherited.extend(middleware);
        let mut nested = RouteGroup {
            router: &mut *self.router,
            prefix: join_prefix(&self.prefix, prefix),
            middleware: inherited,
        };
        callback(&mut nested)?;
        Ok(self)
    }

    /// Accumulated prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

macro_rules! verb_helpers {
    ($target:ty) => {
        impl $target {
            /// Register a GET route
            pub fn get<H: Handler<T>, T: 'static>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError> {
                self.add("GET", pattern, handler, Vec::new())
            }

            /// Register a POST route
            pub fn post<H: Handler<T>, T: 'static>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError> {
                self.add("POST", pattern, handler, Vec::new())
            }

            /// Register a PUT route
            pub fn put<H: Handler<T>, T: 'static>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError> {
                self.add("PUT", pattern, handler, Vec::new())
            }

            /// Register a PATCH route
            pub fn patch<H: Handler<T>, T: 'static>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError> {
                self.add("PATCH", pattern, handler, Vec::new())
            }

            /// Register a DELETE route
            pub fn delete<H: Handler<T>, T: 'static>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError> {
                self.add("DELETE", pattern, handler, Vec::new())
            }
        }
    };
}

verb_helpers!(Router);
verb_helpers!(RouteGroup<'_>);

fn parse_method(method: &str) -> Result<Method, RouteError> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes()).map_err(|_| RouteError::InvalidMethod {
        method: method.to_string(),
    })
}

fn join_prefix(prefix: &str, next: &str) -> String {
    let next = next.trim_matches('/');
    match (prefix.is_empty(), next.is_empty()) {
        (true, _) => next.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, next),
    }
}

/// Full route pattern for `pattern` under `prefix`. The root maps to
/// [`HOME_PATH`] the same way request paths do.
fn join_pattern(prefix: &str, pattern: &str) -> String {
    let joined = join_prefix(prefix.trim_matches('/'), pattern);
    if joined.is_empty() {
        HOME_PATH.to_string()
    } else {
        joined
    }
}
