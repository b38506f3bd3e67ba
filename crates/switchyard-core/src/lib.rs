//! # Switchyard Core
//!
//! Request routing and dispatch for Switchyard.
//!
//! A [`Router`] resolves each request through, in order, registered routes,
//! API controllers, web controllers and file-backed views, falling back to a
//! 404. Global middleware wraps the whole resolution; route middleware wraps
//! the matched handler only.
//!
//! This crate is not meant to be used directly. Use `switchyard` instead.

mod attributes;
pub mod controller;
mod dispatcher;
mod error;
mod handler;
mod logging;
pub mod middleware;
pub mod naming;
mod not_found;
mod output;
mod pattern;
mod registry;
mod request;
mod response;
mod router;
mod server;
#[cfg(any(test, feature = "test-utils"))]
mod test_client;
pub mod view;

// Public API
pub use attributes::Attributes;
pub use controller::{
    ActionContext, ApiControllerHandler, Controller, ControllerClass, ControllerKind, ControllerRegistration,
    ControllerRegistry, ControllerSource, WebControllerHandler,
};
pub use dispatcher::{RouteDispatcher, REQUESTED_VIEW_ATTRIBUTE};
pub use error::{get_environment, ApiError, Environment, Result, RouteError};
pub use handler::{Handler, IntoReply, Reply};
pub use logging::{init_tracing, DEFAULT_FILTER};
pub use middleware::{from_fn, Middleware, MiddlewareQueue, RequestIdMiddleware, SharedMiddleware, TracingMiddleware};
pub use not_found::{NotFoundHandler, NOT_FOUND_BODY};
pub use output::Output;
pub use pattern::RoutePattern;
pub use registry::{Route, RouteRegistry};
pub use request::{normalize_method, normalize_path, Request, HOME_PATH};
pub use response::{Html, IntoResponse, Json, NoContent, Redirect, Response};
pub use router::{RouteGroup, Router};
pub use server::{serve, Server, DEFAULT_BODY_LIMIT};
#[cfg(any(test, feature = "test-utils"))]
pub use test_client::{TestClient, TestRequest, TestResponse};
pub use view::{ViewPart, ViewRenderer, ViewSource};

// Used by `inventory::submit!` in downstream crates
#[doc(hidden)]
pub use inventory;
