//! Middleware infrastructure for Switchyard
//!
//! Global middleware is added with `Router::add_middleware` and runs before
//! any route resolution. Route middleware is passed to `Router::add` or
//! inherited from an enclosing group and runs around the matched handler only.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_core::middleware::{RequestIdMiddleware, TracingMiddleware};
//!
//! let mut router = Router::new();
//! router.add_middleware(RequestIdMiddleware::new());
//! router.add_middleware(TracingMiddleware::new());
//! router.get("/", |_req: Request| "home")?;
//! ```

mod queue;
mod request_id;
mod tracing_layer;

pub use queue::{from_fn, FnMiddleware, Middleware, MiddlewareQueue, SharedMiddleware};
pub use request_id::{RequestIdMiddleware, REQUEST_ID_ATTRIBUTE, REQUEST_ID_HEADER};
pub use tracing_layer::TracingMiddleware;
