//! Middleware trait and the one-shot queue that runs it
//!
//! A [`MiddlewareQueue`] walks an ordered middleware list with a cursor and
//! hands itself to each middleware as `next`. Calling `next.handle(req)`
//! resumes from the advanced cursor; once the list is exhausted the terminal
//! handler runs. The cursor never moves backwards, so each middleware runs at
//! most once per dispatch.

use crate::error::{ApiError, Result};
use crate::request::Request;
use crate::response::Response;
use std::sync::Arc;

/// A unit of request/response interception
///
/// Implementations either return a response of their own (short-circuit) or
/// call `next.handle(req)` and return, possibly after transforming, what it
/// produced.
pub trait Middleware: Send + Sync + 'static {
    /// Process the request, optionally delegating to the rest of the chain
    fn process(&self, req: Request, next: &mut MiddlewareQueue<'_>) -> Result<Response>;

    /// Wrap this middleware for storage in a middleware list
    fn into_shared(self) -> SharedMiddleware
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

/// Middleware as stored by the router
pub type SharedMiddleware = Arc<dyn Middleware>;

type Terminal<'a> = Box<dyn FnOnce(Request) -> Result<Response> + 'a>;

/// Ordered middleware around a one-shot terminal handler
pub struct MiddlewareQueue<'a> {
    middleware: &'a [SharedMiddleware],
    cursor: usize,
    terminal: Option<Terminal<'a>>,
}

impl<'a> MiddlewareQueue<'a> {
    /// Create a queue over `middleware` ending in `terminal`
    pub fn new<F>(middleware: &'a [SharedMiddleware], terminal: F) -> Self
    where
        F: FnOnce(Request) -> Result<Response> + 'a,
    {
        Self {
            middleware,
            cursor: 0,
            terminal: Some(Box::new(terminal)),
        }
    }

    /// Run the next middleware, or the terminal handler once the list is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Propagates errors from middleware and the terminal handler. Reaching
    /// the end of the list a second time is an internal error.
    pub fn handle(&mut self, req: Request) -> Result<Response> {
        let middleware = self.middleware;
        if let Some(current) = middleware.get(self.cursor) {
            self.cursor += 1;
            return current.process(req, self);
        }

        match self.terminal.take() {
            Some(terminal) => terminal(req),
            None => Err(ApiError::internal("Terminal handler invoked more than once")),
        }
    }

    /// Number of middleware not yet run
    pub fn remaining(&self) -> usize {
        self.middleware.len().saturating_sub(self.cursor)
    }
}

impl std::fmt::Debug for MiddlewareQueue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareQueue")
            .field("len", &self.middleware.len())
            .field("cursor", &self.cursor)
            .field("terminal_pending", &self.terminal.is_some())
            .finish()
    }
}

/// Middleware built from a closure, see [`from_fn`]
#[derive(Clone)]
pub struct FnMiddleware<F> {
    f: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Request, &mut MiddlewareQueue<'_>) -> Result<Response> + Send + Sync + 'static,
{
    fn process(&self, req: Request, next: &mut MiddlewareQueue<'_>) -> Result<Response> {
        (self.f)(req, next)
    }
}

/// Create middleware from a closure
///
/// ```rust,ignore
/// use switchyard_core::middleware::{from_fn, MiddlewareQueue};
///
/// let stamp = from_fn(|req: Request, next: &mut MiddlewareQueue<'_>| {
///     next.handle(req.with_attribute("stamped", true))
/// });
/// ```
pub fn from_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(Request, &mut MiddlewareQueue<'_>) -> Result<Response> + Send + Sync + 'static,
{
    FnMiddleware { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::IntoResponse;
    use bytes::Bytes;
    use http::{HeaderValue, Method, StatusCode};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Appends `tag` to the `trail` attribute before delegating.
    fn tagging(tag: &'static str) -> SharedMiddleware {
        from_fn(move |req: Request, next: &mut MiddlewareQueue<'_>| {
            let mut trail = req
                .attribute("trail")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            trail.push(json!(tag));
            next.handle(req.with_attribute("trail", trail))
        })
        .into_shared()
    }

    fn echo_trail(req: Request) -> Result<Response> {
        let trail = req.attribute("trail").cloned().unwrap_or(Value::Null);
        Ok(trail.to_string().into_response())
    }

    #[test]
    fn test_empty_queue_runs_terminal() {
        let list: Vec<SharedMiddleware> = Vec::new();
        let mut queue = MiddlewareQueue::new(&list, |_req| Ok("done".into_response()));
        let response = queue.handle(Request::new(Method::GET, "/")).unwrap();
        assert_eq!(response.body(), &Bytes::from("done"));
    }

    #[test]
    fn test_middleware_runs_in_registration_order() {
        let list = vec![tagging("A"), tagging("B")];
        let mut queue = MiddlewareQueue::new(&list, echo_trail);
        let response = queue.handle(Request::new(Method::GET, "/")).unwrap();
        assert_eq!(response.body(), &Bytes::from(r#"["A","B"]"#));
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn test_short_circuit_skips_rest_of_chain() {
        let reached = Arc::new(AtomicUsize::new(0));
        let reached_in_terminal = Arc::clone(&reached);
        let list = vec![
            from_fn(|_req: Request, _next: &mut MiddlewareQueue<'_>| {
                Ok((StatusCode::FORBIDDEN, "stop").into_response())
            })
            .into_shared(),
            tagging("never"),
        ];
        let mut queue = MiddlewareQueue::new(&list, move |_req| {
            reached_in_terminal.fetch_add(1, Ordering::SeqCst);
            Ok("handler".into_response())
        });

        let response = queue.handle(Request::new(Method::GET, "/")).unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(reached.load(Ordering::SeqCst), 0);
        assert_eq!(queue.remaining(), 1);
    }

    #[test]
    fn test_outer_middleware_sees_inner_effects() {
        let list = vec![
            from_fn(|req: Request, next: &mut MiddlewareQueue<'_>| {
                let mut response = next.handle(req)?;
                let body = format!("{}+outer", String::from_utf8_lossy(response.body()));
                response
                    .headers_mut()
                    .insert("x-outer", HeaderValue::from_static("1"));
                *response.body_mut() = Bytes::from(body);
                Ok(response)
            })
            .into_shared(),
            tagging("B"),
        ];
        let mut queue = MiddlewareQueue::new(&list, echo_trail);
        let response = queue.handle(Request::new(Method::GET, "/")).unwrap();

        assert_eq!(response.body(), &Bytes::from(r#"["B"]+outer"#));
        assert_eq!(response.headers()["x-outer"], "1");
    }

    #[test]
    fn test_terminal_runs_at_most_once() {
        let list = vec![from_fn(|req: Request, next: &mut MiddlewareQueue<'_>| {
            next.handle(req.clone())?;
            next.handle(req)
        })
        .into_shared()];
        let mut queue = MiddlewareQueue::new(&list, |_req| Ok("once".into_response()));

        let err = queue.handle(Request::new(Method::GET, "/")).unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_errors_propagate() {
        let list = vec![tagging("A")];
        let mut queue = MiddlewareQueue::new(&list, |_req| Err(ApiError::internal("boom")));
        let err = queue.handle(Request::new(Method::GET, "/")).unwrap_err();
        assert_eq!(err.message, "boom");
    }
}
