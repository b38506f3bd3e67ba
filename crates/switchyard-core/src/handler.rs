//! Handler trait and utilities
//!
//! A route handler is any closure or function taking a [`Request`] (and
//! optionally the attempt's [`Output`] buffer) and returning something that
//! implements [`IntoReply`].
//!
//! ```rust,ignore
//! use switchyard_core::{Output, Request, Router};
//! use http::Method;
//! use std::fmt::Write;
//!
//! let mut router = Router::new();
//! router.get("/hello", |_req: Request| "Hello, World!")?;
//! router.get("/blog/{slug}", |req: Request, out: &mut Output| {
//!     write!(out, "<h1>{}</h1>", req.param("slug").unwrap_or_default())
//! })?;
//! ```

use crate::error::{ApiError, Result};
use crate::output::Output;
use crate::request::Request;
use crate::response::{build, Html, IntoResponse, Json, NoContent, Redirect, Response, TEXT_PLAIN};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use std::sync::Arc;

/// What a handler hands back to the dispatcher.
#[derive(Debug)]
pub enum Reply {
    /// A finished response, used verbatim.
    Response(Response),
    /// A bare text body; the status is the caller's default.
    Body(Bytes),
    /// No structured response; whatever was written to the output buffer
    /// becomes the body.
    Written,
}

impl Reply {
    /// Resolve the reply into a response. `status` applies to bare bodies
    /// and to written output.
    pub fn into_response(self, out: Output, status: StatusCode) -> Response {
        match self {
            Reply::Response(response) => response,
            Reply::Body(body) => build(status, Some(TEXT_PLAIN), body),
            Reply::Written => out.into_response(status),
        }
    }
}

/// Conversion from handler return values into a [`Reply`].
///
/// Errors are kept as errors: a handler returning `Err` makes `dispatch`
/// fail instead of producing a response.
pub trait IntoReply {
    /// Convert self into a reply
    fn into_reply(self) -> Result<Reply>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply> {
        Ok(self)
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Reply> {
        Ok(Reply::Written)
    }
}

// Also covers the `fmt::Result` that `write!(out, ...)` returns.
impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<ApiError>,
{
    fn into_reply(self) -> Result<Reply> {
        self.map_err(Into::into)?.into_reply()
    }
}

macro_rules! reply_via_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoReply for $ty {
                fn into_reply(self) -> Result<Reply> {
                    Ok(Reply::Response(self.into_response()))
                }
            }
        )*
    };
}

reply_via_response!(Response, StatusCode, NoContent, Redirect);

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply> {
        Ok(Reply::Body(Bytes::from(self)))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Reply> {
        Ok(Reply::Body(Bytes::from_static(self.as_bytes())))
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Reply> {
        Ok(Reply::Response(self.into_response()))
    }
}

impl<T: Into<String>> IntoReply for Html<T> {
    fn into_reply(self) -> Result<Reply> {
        Ok(Reply::Response(self.into_response()))
    }
}

impl<R: IntoResponse> IntoReply for (StatusCode, R) {
    fn into_reply(self) -> Result<Reply> {
        Ok(Reply::Response(self.into_response()))
    }
}

impl<R: IntoResponse> IntoReply for (StatusCode, HeaderMap, R) {
    fn into_reply(self) -> Result<Reply> {
        Ok(Reply::Response(self.into_response()))
    }
}

/// Trait representing a route handler
///
/// `T` only disambiguates the supported closure shapes.
pub trait Handler<T>: Send + Sync + 'static {
    /// Call the handler with the request and the attempt's output buffer
    fn call(&self, req: Request, out: &mut Output) -> Result<Reply>;
}

// Fn(Request) -> R
impl<F, R> Handler<(Request,)> for F
where
    F: Fn(Request) -> R + Send + Sync + 'static,
    R: IntoReply,
{
    fn call(&self, req: Request, _out: &mut Output) -> Result<Reply> {
        self(req).into_reply()
    }
}

// Fn(Request, &mut Output) -> R
impl<F, R> Handler<(Request, Output)> for F
where
    F: Fn(Request, &mut Output) -> R + Send + Sync + 'static,
    R: IntoReply,
{
    fn call(&self, req: Request, out: &mut Output) -> Result<Reply> {
        self(req, out).into_reply()
    }
}

// Type-erased handler for storage in the registry
pub(crate) type BoxedHandler = Arc<dyn Fn(Request, &mut Output) -> Result<Reply> + Send + Sync>;

/// Create a boxed handler from any Handler
pub(crate) fn into_boxed_handler<H, T>(handler: H) -> BoxedHandler
where
    H: Handler<T>,
    T: 'static,
{
    Arc::new(move |req, out| handler.call(req, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use std::fmt::Write as _;

    fn run<H: Handler<T>, T: 'static>(handler: H) -> Result<Response> {
        let boxed = into_boxed_handler(handler);
        let mut out = Output::new();
        let reply = boxed(Request::new(Method::GET, "/"), &mut out)?;
        Ok(reply.into_response(out, StatusCode::OK))
    }

    #[test]
    fn test_structured_return_is_used_verbatim() {
        let response = run(|_req: Request| (StatusCode::CREATED, "made")).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body(), &Bytes::from("made"));
    }

    #[test]
    fn test_bare_text_takes_default_status() {
        let mut out = Output::new();
        let reply = "missing".into_reply().unwrap();
        let response = reply.into_response(Output::new(), StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), &Bytes::from("missing"));
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            TEXT_PLAIN
        );

        out.push_str("ignored");
        let response = String::from("text").into_reply().unwrap().into_response(out, StatusCode::OK);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), &Bytes::from("text"));
    }

    #[test]
    fn test_written_output_becomes_body() {
        let response = run(|_req: Request, out: &mut Output| write!(out, "<p>{}</p>", 1)).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), &Bytes::from("<p>1</p>"));
    }

    #[test]
    fn test_unit_return_uses_output() {
        let response = run(|_req: Request, out: &mut Output| out.push_str("done")).unwrap();
        assert_eq!(response.body(), &Bytes::from("done"));
    }

    #[test]
    fn test_error_propagates() {
        let err = run(|_req: Request| -> Result<&'static str> { Err(ApiError::internal("db down")) })
            .unwrap_err();
        assert_eq!(err.message, "db down");
    }
}
