//! Terminal 404 handling

use crate::error::Result;
use crate::output::Output;
use crate::registry::RouteRegistry;
use crate::response::{build, Response, TEXT_PLAIN};
use bytes::Bytes;
use http::StatusCode;

/// Body of the default 404 response
pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// Produces the response when nothing else handled the request
///
/// A custom callback registered on the [`RouteRegistry`] wins: a structured
/// response it returns is used as is, otherwise whatever it wrote becomes the
/// body of a 404.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundHandler;

impl NotFoundHandler {
    /// Build the not-found response for `registry`
    ///
    /// # Errors
    ///
    /// Propagates errors raised by a custom callback.
    pub fn handle(&self, registry: &RouteRegistry) -> Result<Response> {
        let Some(callback) = registry.not_found() else {
            return Ok(build(
                StatusCode::NOT_FOUND,
                Some(TEXT_PLAIN),
                Bytes::from_static(NOT_FOUND_BODY.as_bytes()),
            ));
        };

        let mut out = Output::new();
        let reply = callback(&mut out)?;
        Ok(reply.into_response(out, StatusCode::NOT_FOUND))
    }
}
