//! Output buffer handed to handlers
//!
//! Handlers, controller actions, views and not-found callbacks may write their
//! body piecewise instead of returning a finished response. Each resolution
//! attempt gets its own buffer, so nothing written by an attempt that did not
//! handle the request can leak into the final body.

use crate::response::{build, Response, TEXT_HTML};
use bytes::{BufMut, Bytes, BytesMut};
use http::StatusCode;
use std::fmt;
use std::io;

/// Growable body buffer
#[derive(Debug, Default)]
pub struct Output {
    buf: BytesMut,
}

impl Output {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string
    pub fn push_str(&mut self, s: &str) {
        self.buf.put_slice(s.as_bytes());
    }

    /// Append raw bytes
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Check whether anything has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Freeze the buffer into a body
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Turn the written output into an HTML response with `status`
    pub fn into_response(self, status: StatusCode) -> Response {
        build(status, Some(TEXT_HTML), self.into_bytes())
    }
}

impl fmt::Write for Output {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.push_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    #[test]
    fn test_writes_accumulate_in_order() {
        let mut out = Output::new();
        out.push_str("<h1>");
        write!(out, "{}", 42).unwrap();
        io::Write::write_all(&mut out, b"</h1>").unwrap();

        assert_eq!(out.as_bytes(), b"<h1>42</h1>");
    }

    #[test]
    fn test_into_response_uses_status_and_html() {
        let mut out = Output::new();
        out.push_str("gone");
        let response = out.into_response(StatusCode::NOT_FOUND);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], TEXT_HTML);
        assert_eq!(response.body(), &Bytes::from("gone"));
    }
}
