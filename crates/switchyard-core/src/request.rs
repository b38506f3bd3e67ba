//! Request types for Switchyard
//!
//! A [`Request`] is a value: middleware and the dispatcher never mutate one in
//! place, they return a new request with an extra attribute. Handlers further
//! down the chain therefore always see a consistent snapshot.

use crate::attributes::Attributes;
use crate::error::Result;
use bytes::Bytes;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{request::Parts, HeaderMap, HeaderValue, Method};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Path used when the request targets the site root.
pub const HOME_PATH: &str = "home";

/// HTTP Request wrapper
///
/// Holds the upper-cased method, the normalized path, headers, the ordered
/// attribute table and an optional parsed body.
#[derive(Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    attributes: Attributes,
    body: Option<Arc<Value>>,
}

impl Request {
    /// Create a request for `method` and `target`.
    ///
    /// `target` may carry a query string; the path part is normalized with
    /// [`normalize_path`].
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };
        Self {
            method: normalize_method(method),
            path: normalize_path(path),
            query,
            headers: HeaderMap::new(),
            attributes: Attributes::new(),
            body: None,
        }
    }

    /// Build a request from `http` parts and the collected body bytes.
    ///
    /// JSON and URL-encoded form bodies are parsed; any other content type
    /// leaves the parsed body empty.
    pub fn from_parts(parts: Parts, body: Bytes) -> Result<Self> {
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let mut request = Self::new(parts.method, target);
        let parsed = parse_body(&parts.headers, &body)?;
        request.headers = parts.headers;
        request.body = parsed.map(Arc::new);
        Ok(request)
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the normalized request path (no leading or trailing `/`)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path segments split on `/`
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/')
    }

    /// Get the query string
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Get the headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all attributes
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Get a single attribute
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Get a string attribute, typically a route parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.attributes.get_str(name)
    }

    /// Get the parsed body
    pub fn body(&self) -> Option<&Value> {
        self.body.as_deref()
    }

    /// Get a top-level string field of the parsed body
    pub fn body_field(&self, name: &str) -> Option<&str> {
        self.body().and_then(|body| body.get(name)).and_then(Value::as_str)
    }

    /// Return a new request carrying `name = value`
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Return a new request with the given parsed body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(Arc::new(body));
        self
    }

    /// Return a new request with an extra header
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Trim leading and trailing `/`; an empty path becomes [`HOME_PATH`].
///
/// Normalization is idempotent.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        HOME_PATH.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Upper-case a method. Standard methods are already canonical.
pub fn normalize_method(method: Method) -> Method {
    let name = method.as_str();
    if !name.bytes().any(|b| b.is_ascii_lowercase()) {
        return method;
    }
    Method::from_bytes(name.to_ascii_uppercase().as_bytes()).unwrap_or(method)
}

fn parse_body(headers: &HeaderMap, body: &Bytes) -> Result<Option<Value>> {
    if body.is_empty() {
        return Ok(None);
    }
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        return Ok(Some(serde_json::from_slice(body)?));
    }
    if content_type.starts_with("application/x-www-form-urlencoded") {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        let map: Map<String, Value> = pairs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        return Ok(Some(Value::Object(map)));
    }
    Ok(None)
}
