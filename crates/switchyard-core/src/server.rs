//! HTTP server adapter
//!
//! Accepts HTTP/1 connections with hyper, collects each body, parses it into a
//! [`Request`] and runs the synchronous `Router::dispatch` on tokio's blocking
//! pool. Dispatch faults are logged and answered with their error response.

use crate::error::ApiError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Default maximum request body size (1MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Serve `router` on `addr` until the process exits
///
/// # Errors
///
/// Fails if the address does not parse or cannot be bound, or if accepting a
/// connection fails.
pub async fn serve(router: Router, addr: &str) -> Result<(), BoxError> {
    let addr: SocketAddr = addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    Server::new(router).run(listener, std::future::pending()).await
}

/// HTTP server around a configured [`Router`]
pub struct Server {
    router: Arc<Router>,
    body_limit: usize,
}

impl Server {
    /// Create a server for `router`
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Set the maximum accepted body size
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Accept connections on `listener` until `shutdown` completes
    ///
    /// # Errors
    ///
    /// Fails if accepting a connection fails.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), BoxError>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = listener.local_addr() {
            info!("Switchyard listening on http://{}", addr);
        }
        tokio::pin!(shutdown);

        loop {
            let (stream, _remote_addr) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("Shutting down");
                    return Ok(());
                }
            };
            let io = TokioIo::new(stream);
            let router = Arc::clone(&self.router);
            let body_limit = self.body_limit;

            tokio::spawn(async move {
                let service = service_fn(move |req: hyper::Request<Incoming>| {
                    let router = Arc::clone(&router);
                    async move {
                        let response = handle_request(router, req, body_limit).await;
                        Ok::<_, Infallible>(response.map(Full::new))
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Connection error: {}", err);
                }
            });
        }
    }
}

/// 413 when the body exceeded the limit, 400 for any other read failure
fn body_error_response(err: BoxError) -> Response {
    let error = if err.downcast_ref::<LengthLimitError>().is_some() {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", "Request body too large")
    } else {
        ApiError::new(StatusCode::BAD_REQUEST, "bad_request", "Request body could not be read")
    };
    error.with_internal(err.to_string()).into_response()
}

/// Handle a single HTTP request
async fn handle_request(router: Arc<Router>, req: hyper::Request<Incoming>, body_limit: usize) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let (parts, body) = req.into_parts();
    let bytes = match Limited::new(body, body_limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            let response = body_error_response(err);
            log_request(&method, &path, response.status(), start);
            return response;
        }
    };

    let response = match dispatch_blocking(router, parts, bytes).await {
        Ok(response) => response,
        Err(err) => {
            error!(method = %method, path = %path, error = %err, details = ?err.internal_details(), "Dispatch failed");
            err.into_response()
        }
    };

    log_request(&method, &path, response.status(), start);
    response
}

async fn dispatch_blocking(router: Arc<Router>, parts: http::request::Parts, body: Bytes) -> Result<Response, ApiError> {
    let request = Request::from_parts(parts, body)?;
    tokio::task::spawn_blocking(move || router.dispatch(request))
        .await
        .map_err(|err| ApiError::internal("Handler panicked").with_internal(err.to_string()))?
}

/// Log request completion
fn log_request(method: &http::Method, path: &str, status: StatusCode, start: Instant) {
    let elapsed = start.elapsed();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Output;
    use std::fmt::Write as _;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn roundtrip(router: Router, raw: &str) -> String {
        roundtrip_with(Server::new(router), raw).await
    }

    async fn roundtrip_with(server: Server, raw: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(server.run(listener, async {
            let _ = stopped.await;
        }));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        let _ = stop.send(());
        server.await.unwrap().unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_routes() {
        let mut router = Router::new();
        router
            .get("/blog/{slug}", |req: Request, out: &mut Output| {
                write!(out, "slug={}", req.param("slug").unwrap_or_default())
            })
            .unwrap();

        let response = roundtrip(
            router,
            "GET /blog/hello HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("slug=hello"));
    }

    #[tokio::test]
    async fn test_form_body_reaches_handler() {
        let mut router = Router::new();
        router
            .post("/contact", |req: Request| req.body_field("name").unwrap_or("?").to_string())
            .unwrap();

        let body = "name=Ann";
        let raw = format!(
            "POST /contact HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let response = roundtrip(router, &raw).await;
        assert!(response.ends_with("Ann"));
    }

    #[tokio::test]
    async fn test_dispatch_fault_becomes_500() {
        let mut router = Router::new();
        router
            .get("/boom", |_req: Request| -> crate::Result<&'static str> { Err(ApiError::internal("boom")) })
            .unwrap();

        let response = roundtrip(
            router,
            "GET /boom HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 500"));
    }

    #[tokio::test]
    async fn test_unmatched_is_404() {
        let response = roundtrip(
            Router::new(),
            "GET /nothing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404"));
        assert!(response.ends_with("404 Not Found"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let mut router = Router::new();
        router.post("/upload", |_req: Request| "stored").unwrap();

        let body = "x".repeat(64);
        let raw = format!(
            "POST /upload HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let response = roundtrip_with(Server::new(router).body_limit(16), &raw).await;
        assert!(response.starts_with("HTTP/1.1 413"));
        assert!(response.contains("payload_too_large"));
    }

    #[tokio::test]
    async fn test_body_errors_are_classified() {
        let over = Limited::new(Full::new(Bytes::from_static(b"too long")), 3)
            .collect()
            .await
            .unwrap_err();
        assert_eq!(body_error_response(over).status(), StatusCode::PAYLOAD_TOO_LARGE);

        let broken: BoxError = Box::new(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated chunk"));
        let response = body_error_response(broken);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(response.body()).contains("bad_request"));
    }
}
