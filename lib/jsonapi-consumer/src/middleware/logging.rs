//! Exchange logging middleware.
//!
//! Emits one `tracing` event when a request leaves and one when its response
//! (or failure) comes back, inside an `http_request` span.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, Request, Response, Result};

/// Layer that adds request/response logging.
///
/// # Example
///
/// ```ignore
/// use jsonapi_consumer::HyperClient;
/// use jsonapi_consumer::middleware::LoggingLayer;
///
/// let client = HyperClient::builder().layer(LoggingLayer::debug()).build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Verbosity of [`LoggingLayer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Headers, content type and body sizes at debug level.
    Debug,
    /// Method, URL, status and elapsed time at info level.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Info-level logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug-level logging.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Configured verbosity.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs requests and responses.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Logging<S> {
    /// Wrap a service with info-level logging.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            level: LogLevel::Info,
        }
    }
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let method = request.method();
        let url = request.url().to_string();
        let level = self.level;

        let span = span!(Level::INFO, "http_request", %method, %url);

        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let start = Instant::now();

                match level {
                    LogLevel::Debug => debug!(
                        headers = ?request.headers(),
                        body_bytes = request.body().map_or(0, Bytes::len),
                        "sending request"
                    ),
                    LogLevel::Info => info!("sending request"),
                }

                let result = inner.call(request).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) if response.is_success() => match level {
                        LogLevel::Debug => debug!(
                            status = response.status(),
                            content_type = response.header("content-type"),
                            body_bytes = response.body().len(),
                            elapsed_ms,
                            "request completed"
                        ),
                        LogLevel::Info => info!(
                            status = response.status(),
                            elapsed_ms,
                            "request completed"
                        ),
                    },
                    Ok(response) => {
                        warn!(
                            status = response.status(),
                            elapsed_ms,
                            "request failed with HTTP error"
                        );
                    }
                    Err(err) => {
                        warn!(error = %err, elapsed_ms, "request failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
