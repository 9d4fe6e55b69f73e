//! Hyper-based transport with a tower middleware stack.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tower::util::BoxCloneService;
use tower::{Layer, ServiceExt};
use tower_service::Service;
use tracing::trace;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::connector::https_connector;
use crate::middleware::LoggingLayer;
use crate::{Error, HttpClient, Request, Response, Result};

/// The transport once every layer is applied, with its type erased.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

type Exchange = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

type Wrap = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// One middleware stack shared by every clone of a [`HyperClient`].
///
/// Each exchange works on its own clone of the stack, taken under the lock
/// and released before anything is awaited. The clone is driven to
/// readiness before it is called.
#[derive(Clone)]
struct SharedStack(Arc<Mutex<BoxedService>>);

impl SharedStack {
    fn new(service: BoxedService) -> Self {
        Self(Arc::new(Mutex::new(service)))
    }

    fn dispatch(&self, request: Request<Bytes>) -> Exchange {
        let mut service = self
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.ready().await?.call(request).await })
    }
}

/// Innermost service: a pooled hyper client and the exchange timeout.
#[derive(Clone)]
struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl HyperTransport {
    fn new(config: &ClientConfig) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(config));

        Self {
            client,
            timeout: config.timeout,
        }
    }

    fn to_hyper(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();
        let uri: http::Uri = url
            .as_str()
            .parse()
            .map_err(|err| Error::invalid_request(format!("`{url}`: {err}")))?;

        let mut outgoing = http::Request::new(body.map_or_else(Full::default, Full::new));
        *outgoing.method_mut() = method.into();
        *outgoing.uri_mut() = uri;
        *outgoing.headers_mut() = headers;
        Ok(outgoing)
    }

    /// Connect, send and buffer the whole body, all within `timeout`.
    async fn exchange(self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let outgoing = Self::to_hyper(request)?;

        let round_trip = async {
            let (parts, body) = self
                .client
                .request(outgoing)
                .await
                .map_err(classify)?
                .into_parts();
            let body = body
                .collect()
                .await
                .map_err(|err| Error::connection(err.to_string()))?
                .to_bytes();
            trace!(status = parts.status.as_u16(), bytes = body.len(), "body buffered");

            Ok::<_, Error>(Response::new(parts.status.as_u16(), parts.headers, body))
        };

        tokio::time::timeout(self.timeout, round_trip)
            .await
            .map_err(|_| Error::Timeout)?
    }
}

/// Sort a hyper failure into a TLS or a connection error. The debug form is
/// used because the display form drops the connector's cause.
#[allow(clippy::needless_pass_by_value)]
fn classify(err: hyper_util::client::legacy::Error) -> Error {
    let message = format!("{err:?}");
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("tls") || lowered.contains("certificate") {
        Error::tls(message)
    } else {
        Error::connection(message)
    }
}

impl Service<Request<Bytes>> for HyperTransport {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Exchange;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        Box::pin(self.clone().exchange(request))
    }
}

/// Default [`HttpClient`]: hyper with rustls, connection pooling and an
/// optional tower middleware stack.
///
/// Clones share the pool and the stack.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use jsonapi_consumer::HyperClient;
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    stack: SharedStack,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Default configuration, no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Given configuration, no middleware.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self::builder().config(&config).build()
    }

    /// Start configuring a client.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.stack.dispatch(request).await
    }
}

/// Configures a [`HyperClient`] and its middleware.
///
/// # Example
///
/// ```ignore
/// use jsonapi_consumer::HyperClient;
/// use jsonapi_consumer::middleware::{ConcurrencyLimitLayer, LoggingLayer};
///
/// let client = HyperClient::builder()
///     .pool_idle_per_host(8)
///     .layer(ConcurrencyLimitLayer::new(4))
///     .layer(LoggingLayer::debug())
///     .build();
/// ```
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    wraps: Vec<Wrap>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers", &self.wraps.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Deadline for one whole exchange, body included.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Deadline for establishing a connection.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Idle connections kept per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// How long an idle connection is kept.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Start from an existing configuration.
    #[must_use]
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.config = ClientConfigBuilder::from(config);
        self
    }

    /// Wrap the transport in a tower layer.
    ///
    /// The first layer added sits closest to the transport; the last one
    /// sees each request first.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.wraps
            .push(Arc::new(move |inner| BoxCloneService::new(layer.layer(inner))));
        self
    }

    /// Log each exchange at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log each exchange at debug level, headers included.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Assemble the transport and apply the layers.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let transport = BoxCloneService::new(HyperTransport::new(&config));
        let service = self.wraps.iter().fold(transport, |inner, wrap| wrap(inner));

        HyperClient {
            stack: SharedStack::new(service),
            config,
        }
    }
}
