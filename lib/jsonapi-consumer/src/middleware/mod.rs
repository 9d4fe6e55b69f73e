//! Tower middleware for the hyper transport.
//!
//! Layers wrap the type-erased transport service and are composed with
//! [`crate::HyperClientBuilder::layer`]. Each call of a
//! [`crate::JsonApiClient`] operation goes through the whole stack once.
//!
//! # Example
//!
//! ```ignore
//! use jsonapi_consumer::HyperClient;
//! use jsonapi_consumer::middleware::{ConcurrencyLimitLayer, LoggingLayer};
//!
//! let client = HyperClient::builder()
//!     .layer(ConcurrencyLimitLayer::new(8))
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

pub use tower::{Layer, ServiceBuilder};

pub use tower::limit::ConcurrencyLimitLayer;
