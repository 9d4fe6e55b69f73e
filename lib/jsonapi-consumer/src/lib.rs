//! Typed async client for JSON:API services.
//!
//! [`JsonApiClient`] issues the standard resource operations (list, get,
//! create, upload, update, partial update, delete) against a base URL and
//! returns every outcome as an [`Envelope`]: either a decoded [`Document`] or
//! the server's [`ErrorObject`], together with the HTTP status.
//!
//! # Example
//!
//! ```ignore
//! use jsonapi_consumer::prelude::*;
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Article {
//!     title: String,
//! }
//!
//! impl Resource for Article {
//!     const TYPE: &'static str = "articles";
//! }
//!
//! let client = jsonapi_consumer::connect("https://api.example.com")?;
//!
//! let envelope = client
//!     .get_by_id::<Article>("articles", "1", &RequestOptions::new().include(["author"]))
//!     .await?;
//! match envelope.into_result() {
//!     Ok(document) => println!("{:?}", document.data),
//!     Err(error) => eprintln!("{:?}: {:?}", error.status, error.title),
//! }
//! ```
//!
//! The transport is pluggable: any [`HttpClient`] works, [`HyperClient`] is
//! the default one.

mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;

// Re-export transport types
pub use client::{BoxedService, HyperClient, HyperClientBuilder};
pub use config::{ClientConfig, ClientConfigBuilder};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use jsonapi_consumer_core::{
    Codec, CollectionDocument, Document, Envelope, Error, ErrorObject, ErrorSource, Form,
    HttpClient, JsonApiClient, JsonApiInfo, Link, Links, MEDIA_TYPE, Method, Part, PrimaryData,
    Relationship, RelationshipData, Request, RequestBuilder, RequestOptions, Resource,
    ResourceIdentifier, ResourceObject, Response, Result, SingleDocument, compose, from_json,
    to_json, to_query_pairs,
};

// Re-export http types for status codes and headers
pub use jsonapi_consumer_core::{StatusCode, header};

pub use url;

/// A [`JsonApiClient`] over a default [`HyperClient`].
///
/// # Errors
///
/// Returns an error if the base URL cannot be parsed.
pub fn connect(base_url: impl AsRef<str>) -> Result<JsonApiClient<HyperClient>> {
    JsonApiClient::new(HyperClient::new(), base_url)
}
