//! Core types, codec and resource client for consuming JSON:API services.
//!
//! This crate is transport agnostic:
//! - [`Method`], [`Request`], [`RequestBuilder`] and [`Response`] - HTTP exchange types
//! - [`HttpClient`] - the trait a transport implements
//! - [`Document`], [`ResourceObject`], [`ErrorObject`] - the JSON:API document model
//! - [`Codec`] - encoding and (lenient) decoding of documents
//! - [`Envelope`] - the uniform result of every operation
//! - [`RequestOptions`] and [`compose`] - URI, query and header composition
//! - [`JsonApiClient`] - the typed resource client
//! - [`Error`] and [`Result`] - error handling
//!
//! The `jsonapi-consumer` crate adds a hyper-based [`HttpClient`].

mod api_client;
mod body;
mod client;
mod codec;
mod document;
mod envelope;
mod error;
mod method;
mod multipart;
mod options;
pub mod prelude;
mod request;
mod response;
mod uri;

pub use api_client::JsonApiClient;
pub use body::{MEDIA_TYPE, from_json, to_json, to_query_pairs};
pub use client::HttpClient;
pub use codec::{Codec, PrimaryData};
pub use document::{
    CollectionDocument, Document, ErrorObject, ErrorSource, JsonApiInfo, Link, Links,
    Relationship, RelationshipData, Resource, ResourceIdentifier, ResourceObject, SingleDocument,
};
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use method::Method;
pub use multipart::{Form, Part};
pub use options::RequestOptions;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use uri::compose;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
