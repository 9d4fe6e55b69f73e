//! Prelude module for convenient imports.
//!
//! ```ignore
//! use jsonapi_consumer_core::prelude::*;
//! ```

pub use crate::{
    Codec, CollectionDocument, Document, Envelope, Error, ErrorObject, HttpClient, JsonApiClient,
    Relationship, RequestOptions, Resource, ResourceIdentifier, ResourceObject, Result,
    SingleDocument,
};
