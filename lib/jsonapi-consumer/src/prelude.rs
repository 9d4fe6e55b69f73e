//! Prelude module for convenient imports.
//!
//! ```ignore
//! use jsonapi_consumer::prelude::*;
//! ```

pub use crate::{
    ClientConfig, Codec, CollectionDocument, Document, Envelope, Error, ErrorObject, HttpClient,
    HyperClient, JsonApiClient, Relationship, RequestOptions, Resource, ResourceIdentifier,
    ResourceObject, Result, SingleDocument,
};
pub use serde::{Deserialize, Serialize};
