//! JSON:API document model.
//!
//! The shapes follow the JSON:API 1.1 top-level structure: a [`Document`]
//! wraps primary `data` (a single [`ResourceObject`] or a collection of
//! them), plus optional `included`, `meta`, `links` and `jsonapi` members.
//! Failures are described by [`ErrorObject`].
//!
//! Caller models only carry attributes. The `type`/`id`/`relationships`
//! envelope around them is [`ResourceObject`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A resource model that can be sent to and read from a JSON:API service.
///
/// Implementors are the `attributes` of a resource object. `Default` is
/// required: lenient decoding leaves a malformed attribute at its default.
///
/// # Example
///
/// ```
/// use jsonapi_consumer_core::Resource;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct Article {
///     title: String,
///     words: u32,
/// }
///
/// impl Resource for Article {
///     const TYPE: &'static str = "articles";
/// }
/// ```
pub trait Resource: Serialize + DeserializeOwned + Default + Send + Sync {
    /// The JSON:API `type` member of this resource.
    const TYPE: &'static str;
}

/// Document carrying a single resource as primary data.
pub type SingleDocument<A> = Document<ResourceObject<A>>;

/// Document carrying a collection of resources as primary data.
pub type CollectionDocument<A> = Document<Vec<ResourceObject<A>>>;

/// A JSON:API top-level document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<D> {
    /// Primary data. `None` when the member is absent or `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
    /// Compound document resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject<Value>>,
    /// Non-standard meta-information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    /// Top-level links, e.g. pagination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Server implementation information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<JsonApiInfo>,
}

impl<D> Default for Document<D> {
    fn default() -> Self {
        Self {
            data: None,
            included: Vec::new(),
            meta: None,
            links: None,
            jsonapi: None,
        }
    }
}

impl<D> Document<D> {
    /// A document holding only primary data.
    #[must_use]
    pub fn new(data: D) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    /// Included resources of the given type.
    pub fn included_of<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a ResourceObject<Value>> + 'a {
        self.included.iter().filter(move |resource| resource.kind == kind)
    }

    /// Look up an included resource by identifier.
    #[must_use]
    pub fn find_included(&self, identifier: &ResourceIdentifier) -> Option<&ResourceObject<Value>> {
        self.included.iter().find(|resource| {
            resource.kind == identifier.kind && resource.id.as_deref() == Some(&identifier.id)
        })
    }
}

/// A JSON:API resource object wrapping the caller's attributes `A`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject<A> {
    /// The resource `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Server-assigned identifier. Absent on resources not yet created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Client-local identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lid: Option<String>,
    /// Resource attributes.
    #[serde(default)]
    pub attributes: A,
    /// Relationships by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
    /// Resource-level links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Resource-level meta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl<A: Resource> ResourceObject<A> {
    /// A new resource of type [`Resource::TYPE`] without an id.
    #[must_use]
    pub fn new(attributes: A) -> Self {
        Self {
            kind: A::TYPE.to_string(),
            id: None,
            lid: None,
            attributes,
            relationships: BTreeMap::new(),
            links: None,
            meta: None,
        }
    }
}

impl<A> ResourceObject<A> {
    /// Set the resource id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add or replace a relationship.
    #[must_use]
    pub fn with_relationship(
        mut self,
        name: impl Into<String>,
        relationship: Relationship,
    ) -> Self {
        self.relationships.insert(name.into(), relationship);
        self
    }

    /// Identifier (`type` + `id`) of this resource, once it has an id.
    #[must_use]
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .as_ref()
            .map(|id| ResourceIdentifier::new(self.kind.clone(), id.clone()))
    }
}

/// A resource identifier object (`type` + `id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    /// The resource `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The resource `id`.
    pub id: String,
}

impl ResourceIdentifier {
    /// Create an identifier.
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

/// A relationship object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Resource linkage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RelationshipData>,
    /// Relationship links (`self`, `related`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Relationship meta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Relationship {
    /// A to-one relationship.
    #[must_use]
    pub fn to_one(identifier: ResourceIdentifier) -> Self {
        Self {
            data: Some(RelationshipData::One(identifier)),
            ..Self::default()
        }
    }

    /// A to-many relationship.
    #[must_use]
    pub fn to_many(identifiers: impl IntoIterator<Item = ResourceIdentifier>) -> Self {
        Self {
            data: Some(RelationshipData::Many(identifiers.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Linked identifiers, whatever the cardinality.
    #[must_use]
    pub fn identifiers(&self) -> &[ResourceIdentifier] {
        match &self.data {
            Some(RelationshipData::One(identifier)) => std::slice::from_ref(identifier),
            Some(RelationshipData::Many(identifiers)) => identifiers,
            None => &[],
        }
    }
}

/// Resource linkage of a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    /// To-one linkage.
    One(ResourceIdentifier),
    /// To-many linkage.
    Many(Vec<ResourceIdentifier>),
}

/// A links object. `null` links (e.g. `next` on the last page) are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(pub BTreeMap<String, Option<Link>>);

impl Links {
    /// The href of the named link, if present and not `null`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Option::as_ref).map(Link::href)
    }
}

/// A single link: a bare URI or a link object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Link {
    /// `"self": "https://..."`.
    Href(String),
    /// `"self": { "href": "https://...", "meta": {...} }`.
    Object {
        /// Target URI.
        href: String,
        /// Link meta.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<Value>,
    },
}

impl Link {
    /// Target URI of the link.
    #[must_use]
    pub fn href(&self) -> &str {
        match self {
            Self::Href(href) | Self::Object { href, .. } => href,
        }
    }
}

/// The `jsonapi` top-level member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonApiInfo {
    /// Highest JSON:API version supported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Server meta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// A JSON:API error object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorObject {
    /// Unique identifier of this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// HTTP status code, as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Application-specific error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short summary of the problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// What in the request caused the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    /// Error links (`about`, `type`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Error meta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// The `source` member of an [`ErrorObject`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorSource {
    /// JSON pointer into the request document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// Offending query parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Offending request header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}
