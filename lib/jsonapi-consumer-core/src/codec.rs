//! JSON:API (de)serialization.
//!
//! [`Codec`] turns resource models into request documents and transport
//! responses into [`Envelope`]s. It is a small `Copy` value with no interior
//! state, so one instance can be shared by any number of concurrent calls.
//!
//! # Field leniency
//!
//! With leniency on (the default), a member that fails to deserialize into
//! its model field is reset to the value `Default` gives that field, and
//! decoding resumes. Members missing from the payload are filled the same
//! way. The same applies to the members of a resource around its
//! attributes: a malformed relationship entry is dropped, and malformed
//! `id`, `lid`, `links` or `meta` members become `None`. A single bad member
//! therefore never fails a whole collection.
//!
//! Anything above member level (invalid JSON, a non-object document,
//! collection data that is not an array, a resource that is not an object or
//! has no string `type`) is still an error.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::{Document, ErrorObject, Relationship, Resource, ResourceObject};
use crate::{Envelope, Error, Response, Result, from_json, to_json};

/// Top-level members of which a document must contain at least one.
const TOP_LEVEL_MEMBERS: [&str; 3] = ["data", "errors", "meta"];

/// Primary data shapes a [`Document`] can be decoded into.
pub trait PrimaryData: Sized {
    /// Decode a non-null `data` member.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not have the expected shape.
    fn decode(value: Value, codec: &Codec) -> Result<Self>;
}

impl<A: Resource> PrimaryData for ResourceObject<A> {
    fn decode(value: Value, codec: &Codec) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::invalid_document(
                "expected a single resource object as primary data",
            ));
        }
        codec.decode_resource(value, "data")
    }
}

impl<A: Resource> PrimaryData for Vec<ResourceObject<A>> {
    fn decode(value: Value, codec: &Codec) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(Error::invalid_document(
                "expected an array of resource objects as primary data",
            ));
        };
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| codec.decode_resource(item, &format!("data[{index}]")))
            .collect()
    }
}

/// JSON:API encoder and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    lenient: bool,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct Outgoing<'a, D> {
    data: &'a D,
}

impl Codec {
    /// A codec with field leniency enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self { lenient: true }
    }

    /// A codec that fails on the first malformed field.
    #[must_use]
    pub const fn strict() -> Self {
        Self { lenient: false }
    }

    /// Enable or disable field leniency.
    #[must_use]
    pub const fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Whether field leniency is enabled.
    #[must_use]
    pub const fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Encode a resource as a `{"data": ...}` request document.
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes cannot be serialized.
    pub fn encode<A: Serialize>(&self, resource: &ResourceObject<A>) -> Result<Bytes> {
        to_json(&Outgoing { data: resource })
    }

    /// Decode a response body as a JSON:API document.
    ///
    /// # Errors
    ///
    /// Returns an error on any document-level failure.
    pub fn decode_document<D: PrimaryData>(&self, body: &[u8]) -> Result<Document<D>> {
        let top_level: Value = from_json(body)?;
        let Value::Object(mut members) = top_level else {
            return Err(Error::invalid_document("top-level value is not an object"));
        };
        if !TOP_LEVEL_MEMBERS
            .iter()
            .any(|member| members.contains_key(*member))
        {
            return Err(Error::invalid_document(
                "a document must contain at least one of `data`, `errors` or `meta`",
            ));
        }

        let data = match members.remove("data") {
            None | Some(Value::Null) => None,
            Some(data) => Some(D::decode(data, self)?),
        };
        let included: Vec<ResourceObject<Value>> = match members.remove("included") {
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| self.decode_resource(item, &format!("included[{index}]")))
                .collect::<Result<_>>()?,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => self.recover(from_value(&other, "included"))?,
        };

        Ok(Document {
            data,
            included,
            meta: self.member(&mut members, "meta", "")?,
            links: self.member(&mut members, "links", "")?,
            jsonapi: self.member(&mut members, "jsonapi", "")?,
        })
    }

    /// Decode the first error of an error document.
    ///
    /// A bare error object (no `errors` wrapper) is accepted as well.
    /// Returns `None` when the body carries no recognisable error.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON or an error member is
    /// malformed beyond what leniency recovers.
    pub fn decode_error(&self, body: &[u8]) -> Result<Option<ErrorObject>> {
        let Value::Object(mut members) = from_json::<Value>(body)? else {
            return Ok(None);
        };

        match members.remove("errors") {
            Some(Value::Array(errors)) => errors
                .into_iter()
                .next()
                .map(|first| self.decode_members::<ErrorObject>(first, "errors[0]"))
                .transpose(),
            Some(_) => Err(Error::invalid_document("`errors` must be an array")),
            None if ["status", "code", "title", "detail"]
                .iter()
                .any(|member| members.contains_key(*member)) =>
            {
                self.decode_members(Value::Object(members), "").map(Some)
            }
            None => Ok(None),
        }
    }

    /// Map a transport response into an [`Envelope`].
    ///
    /// 2xx bodies are decoded as documents (`204 No Content` gives an empty
    /// one). Other statuses always produce an error object: decoded from the
    /// body when possible, otherwise built from the status line.
    ///
    /// # Errors
    ///
    /// Returns an error if a 2xx body is not a valid document.
    pub fn envelope<D: PrimaryData>(&self, response: &Response<Bytes>) -> Result<Envelope<D>> {
        let status = response.status();

        if response.is_success() {
            let document = if status == 204 {
                Document::default()
            } else {
                self.decode_document(response.body())?
            };
            return Ok(Envelope::from_document(status, document));
        }

        let decoded = if response.body().is_empty() {
            None
        } else {
            self.decode_error(response.body()).unwrap_or_else(|err| {
                debug!(status, error = %err, "error body is not a JSON:API error document");
                None
            })
        };
        let error = decoded.unwrap_or_else(|| status_error(response));

        Ok(Envelope::from_error(status, error))
    }

    /// Decode one resource object. Only its shape and `type` are checked
    /// strictly; every other member follows the leniency policy.
    pub(crate) fn decode_resource<A>(&self, value: Value, path: &str) -> Result<ResourceObject<A>>
    where
        A: Serialize + DeserializeOwned + Default,
    {
        let Value::Object(mut members) = value else {
            return Err(Error::json_deserialization(path, "expected a resource object"));
        };
        let kind = match members.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(_) => {
                return Err(Error::json_deserialization(
                    join_path(path, "type"),
                    "expected a string",
                ));
            }
            None => return Err(Error::json_deserialization(path, "missing field `type`")),
        };

        let attributes = members.remove("attributes").unwrap_or(Value::Null);
        let relationships = members.remove("relationships");

        Ok(ResourceObject {
            kind,
            id: self.member(&mut members, "id", path)?,
            lid: self.member(&mut members, "lid", path)?,
            attributes: self.decode_members(attributes, &join_path(path, "attributes"))?,
            relationships: self.relationships(relationships, &join_path(path, "relationships"))?,
            links: self.member(&mut members, "links", path)?,
            meta: self.member(&mut members, "meta", path)?,
        })
    }

    /// Decode relationship entries one by one; a malformed entry is dropped
    /// when lenient.
    fn relationships(
        &self,
        value: Option<Value>,
        path: &str,
    ) -> Result<BTreeMap<String, Relationship>> {
        let entries = match value {
            None | Some(Value::Null) => return Ok(BTreeMap::new()),
            Some(Value::Object(entries)) => entries,
            Some(other) => return self.recover(from_value(&other, path)),
        };

        let mut relationships = BTreeMap::new();
        for (name, entry) in entries {
            let decoded = from_value(&entry, &join_path(path, &name)).map(Some);
            if let Some(relationship) = self.recover(decoded)? {
                relationships.insert(name, relationship);
            }
        }
        Ok(relationships)
    }

    /// Remove and decode one optional member of `members`.
    fn member<T>(&self, members: &mut Map<String, Value>, key: &str, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match members.remove(key) {
            Some(value) => self.recover(from_value(&value, &join_path(path, key))),
            None => Ok(T::default()),
        }
    }

    /// Apply the leniency policy to a failed member: log it and fall back
    /// to the default, or propagate it when strict.
    fn recover<T: Default>(&self, decoded: Result<T>) -> Result<T> {
        match decoded {
            Err(err @ Error::JsonDeserialization { .. }) if self.lenient => {
                debug!(error = %err, "ignoring malformed member");
                Ok(T::default())
            }
            other => other,
        }
    }

    /// Decode an object member by member, applying the leniency policy.
    fn decode_members<T>(&self, value: Value, path: &str) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let mut members = match value {
            Value::Object(members) => members,
            Value::Null => Map::new(),
            other => return from_value(&other, path),
        };

        if !self.lenient {
            return from_value(&Value::Object(members), path);
        }

        let defaults = match serde_json::to_value(T::default())? {
            Value::Object(defaults) => defaults,
            _ => Map::new(),
        };
        for (key, default) in &defaults {
            members
                .entry(key.clone())
                .or_insert_with(|| default.clone());
        }

        let mut object = Value::Object(members);
        let mut reset: Vec<String> = Vec::new();
        loop {
            let decoded: std::result::Result<T, _> = serde_path_to_error::deserialize(&object);
            let err = match decoded {
                Ok(decoded) => return Ok(decoded),
                Err(err) => err,
            };

            let key = match err.path().iter().next() {
                Some(serde_path_to_error::Segment::Map { key }) if !reset.contains(key) => {
                    key.clone()
                }
                _ => return Err(path_error(path, &err)),
            };

            debug!(
                path = %join_path(path, &err.path().to_string()),
                error = %err.inner(),
                "ignoring malformed field"
            );

            if let Value::Object(members) = &mut object {
                match defaults.get(&key) {
                    Some(default) => {
                        members.insert(key.clone(), default.clone());
                    }
                    None => {
                        members.remove(&key);
                    }
                }
            }
            reset.push(key);
        }
    }
}

/// Deserialize a JSON value, reporting the full path on failure.
fn from_value<T: DeserializeOwned>(value: &Value, path: &str) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|err| path_error(path, &err))
}

fn path_error(prefix: &str, err: &serde_path_to_error::Error<serde_json::Error>) -> Error {
    Error::json_deserialization(join_path(prefix, &err.path().to_string()), err.inner().to_string())
}

fn join_path(prefix: &str, path: &str) -> String {
    match (prefix, path) {
        (prefix, "." | "") => prefix.to_string(),
        ("", path) => path.to_string(),
        (prefix, path) if path.starts_with('[') => format!("{prefix}{path}"),
        (prefix, path) => format!("{prefix}.{path}"),
    }
}

/// Error object describing a failed response whose body said nothing usable.
fn status_error(response: &Response<Bytes>) -> ErrorObject {
    let detail = response
        .text()
        .ok()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    ErrorObject {
        status: Some(response.status().to_string()),
        title: response.reason().map(str::to_string),
        detail,
        ..ErrorObject::default()
    }
}
