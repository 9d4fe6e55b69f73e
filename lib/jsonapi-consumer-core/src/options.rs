//! Per-call request options: query parameters, headers and relationship
//! segments.

use crate::{Result, to_query_pairs};

/// Optional parts of a resource request.
///
/// # Example
///
/// ```
/// use jsonapi_consumer_core::RequestOptions;
///
/// let options = RequestOptions::new()
///     .include(["author", "comments"])
///     .page("number", "2")
///     .header("Authorization", "Bearer token")
///     .header("X-Trace", " ")
///     .relation("comments");
///
/// assert_eq!(options.query_params()[0], ("include".to_string(), "author,comments".to_string()));
/// assert_eq!(options.attached_headers().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    relations: Vec<String>,
}

impl RequestOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter. Empty values are sent as `name=`.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append query parameters in iteration order.
    #[must_use]
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(name, value)| (name.into(), value.into())));
        self
    }

    /// Append query parameters serialized from a typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized as a query.
    pub fn query_from<T: serde::Serialize>(self, value: &T) -> Result<Self> {
        Ok(self.query_pairs(to_query_pairs(value)?))
    }

    /// `include=a,b` for compound documents.
    #[must_use]
    pub fn include<I, S>(self, relationships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.query("include", join(relationships))
    }

    /// `sort=a,-b`.
    #[must_use]
    pub fn sort<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.query("sort", join(fields))
    }

    /// `fields[kind]=a,b` sparse fieldset.
    #[must_use]
    pub fn fields<I, S>(self, kind: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.query(format!("fields[{kind}]"), join(fields))
    }

    /// `page[key]=value`.
    #[must_use]
    pub fn page(self, key: &str, value: impl Into<String>) -> Self {
        self.query(format!("page[{key}]"), value)
    }

    /// `filter[key]=value`.
    #[must_use]
    pub fn filter(self, key: &str, value: impl Into<String>) -> Self {
        self.query(format!("filter[{key}]"), value)
    }

    /// Add a header. Blank values are kept here but never sent.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add headers.
    #[must_use]
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(name, value)| (name.into(), value.into())));
        self
    }

    /// Append a relationship path segment.
    #[must_use]
    pub fn relation(mut self, segment: impl Into<String>) -> Self {
        self.relations.push(segment.into());
        self
    }

    /// Append relationship path segments in order.
    #[must_use]
    pub fn relations<S: Into<String>>(mut self, segments: impl IntoIterator<Item = S>) -> Self {
        self.relations.extend(segments.into_iter().map(Into::into));
        self
    }

    /// Query parameters, in the order they were added.
    #[must_use]
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    /// Relationship segments, in the order they were added.
    #[must_use]
    pub fn relation_segments(&self) -> &[String] {
        &self.relations
    }

    /// Headers that will be attached: those whose value is not blank.
    pub fn attached_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
