//! Body serialization utilities.

use bytes::Bytes;

use crate::Result;

/// The JSON:API media type, used for `Accept` and `Content-Type`.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use jsonapi_consumer_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Article { title: String }
///
/// let article = Article { title: "JSON:API".to_string() };
/// let bytes = to_json(&article).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"title":"JSON:API"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to ordered query pairs.
///
/// Uses `serde_html_form`, so `Vec<T>` fields become repeated keys and
/// `None` fields skipped with `skip_serializing_if` are left out.
///
/// # Errors
///
/// Returns an error if query serialization fails.
///
/// # Example
///
/// ```
/// use jsonapi_consumer_core::to_query_pairs;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Paging {
///     #[serde(rename = "page[number]")]
///     number: u32,
///     #[serde(rename = "page[size]")]
///     size: u32,
/// }
///
/// let pairs = to_query_pairs(&Paging { number: 2, size: 10 }).expect("serialize");
/// assert_eq!(pairs, vec![
///     ("page[number]".to_string(), "2".to_string()),
///     ("page[size]".to_string(), "10".to_string()),
/// ]);
/// ```
pub fn to_query_pairs<T: serde::Serialize>(value: &T) -> Result<Vec<(String, String)>> {
    let encoded = serde_html_form::to_string(value)?;
    Ok(url::form_urlencoded::parse(encoded.as_bytes())
        .into_owned()
        .collect())
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the exact path of the
/// field that failed (e.g. `data[1].id`).
///
/// # Errors
///
/// Returns an error if JSON deserialization fails.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
