//! What the transport hands back.
//!
//! A [`Response`] holds the status, the headers and the fully buffered
//! body. Turning it into a JSON:API [`crate::Envelope`] is the job of
//! [`crate::Codec`].

use bytes::Bytes;
use http::HeaderMap;

/// Buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HeaderMap,
    body: B,
}

impl<B> Response<B> {
    /// Assemble a response.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// All headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value by case-insensitive name, when it is visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Buffered body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// Canonical reason phrase, for registered status codes.
    #[must_use]
    pub fn reason(&self) -> Option<&'static str> {
        http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
    }
}

impl Response<Bytes> {
    /// Body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use http::HeaderValue;

    use super::*;

    fn empty(status: u16) -> Response<Bytes> {
        Response::new(status, HeaderMap::new(), Bytes::new())
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/vnd.api+json"));
        headers.insert("x-opaque", HeaderValue::from_bytes(b"\xff").expect("opaque value"));
        let response = Response::new(200, headers, Bytes::from(r#"{"data":[]}"#));

        check!(response.header("Content-Type") == Some("application/vnd.api+json"));
        check!(response.header("x-opaque").is_none());
        check!(response.headers().contains_key("X-Opaque"));
    }

    #[test]
    fn success_is_the_2xx_range() {
        check!(empty(200).is_success());
        check!(empty(204).is_success());
        check!(!empty(199).is_success());
        check!(!empty(304).is_success());
        check!(!empty(404).is_success());
    }

    #[test]
    fn reason_for_known_codes_only() {
        check!(empty(404).reason() == Some("Not Found"));
        check!(empty(599).reason().is_none());
    }

    #[test]
    fn text_requires_utf8() {
        let response = Response::new(502, HeaderMap::new(), Bytes::from("Bad gateway"));
        check!(response.text().ok().as_deref() == Some("Bad gateway"));

        let response = Response::new(502, HeaderMap::new(), Bytes::from_static(b"\xff\xfe"));
        check!(response.text().is_err());
    }
}
