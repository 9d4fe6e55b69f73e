//! Outgoing request descriptor.
//!
//! A [`Request`] is built for one call and consumed by
//! [`crate::HttpClient::execute`]. Header names live in an
//! [`http::HeaderMap`], so `accept` and `Accept` are the same header and a
//! later value replaces an earlier one.
//!
//! # Example
//!
//! ```
//! use jsonapi_consumer_core::{Request, Method};
//! use bytes::Bytes;
//!
//! let url = "https://api.example.com/articles".parse().unwrap();
//! let request = Request::<Bytes>::builder(Method::Get, url)
//!     .header("Accept", "application/vnd.api+json")
//!     .query("page[number]", "1")
//!     .build()
//!     .unwrap();
//! assert_eq!(request.url().query(), Some("page%5Bnumber%5D=1"));
//! assert_eq!(request.header("accept"), Some("application/vnd.api+json"));
//! ```

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::{Error, Form, MEDIA_TYPE, Method, Result};

/// Method, target URL, headers and optional body of one exchange.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<B>,
}

impl<B> Request<B> {
    /// Start a [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: Url) -> RequestBuilder<B> {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Target URL, query included.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// All headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Headers, for middleware that rewrites them.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Header value by case-insensitive name, when it is visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Split into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<B>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Accumulates the pieces of a [`Request`].
///
/// An unusable header name or value is remembered and reported by
/// [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<B>,
    error: Option<Error>,
}

impl<B> RequestBuilder<B> {
    /// Builder with no headers and no body.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }

    /// Set a header, replacing any value already held under the same name
    /// in any letter case.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let (name, value) = (name.as_ref(), value.as_ref());
        let parsed = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| Error::invalid_request(format!("header name `{name}`: {err}")))
            .and_then(|name| {
                HeaderValue::from_str(value)
                    .map_err(|err| Error::invalid_request(format!("header `{name}` value: {err}")))
                    .map(|value| (name, value))
            });
        match parsed {
            Ok((name, value)) => {
                self.headers.insert(name, value);
            }
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Set every header of `headers`, in order.
    #[must_use]
    pub fn headers<K, V>(self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Append one query pair to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Finish the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when a header name or value was not
    /// valid HTTP.
    pub fn build(self) -> Result<Request<B>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        })
    }
}

impl RequestBuilder<Bytes> {
    /// Attach an encoded JSON:API document, labelled with the media type.
    #[must_use]
    pub fn jsonapi(self, document: Bytes) -> Self {
        self.header(http::header::CONTENT_TYPE, MEDIA_TYPE).body(document)
    }

    /// Attach a `multipart/form-data` body and its boundary.
    #[must_use]
    pub fn multipart(self, form: Form) -> Self {
        let (content_type, body) = form.into_body();
        self.header(http::header::CONTENT_TYPE, content_type).body(body)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://api.example.com")
            .and_then(|base| base.join(path))
            .expect("valid URL")
    }

    #[test]
    fn builds_get_without_body() {
        let request = Request::<Bytes>::builder(Method::Get, url("/articles"))
            .header("Accept", MEDIA_TYPE)
            .build()
            .expect("request");

        check!(request.method() == Method::Get);
        check!(request.url().as_str() == "https://api.example.com/articles");
        check!(request.header("Accept") == Some(MEDIA_TYPE));
        check!(request.body().is_none());
    }

    #[test]
    fn query_pairs_are_appended_in_order() {
        let request = Request::<Bytes>::builder(Method::Get, url("/articles"))
            .query("sort", "-created")
            .query("include", "author")
            .build()
            .expect("request");

        check!(
            request.url().as_str()
                == "https://api.example.com/articles?sort=-created&include=author"
        );
    }

    #[test]
    fn header_names_ignore_case() {
        let request = Request::<Bytes>::builder(Method::Get, url("/articles"))
            .header("Accept", MEDIA_TYPE)
            .headers([("accept", "text/html"), ("X-Trace", "1")])
            .build()
            .expect("request");

        check!(request.headers().len() == 2);
        check!(request.headers().get_all("accept").iter().count() == 1);
        check!(request.header("ACCEPT") == Some("text/html"));
        check!(request.header("x-trace") == Some("1"));
    }

    #[test]
    fn caller_content_type_replaces_the_document_one() {
        let request = Request::builder(Method::Post, url("/articles"))
            .jsonapi(Bytes::from_static(b"{}"))
            .header("content-type", "application/json")
            .build()
            .expect("request");

        check!(request.headers().get_all("Content-Type").iter().count() == 1);
        check!(request.header("Content-Type") == Some("application/json"));
    }

    #[test]
    fn jsonapi_body_sets_media_type() {
        let body = Bytes::from(r#"{"data":{"type":"articles"}}"#);
        let request = Request::builder(Method::Post, url("/articles"))
            .jsonapi(body.clone())
            .build()
            .expect("request");

        check!(request.method() == Method::Post);
        check!(request.header("content-type") == Some(MEDIA_TYPE));
        check!(request.body() == Some(&body));
    }

    #[test]
    fn multipart_body_carries_boundary() {
        let form = Form::with_boundary("b0undary").file("file", "a.txt", "hello");
        let request = Request::builder(Method::Post, url("/uploads"))
            .multipart(form)
            .build()
            .expect("request");

        check!(request.header("Content-Type") == Some("multipart/form-data; boundary=b0undary"));
        check!(request.body().is_some_and(|body| !body.is_empty()));
    }

    #[test]
    fn invalid_header_is_reported_by_build() {
        let result = Request::<Bytes>::builder(Method::Get, url("/"))
            .header("Bad Header", "x")
            .header("X-Ok", "1")
            .build();
        let_assert!(Err(Error::InvalidRequest(message)) = result);
        check!(message.contains("Bad Header"));

        let result = Request::<Bytes>::builder(Method::Get, url("/"))
            .header("X-Multi", "a\r\nX-Evil: 1")
            .build();
        check!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn middleware_can_rewrite_headers() {
        let mut request = Request::<Bytes>::builder(Method::Delete, url("/articles/1"))
            .header("X-Trace", "abc")
            .build()
            .expect("request");

        request
            .headers_mut()
            .insert("x-extra", HeaderValue::from_static("1"));
        let (method, _, headers, body) = request.into_parts();

        check!(method == Method::Delete);
        check!(headers.get("X-Trace").map(HeaderValue::as_bytes) == Some(&b"abc"[..]));
        check!(headers.get("X-Extra").is_some());
        check!(body.is_none());
    }
}
