//! Typed JSON:API resource client.
//!
//! [`JsonApiClient`] wraps any [`HttpClient`] with a base URL and a
//! [`Codec`]. Each operation composes the URI, attaches headers, encodes the
//! body, dispatches through the transport and maps the response into an
//! [`Envelope`]. Nothing is retained between calls.

use bytes::Bytes;
use tracing::{debug, warn};
use url::Url;

use crate::codec::PrimaryData;
use crate::document::{Resource, ResourceObject};
use crate::{
    Codec, Envelope, Form, HttpClient, MEDIA_TYPE, Method, Part, Request, RequestBuilder,
    RequestOptions, Result, compose,
};

/// Generic JSON:API client.
///
/// Cloning is as cheap as cloning the transport.
///
/// # Example
///
/// ```ignore
/// use jsonapi_consumer::{HyperClient, JsonApiClient, RequestOptions};
///
/// let client = JsonApiClient::new(HyperClient::new(), "https://api.example.com")?;
///
/// let envelope = client
///     .list::<Article>("articles", &RequestOptions::new().page("number", "2"))
///     .await?;
/// if let Some(articles) = envelope.data() {
///     println!("{} articles", articles.len());
/// }
/// ```
#[derive(Debug)]
pub struct JsonApiClient<C> {
    http: C,
    base_url: Url,
    codec: Codec,
}

impl<C: Clone> Clone for JsonApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            codec: self.codec,
        }
    }
}

impl<C> JsonApiClient<C> {
    /// Create a new client with the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new(http: C, base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self::with_url(http, Url::parse(base_url.as_ref())?))
    }

    /// Create a new client with a pre-parsed URL.
    #[must_use]
    pub fn with_url(http: C, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            codec: Codec::default(),
        }
    }

    /// Replace the codec (e.g. to turn field leniency off).
    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// The same client aimed at another base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn with_base_url(&self, base_url: impl AsRef<str>) -> Result<Self>
    where
        C: Clone,
    {
        Ok(Self {
            http: self.http.clone(),
            base_url: Url::parse(base_url.as_ref())?,
            codec: self.codec,
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Codec in use.
    #[must_use]
    pub const fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Get a reference to the inner HTTP client.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.http
    }

    /// Consume the wrapper and return the inner HTTP client.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.http
    }

    /// Compose the URL and attach headers. JSON:API requests announce the
    /// media type in `Accept`; a caller header of the same name, in any
    /// letter case, replaces it.
    fn request(
        &self,
        method: Method,
        path: &str,
        id: Option<&str>,
        options: &RequestOptions,
        jsonapi: bool,
    ) -> Result<RequestBuilder<Bytes>> {
        let url = compose(
            &self.base_url,
            path,
            id,
            options.relation_segments(),
            options.query_params().iter().map(|(k, v)| (k, v)),
        )?;

        let mut builder = Request::builder(method, url);
        if jsonapi {
            builder = builder.header(http::header::ACCEPT, MEDIA_TYPE);
        }
        Ok(builder.headers(options.attached_headers()))
    }
}

impl<C: HttpClient> JsonApiClient<C> {
    /// `GET /path[/relations][?query]`: fetch a collection.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an undecodable 2xx body.
    pub async fn list<A: Resource>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Envelope<Vec<ResourceObject<A>>>> {
        let request = self.request(Method::Get, path, None, options, true)?;
        self.send(request.build()?).await
    }

    /// `GET /path/{id}[/relations][?query]`: fetch one resource.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an undecodable 2xx body.
    pub async fn get_by_id<A: Resource>(
        &self,
        path: &str,
        id: &str,
        options: &RequestOptions,
    ) -> Result<Envelope<ResourceObject<A>>> {
        let request = self.request(Method::Get, path, Some(id), options, true)?;
        self.send(request.build()?).await
    }

    /// `POST /path` with a JSON:API document.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails, on transport failure, or on an
    /// undecodable 2xx body.
    pub async fn create<A: Resource, R: Resource>(
        &self,
        path: &str,
        resource: &ResourceObject<A>,
        options: &RequestOptions,
    ) -> Result<Envelope<ResourceObject<R>>> {
        let body = self.codec.encode(resource)?;
        let request = self.request(Method::Post, path, None, options, true)?;
        self.send(request.jsonapi(body).build()?).await
    }

    /// `POST /path` with a single-field `multipart/form-data` body.
    ///
    /// `file_name` defaults to `key`. No JSON:API `Accept` header is sent.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an undecodable 2xx body.
    pub async fn upload_file<R: Resource>(
        &self,
        path: &str,
        key: &str,
        data: impl Into<Bytes>,
        file_name: Option<&str>,
        options: &RequestOptions,
    ) -> Result<Envelope<ResourceObject<R>>> {
        let form = Form::new().part(Part::file(key, file_name.unwrap_or(key), data));
        let request = self.request(Method::Post, path, None, options, false)?;
        self.send(request.multipart(form).build()?).await
    }

    /// `PATCH /path/{id}` with a JSON:API document.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails, on transport failure, or on an
    /// undecodable 2xx body.
    pub async fn update<A: Resource, R: Resource>(
        &self,
        path: &str,
        id: &str,
        resource: &ResourceObject<A>,
        options: &RequestOptions,
    ) -> Result<Envelope<ResourceObject<R>>> {
        let body = self.codec.encode(resource)?;
        let request = self.request(Method::Patch, path, Some(id), options, true)?;
        self.send(request.jsonapi(body).build()?).await
    }

    /// `PATCH /path` with a JSON:API document; the target is named by the
    /// path alone.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails, on transport failure, or on an
    /// undecodable 2xx body.
    pub async fn partial_update<A: Resource, R: Resource>(
        &self,
        path: &str,
        resource: &ResourceObject<A>,
        options: &RequestOptions,
    ) -> Result<Envelope<ResourceObject<R>>> {
        let body = self.codec.encode(resource)?;
        let request = self.request(Method::Patch, path, None, options, true)?;
        self.send(request.jsonapi(body).build()?).await
    }

    /// `DELETE /path/{id}`.
    ///
    /// Mapped like every other operation: a 2xx body (if any) is the
    /// document, a failure body is the error.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an undecodable 2xx body.
    pub async fn delete<R: Resource>(
        &self,
        path: &str,
        id: &str,
        options: &RequestOptions,
    ) -> Result<Envelope<ResourceObject<R>>> {
        let request = self.request(Method::Delete, path, Some(id), options, true)?;
        self.send(request.build()?).await
    }

    async fn send<D: PrimaryData>(&self, request: Request<Bytes>) -> Result<Envelope<D>> {
        let method = request.method();
        let url = request.url().clone();
        debug!(%method, %url, "dispatching JSON:API request");

        let response = self.http.execute(request).await?;
        let envelope = self.codec.envelope(&response)?;

        if !envelope.is_success() {
            warn!(
                %method,
                %url,
                status = envelope.status(),
                title = envelope.error().and_then(|error| error.title.as_deref()),
                "JSON:API request failed"
            );
        }

        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use assert2::{check, let_assert};
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::{Error, Response};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Article {
        title: String,
        #[serde(default)]
        words: u32,
    }

    impl Resource for Article {
        const TYPE: &'static str = "articles";
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Photo {
        #[serde(default)]
        url: String,
    }

    impl Resource for Photo {
        const TYPE: &'static str = "photos";
    }

    /// Replays canned responses and records what was sent.
    #[derive(Default)]
    struct MockTransport {
        responses: Mutex<VecDeque<Result<Response<Bytes>>>>,
        requests: Mutex<Vec<Request<Bytes>>>,
    }

    impl MockTransport {
        fn replying(status: u16, body: &str) -> Self {
            let transport = Self::default();
            transport.push(Ok(Response::new(
                status,
                http::HeaderMap::new(),
                Bytes::from(body.to_string()),
            )));
            transport
        }

        fn failing(error: Error) -> Self {
            let transport = Self::default();
            transport.push(Err(error));
            transport
        }

        fn push(&self, response: Result<Response<Bytes>>) {
            self.responses.lock().expect("lock").push_back(response);
        }

        fn last_request(&self) -> Request<Bytes> {
            self.requests
                .lock()
                .expect("lock")
                .last()
                .cloned()
                .expect("a request was sent")
        }
    }

    impl HttpClient for MockTransport {
        async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
            self.requests.lock().expect("lock").push(request);
            self.responses
                .lock()
                .expect("lock")
                .pop_front()
                .expect("a response is queued")
        }
    }

    fn client(transport: &MockTransport) -> JsonApiClient<&MockTransport> {
        JsonApiClient::new(transport, "https://api.test").expect("valid base URL")
    }

    fn body_text(request: &Request<Bytes>) -> String {
        String::from_utf8_lossy(request.body().expect("body")).into_owned()
    }

    #[tokio::test]
    async fn list_decodes_collection() {
        let transport = MockTransport::replying(
            200,
            r#"{"data":[
                {"type":"articles","id":"1","attributes":{"title":"One"}},
                {"type":"articles","id":"2","attributes":{"title":"Two"}}
            ]}"#,
        );

        let envelope = client(&transport)
            .list::<Article>("articles", &RequestOptions::new().page("number", "2"))
            .await
            .expect("list");

        check!(envelope.status() == 200);
        check!(envelope.error().is_none());
        let_assert!(Some([first, second]) = envelope.data().map(Vec::as_slice));
        check!(first.attributes.title == "One");
        check!(second.id.as_deref() == Some("2"));

        let request = transport.last_request();
        check!(request.method() == Method::Get);
        check!(request.url().as_str() == "https://api.test/articles?page%5Bnumber%5D=2");
        check!(request.header("Accept") == Some(MEDIA_TYPE));
        check!(request.body().is_none());
    }

    #[tokio::test]
    async fn get_by_id_not_found_returns_error_object() {
        let transport = MockTransport::replying(
            404,
            r#"{"errors":[{"status":"404","title":"Not Found"}]}"#,
        );

        let envelope = client(&transport)
            .get_by_id::<Article>("articles", "99", &RequestOptions::new())
            .await
            .expect("get");

        check!(envelope.status() == 404);
        check!(envelope.document().is_none());
        check!(envelope.error().and_then(|e| e.title.as_deref()) == Some("Not Found"));
        check!(transport.last_request().url().path() == "/articles/99");
    }

    #[tokio::test]
    async fn get_by_id_appends_relations() {
        let transport = MockTransport::replying(200, r#"{"data":null}"#);
        let options = RequestOptions::new()
            .relation("comments")
            .include(["author"]);

        let envelope = client(&transport)
            .get_by_id::<Article>("articles", "1", &options)
            .await
            .expect("get");

        check!(envelope.is_success());
        check!(envelope.data().is_none());
        check!(
            transport.last_request().url().as_str()
                == "https://api.test/articles/1/comments?include=author"
        );
    }

    #[tokio::test]
    async fn create_posts_document() {
        let transport = MockTransport::replying(
            201,
            r#"{"data":{"type":"articles","id":"7","attributes":{"title":"Hello","words":1}}}"#,
        );
        let article = ResourceObject::new(Article {
            title: "Hello".to_string(),
            words: 1,
        });

        let envelope = client(&transport)
            .create::<Article, Article>("articles", &article, &RequestOptions::new())
            .await
            .expect("create");

        check!(envelope.status() == 201);
        check!(envelope.data().and_then(|r| r.id.as_deref()) == Some("7"));

        let request = transport.last_request();
        check!(request.method() == Method::Post);
        check!(request.url().path() == "/articles");
        check!(request.header("Content-Type") == Some(MEDIA_TYPE));
        check!(
            body_text(&request)
                == r#"{"data":{"type":"articles","attributes":{"title":"Hello","words":1}}}"#
        );
    }

    #[tokio::test]
    async fn upload_file_sends_single_multipart_field() {
        let transport = MockTransport::replying(
            201,
            r#"{"data":{"type":"photos","id":"3","attributes":{"url":"/p/3.png"}}}"#,
        );

        let envelope = client(&transport)
            .upload_file::<Photo>(
                "photos",
                "file",
                &b"PNG"[..],
                Some("photo.png"),
                &RequestOptions::new(),
            )
            .await
            .expect("upload");

        check!(envelope.data().map(|r| r.attributes.url.as_str()) == Some("/p/3.png"));

        let request = transport.last_request();
        check!(request.method() == Method::Post);
        check!(request.header("Accept").is_none());
        let_assert!(Some(content_type) = request.header("Content-Type"));
        check!(content_type.starts_with("multipart/form-data; boundary="));
        let body = body_text(&request);
        check!(body.contains(r#"Content-Disposition: form-data; name="file"; filename="photo.png""#));
        check!(body.contains("PNG"));
    }

    #[tokio::test]
    async fn upload_file_name_defaults_to_key() {
        let transport = MockTransport::replying(204, "");

        client(&transport)
            .upload_file::<Photo>("photos", "avatar", vec![1_u8, 2], None, &RequestOptions::new())
            .await
            .expect("upload");

        let body = body_text(&transport.last_request());
        check!(body.contains(r#"name="avatar"; filename="avatar""#));
    }

    #[tokio::test]
    async fn update_patches_by_id() {
        let transport = MockTransport::replying(
            200,
            r#"{"data":{"type":"articles","id":"1","attributes":{"title":"New"}}}"#,
        );
        let article = ResourceObject::new(Article {
            title: "New".to_string(),
            words: 0,
        })
        .with_id("1");

        let envelope = client(&transport)
            .update::<Article, Article>("articles", "1", &article, &RequestOptions::new())
            .await
            .expect("update");

        check!(envelope.data().map(|r| r.attributes.title.as_str()) == Some("New"));
        let request = transport.last_request();
        check!(request.method() == Method::Patch);
        check!(request.url().path() == "/articles/1");
    }

    #[tokio::test]
    async fn partial_update_targets_path_only() {
        let transport = MockTransport::replying(422, r#"{"errors":[{"title":"Invalid"}]}"#);
        let article = ResourceObject::new(Article::default()).with_id("1");

        let envelope = client(&transport)
            .partial_update::<Article, Article>("articles/1", &article, &RequestOptions::new())
            .await
            .expect("partial update");

        check!(envelope.status() == 422);
        check!(envelope.error().and_then(|e| e.title.as_deref()) == Some("Invalid"));
        let request = transport.last_request();
        check!(request.method() == Method::Patch);
        check!(request.url().path() == "/articles/1");
    }

    #[tokio::test]
    async fn delete_success_is_a_document() {
        let transport = MockTransport::replying(204, "");

        let envelope = client(&transport)
            .delete::<Article>("articles", "1", &RequestOptions::new())
            .await
            .expect("delete");

        check!(envelope.is_success());
        check!(envelope.document().is_some());
        check!(envelope.error().is_none());
        check!(transport.last_request().method() == Method::Delete);
    }

    #[tokio::test]
    async fn delete_failure_is_an_error() {
        let transport = MockTransport::replying(403, r#"{"errors":[{"title":"Forbidden"}]}"#);

        let envelope = client(&transport)
            .delete::<Article>("articles", "1", &RequestOptions::new())
            .await
            .expect("delete");

        check!(envelope.document().is_none());
        check!(envelope.error().and_then(|e| e.title.as_deref()) == Some("Forbidden"));
    }

    #[tokio::test]
    async fn blank_headers_are_not_sent() {
        let transport = MockTransport::replying(200, r#"{"data":[]}"#);
        let options = RequestOptions::new()
            .header("Authorization", "Bearer t")
            .header("X-Empty", "")
            .header("X-Blank", "   ");

        client(&transport)
            .list::<Article>("articles", &options)
            .await
            .expect("list");

        let request = transport.last_request();
        check!(request.header("Authorization") == Some("Bearer t"));
        check!(request.header("X-Empty").is_none());
        check!(request.header("X-Blank").is_none());
    }

    #[tokio::test]
    async fn caller_accept_replaces_media_type() {
        let transport = MockTransport::replying(200, r#"{"data":[]}"#);
        let options = RequestOptions::new().header("accept", "application/json");

        client(&transport)
            .list::<Article>("articles", &options)
            .await
            .expect("list");

        let request = transport.last_request();
        check!(request.headers().get_all("Accept").iter().count() == 1);
        check!(request.header("Accept") == Some("application/json"));
    }

    #[tokio::test]
    async fn invalid_caller_header_is_not_sent() {
        let transport = MockTransport::replying(200, r#"{"data":[]}"#);
        let options = RequestOptions::new().header("X Bad", "1");

        let result = client(&transport)
            .list::<Article>("articles", &options)
            .await;

        let_assert!(Err(Error::InvalidRequest(_)) = result);
        check!(transport.requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let transport = MockTransport::failing(Error::connection("refused"));

        let result = client(&transport)
            .list::<Article>("articles", &RequestOptions::new())
            .await;

        let_assert!(Err(error) = result);
        check!(error.is_connection());
    }

    #[tokio::test]
    async fn malformed_success_body_is_fatal() {
        let transport = MockTransport::replying(200, "<html>oops</html>");

        let result = client(&transport)
            .get_by_id::<Article>("articles", "1", &RequestOptions::new())
            .await;

        let_assert!(Err(error) = result);
        check!(error.is_decode());
    }

    #[tokio::test]
    async fn strict_codec_reports_field_path() {
        let transport = MockTransport::replying(
            200,
            r#"{"data":{"type":"articles","id":"1","attributes":{"title":"T","words":"x"}}}"#,
        );

        let result = client(&transport)
            .with_codec(Codec::strict())
            .get_by_id::<Article>("articles", "1", &RequestOptions::new())
            .await;

        let_assert!(Err(Error::JsonDeserialization { path, .. }) = result);
        check!(path == "data.attributes.words");
    }

    #[test]
    fn with_base_url_keeps_transport_and_codec() {
        let transport = MockTransport::default();
        let client = client(&transport).with_codec(Codec::strict());

        let moved = client.with_base_url("http://localhost:9000").expect("valid URL");

        check!(moved.base_url().as_str() == "http://localhost:9000/");
        check!(!moved.codec().is_lenient());
        check!(client.base_url().as_str() == "https://api.test/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = JsonApiClient::new(MockTransport::default(), "not a url");
        let_assert!(Err(Error::InvalidUrl(_)) = result);
    }
}
