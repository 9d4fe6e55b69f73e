//! Failures of a JSON:API exchange.
//!
//! Only a failed transport, an unusable request or an undecodable success
//! body is an [`Error`]. A non-2xx HTTP status is not: it is reported
//! through [`crate::Envelope`].

use derive_more::{Display, Error, From};

/// Everything that can make a client operation fail.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server could not be reached, or the exchange broke mid-way.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// The TLS handshake or certificate check failed.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The exchange, body read included, outlasted the configured timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// A header or URI could not be turned into a valid HTTP request.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// Encoding a resource document failed.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// A value in a response body did not fit its model.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// Where the value sits, e.g. `data[0].attributes.title`.
        path: String,
        /// What the deserializer expected.
        message: String,
    },

    /// The body is JSON but not a JSON:API document.
    #[display("invalid JSON:API document: {_0}")]
    #[from(skip)]
    InvalidDocument(#[error(not(source))] String),

    /// A query model could not be flattened into pairs.
    #[display("query serialization error: {_0}")]
    #[from]
    QuerySerialization(serde_html_form::ser::Error),

    /// The base URL, or a URI resolved against it, is not valid.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result of a client operation.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// [`Error::Connection`] with a message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// [`Error::Tls`] with a message.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// [`Error::InvalidRequest`] with a message.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// [`Error::JsonDeserialization`] at `path`.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// [`Error::InvalidDocument`] with a message.
    #[must_use]
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument(message.into())
    }

    /// The exchange timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// The connection failed.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Nothing usable came back: connection, TLS or timeout.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Tls(_) | Self::Timeout)
    }

    /// A response arrived but its body could not be decoded.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::JsonDeserialization { .. } | Self::InvalidDocument(_)
        )
    }
}
