//! The uniform result of every resource operation.

use crate::document::{Document, ErrorObject};

#[derive(Debug, Clone, PartialEq)]
enum Outcome<D> {
    Document(Document<D>),
    Error(ErrorObject),
}

/// Result envelope: either a decoded document or a JSON:API error, plus the
/// transport status.
///
/// An envelope is only built from a completed exchange, so exactly one of
/// [`Envelope::document`] and [`Envelope::error`] is `Some`. It cannot be
/// modified once returned.
///
/// # Example
///
/// ```ignore
/// let envelope = client.get_by_id::<Article>("articles", "1", &RequestOptions::new()).await?;
/// match envelope.into_result() {
///     Ok(document) => println!("{:?}", document.data),
///     Err(error) => eprintln!("{:?}: {:?}", error.status, error.title),
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<D> {
    status: u16,
    outcome: Outcome<D>,
}

impl<D> Envelope<D> {
    pub(crate) const fn from_document(status: u16, document: Document<D>) -> Self {
        Self {
            status,
            outcome: Outcome::Document(document),
        }
    }

    pub(crate) const fn from_error(status: u16, error: ErrorObject) -> Self {
        Self {
            status,
            outcome: Outcome::Error(error),
        }
    }

    /// HTTP status code returned by the transport.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The decoded document of a successful call.
    #[must_use]
    pub const fn document(&self) -> Option<&Document<D>> {
        match &self.outcome {
            Outcome::Document(document) => Some(document),
            Outcome::Error(_) => None,
        }
    }

    /// The error of a failed call.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorObject> {
        match &self.outcome {
            Outcome::Error(error) => Some(error),
            Outcome::Document(_) => None,
        }
    }

    /// Primary data of the document, if any.
    #[must_use]
    pub fn data(&self) -> Option<&D> {
        self.document().and_then(|document| document.data.as_ref())
    }

    /// Consume into the document, dropping any error.
    #[must_use]
    pub fn into_document(self) -> Option<Document<D>> {
        match self.outcome {
            Outcome::Document(document) => Some(document),
            Outcome::Error(_) => None,
        }
    }

    /// Consume into `Ok(document)` or `Err(error)`.
    pub fn into_result(self) -> std::result::Result<Document<D>, ErrorObject> {
        match self.outcome {
            Outcome::Document(document) => Ok(document),
            Outcome::Error(error) => Err(error),
        }
    }

    /// Consume into (status, document, error).
    #[must_use]
    pub fn into_parts(self) -> (u16, Option<Document<D>>, Option<ErrorObject>) {
        match self.outcome {
            Outcome::Document(document) => (self.status, Some(document), None),
            Outcome::Error(error) => (self.status, None, Some(error)),
        }
    }
}
