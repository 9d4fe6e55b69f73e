//! HTTP method types.

use derive_more::Display;

/// HTTP request method used by the resource operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - fetch a collection or a single resource.
    #[display("GET")]
    Get,
    /// POST method - create a resource or upload a file.
    #[display("POST")]
    Post,
    /// PATCH method - update a resource.
    #[display("PATCH")]
    Patch,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}
