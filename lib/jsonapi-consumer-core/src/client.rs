//! The transport trait.
//!
//! [`HttpClient`] is the only thing the resource client needs from an HTTP
//! stack: send a [`Request`], get back a buffered [`Response`]. The
//! `jsonapi-consumer` crate provides a hyper-based implementation; tests can
//! plug in an in-memory one.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Core HTTP client trait.
///
/// Implementations own connection handling (pooling, TLS, timeouts). The
/// returned future must only resolve once the whole body has been read.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// Any status code is a successful execution; only failing to obtain a
    /// response is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<T: HttpClient> HttpClient for Arc<T> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        T::execute(self, request)
    }
}

impl<T: HttpClient> HttpClient for &T {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        T::execute(self, request)
    }
}
