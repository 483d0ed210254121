//! # API
//!
//! Requests are routed to the appropriate handler for processing, returning a
//! response that can be serialized to JSON or converted directly to HTTP.

use std::fmt::Debug;
use std::ops::Deref;

use http::StatusCode;

use crate::issuer::Issuer;

/// A request to process.
#[derive(Clone, Debug)]
pub struct Request<B, H = NoHeaders>
where
    B: Body,
    H: Headers,
{
    /// The request body.
    pub body: B,

    /// Headers associated with this request.
    pub headers: H,
}

impl<B: Body> From<B> for Request<B> {
    fn from(body: B) -> Self {
        Self {
            body,
            headers: NoHeaders,
        }
    }
}

impl<B: Body, H: Headers> From<(B, H)> for Request<B, H> {
    fn from((body, headers): (B, H)) -> Self {
        Self { body, headers }
    }
}

/// A handler's response.
#[derive(Clone, Debug)]
pub struct Response<T> {
    /// Response HTTP status code.
    pub status: StatusCode,

    /// The endpoint-specific response.
    pub body: T,
}

impl<T> From<T> for Response<T> {
    fn from(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

impl<T> Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

/// Request handler.
///
/// Implemented for each `Request<xxxRequest, xxxHeaders>` so requests can be
/// processed by [`crate::handle`].
pub trait Handler<U, P> {
    /// The error type returned by the handler.
    type Error;

    /// Process the request.
    fn handle(
        self, issuer: &Issuer, provider: &P,
    ) -> impl Future<Output = Result<impl Into<Response<U>>, Self::Error>> + Send;
}

/// Restricts the types able to be used as a request body.
pub trait Body: Clone + Debug + Send + Sync {}

/// Restricts the types able to be used as request headers.
pub trait Headers: Clone + Debug + Send + Sync {}

/// Empty headers for handlers that do not require headers.
#[derive(Clone, Debug)]
pub struct NoHeaders;
impl Headers for NoHeaders {}
