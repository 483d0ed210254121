//! # Endpoint
//!
//! `handle` is the entry point for issuer requests. Requests are routed to the
//! appropriate handler for processing, returning a response that can be
//! serialized to a JSON object.

mod credential;
mod discovery;

use std::fmt::Debug;

use http::HeaderMap;
use http::header::AUTHORIZATION;
use tracing::instrument;

pub use crate::api::{Body, Handler, Headers, NoHeaders, Request, Response};
pub use crate::error::Error;
use crate::issuer::Issuer;
use crate::provider::Provider;

/// Result type for credential issuance.
pub type Result<T, E = Error> = anyhow::Result<T, E>;

/// Handle incoming requests.
///
/// # Errors
///
/// This method can fail for a number of reasons related to the incoming
/// request's viability. Expected failures include an invalid access token,
/// a credential that is not advertised, and signing failures.
///
/// Implementers should look to the Error type and description for more
/// information on the reason for failure.
#[instrument(level = "debug", skip(issuer, provider))]
pub async fn handle<B, H, P, U>(
    issuer: &Issuer, request: impl Into<Request<B, H>> + Debug, provider: &P,
) -> Result<Response<U>>
where
    B: Body,
    H: Headers,
    P: Provider,
    Request<B, H>: Handler<U, P, Error = Error>,
{
    let request: Request<B, H> = request.into();
    Ok(request.handle(issuer, provider).await?.into())
}

/// Credential request headers.
pub type CredentialHeaders = AuthorizationHeader;

/// An authorization-only header for handlers that solely require
/// authorization.
#[derive(Clone, Debug)]
pub struct AuthorizationHeader {
    /// The authorization header (access token), without the `Bearer` prefix.
    pub authorization: String,
}

impl Headers for AuthorizationHeader {}

impl TryFrom<&HeaderMap> for AuthorizationHeader {
    type Error = Error;

    fn try_from(headers: &HeaderMap) -> Result<Self> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Err(Error::InvalidRequest("missing authorization header".into()));
        };
        let value = value
            .to_str()
            .map_err(|e| Error::InvalidRequest(format!("invalid authorization header: {e}")))?;
        let token = match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token,
            _ => value,
        }
        .trim();
        if token.is_empty() {
            return Err(Error::InvalidRequest("empty access token".into()));
        }
        Ok(Self {
            authorization: token.to_string(),
        })
    }
}
