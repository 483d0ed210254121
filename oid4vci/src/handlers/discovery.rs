//! # Discovery Endpoint
//!
//! Serves the issuer's discovery document: the host's base `OpenID` Connect
//! configuration extended with the pre-authorized code grant, the credential
//! endpoint, and (optionally) the credential types supported per encoding.
//!
//! ```http
//! GET /.well-known/openid-configuration HTTP/1.1
//!     Host: issuer.example.com
//! ```
//!
//! Malformed client attributes never fail the request; they are skipped.

use anyhow::Context as _;

use crate::handlers::{Body, Error, Handler, Request, Response, Result};
use crate::issuer::Issuer;
use crate::provider::{Metadata, Provider};
use crate::types::{DiscoveryRequest, DiscoveryResponse};

/// Discovery request handler.
///
/// # Errors
///
/// Returns an error if the provider is not available.
async fn discovery(
    issuer: &Issuer, provider: &impl Provider, _: Request<DiscoveryRequest>,
) -> Result<DiscoveryResponse> {
    let owner = &issuer.config().issuer;
    let base = Metadata::configuration(provider, owner).await.context("getting configuration")?;
    let clients = Metadata::clients(provider, owner).await.context("getting clients")?;

    Ok(DiscoveryResponse(issuer.discovery(base, &clients)))
}

impl<P: Provider> Handler<DiscoveryResponse, P> for Request<DiscoveryRequest> {
    type Error = Error;

    async fn handle(
        self, issuer: &Issuer, provider: &P,
    ) -> Result<impl Into<Response<DiscoveryResponse>>, Self::Error> {
        discovery(issuer, provider, self).await
    }
}

impl Body for DiscoveryRequest {}
