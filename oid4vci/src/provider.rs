//! # Provider Traits
//!
//! Implemented by the issuer's host to supply the data the issuer reads but
//! does not own: the base discovery document, registered clients, mapper
//! configuration, and the sessions bound to access tokens.

use std::future::Future;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::mapper::MapperConfig;
use crate::types::{Authorized, ClientConfig};

/// Issuer Provider trait.
pub trait Provider: Metadata + Mappers + Subject + Clone {}

/// A blanket implementation for `Provider` trait so that any type implementing
/// the required super traits is considered a `Provider`.
impl<T> Provider for T where T: Metadata + Mappers + Subject + Clone {}

/// Supplies discovery metadata and registered clients.
pub trait Metadata: Send + Sync {
    /// The base `OpenID` Connect discovery document for the issuer.
    fn configuration(&self, issuer: &str) -> impl Future<Output = Result<Map<String, Value>>> + Send;

    /// Every client registered with the issuer.
    fn clients(&self, issuer: &str) -> impl Future<Output = Result<Vec<ClientConfig>>> + Send;
}

/// Supplies the claim mapper configuration of a client.
pub trait Mappers: Send + Sync {
    /// The client's mappers, in the order they are applied.
    fn mappers(&self, client_id: &str) -> impl Future<Output = Result<Vec<MapperConfig>>> + Send;
}

/// Resolves the session credentials are issued for.
pub trait Subject: Send + Sync {
    /// The client and user session bound to an access token.
    fn authorize(&self, access_token: &str) -> impl Future<Output = Result<Authorized>> + Send;
}
