//! Credential issuance for [OpenID for Verifiable Credential Issuance](https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html).
//!
//! The crate covers the issuer's core:
//!
//! * [`signing`] selects a signature algorithm from the shape of the issuer's
//!   key and signs credentials as compact JWS (`jwt_vc`).
//! * [`mapper`] and [`compose`] build the credential's claims from an ordered
//!   list of configurable claim mappers.
//! * [`catalog`] and [`well_known`] advertise the credentials the issuer's
//!   clients may be issued in the issuer's discovery document.
//!
//! Hosts supply clients, mapper configuration and sessions through the
//! [`provider`] traits and route requests through [`handle`].

pub mod api;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod credential;
pub mod mapper;
pub mod provider;
pub mod signing;
pub mod types;
pub mod well_known;

mod error;
mod handlers;
mod issuer;

pub use self::compose::ClaimComposer;
pub use self::config::{IssuerConfig, KeyConfig};
pub use self::credential::CredentialTemplate;
pub use self::error::Error;
pub use self::handlers::*;
pub use self::issuer::Issuer;
pub use self::mapper::{ClaimMapper, MapperConfig, MapperRegistry};
pub use self::signing::{Algorithm, KeyMaterial, SigningService};
pub use self::types::*;
