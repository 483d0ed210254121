//! # Credential Signing
//!
//! The [`SigningService`] turns a [`CredentialTemplate`] into a signed
//! `jwt_vc` credential. The signature algorithm is chosen once, when the
//! service is created, from the shape of the configured [`KeyMaterial`].
//! Creating a service with unsupported key material fails before any
//! cryptographic operation runs.

pub mod algorithm;
pub mod jws;
pub mod key;

use chrono::Utc;
use serde_json::Value;

pub use self::algorithm::{Algorithm, resolve};
pub use self::jws::Header;
pub use self::key::{AlgorithmTag, KeyMaterial};
use crate::credential::{CredentialTemplate, VcClaims};
use crate::error::Error;

/// Signs credentials with a single, immutable key.
///
/// The service holds no mutable state and can be shared across concurrent
/// requests.
#[derive(Debug)]
pub struct SigningService {
    key: KeyMaterial,
    algorithm: Algorithm,
}

impl SigningService {
    /// Create a signing service for the key material.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAlgorithm`] when the key material does not
    /// map to a supported algorithm.
    pub fn new(key: KeyMaterial) -> Result<Self, Error> {
        let algorithm = resolve(&key)?;
        tracing::info!(%algorithm, key_id = ?key.key_id(), "signing service configured");
        Ok(Self { key, algorithm })
    }

    /// The algorithm every credential is signed with.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The signing key's DER-encoded `SubjectPublicKeyInfo`.
    #[must_use]
    pub fn public_key(&self) -> Option<&[u8]> {
        self.key.public_key()
    }

    /// The signing key's identifier.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key.key_id()
    }

    /// Sign the credential, returning a compact JWS.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the template is incomplete and
    /// [`Error::Signing`] if the cryptographic operation fails. No partial
    /// output is returned.
    pub fn sign(&self, template: CredentialTemplate) -> Result<String, Error> {
        let vc = template.build()?;
        let claims = VcClaims::from_vc(vc, Utc::now());
        let header = Header {
            alg: self.algorithm,
            typ: Some("JWT".to_string()),
            kid: self.key.key_id().map(ToString::to_string),
        };
        jws::sign(&header, &claims, self.key.private_key())
    }

    /// Verify a credential signed by this service, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the credential does not verify
    /// and [`Error::InvalidKey`] if the public key is not available.
    pub fn verify(&self, token: &str) -> Result<Value, Error> {
        let Some(public_key) = self.key.public_key() else {
            return Err(Error::InvalidKey("public key not available".into()));
        };
        jws::verify(token, public_key)
    }
}
