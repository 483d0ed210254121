//! # Test Keys
//!
//! PKCS#8 PEM keys for each supported key family, plus a P-256 key that no
//! signature algorithm accepts.

use credibil_vci_issuer::{Issuer, IssuerConfig, KeyMaterial, SigningService};

/// RSA-2048 private key.
pub const RSA: &str = include_str!("../data/keys/rsa.pem");

/// secp256k1 private key.
pub const SECP256K1: &str = include_str!("../data/keys/secp256k1.pem");

/// Ed25519 private key.
pub const ED25519: &str = include_str!("../data/keys/ed25519.pem");

/// P-256 private key (unsupported).
pub const P256: &str = include_str!("../data/keys/p256.pem");

/// Identifier of the issuer used throughout the tests.
pub const ISSUER_ID: &str = "http://localhost:8080";

/// Key identifier added to signed credentials.
pub const KEY_ID: &str = "did:web:localhost%3A8080#key-1";

/// Load a test key.
///
/// # Panics
///
/// Panics if the key cannot be decoded.
#[must_use]
pub fn key_material(pem: &str, scheme: Option<&str>) -> KeyMaterial {
    let key = KeyMaterial::from_pkcs8_pem(pem, Some(KEY_ID.to_string())).expect("should decode key");
    match scheme {
        Some(scheme) => key.with_scheme_hint(scheme),
        None => key,
    }
}

/// An issuer signing with the given key.
///
/// # Panics
///
/// Panics if the key is not supported.
#[must_use]
pub fn issuer(pem: &str, scheme: Option<&str>, expose_format_types: bool) -> Issuer {
    let signer = SigningService::new(key_material(pem, scheme)).expect("should create signer");
    let config = IssuerConfig {
        issuer: ISSUER_ID.to_string(),
        expose_format_types,
        credential_validity_secs: Some(365 * 24 * 60 * 60),
        ..IssuerConfig::default()
    };
    Issuer::with_signer(config, signer).expect("should create issuer")
}
