//! # Algorithm Resolution
//!
//! Maps key material to exactly one signature algorithm. Resolution is static:
//! it depends only on the key family and the configured scheme hint.
//!
//! | Key family      | Scheme hint          | Algorithm |
//! |-----------------|----------------------|-----------|
//! | RSA             | `ps256` (any case)   | `PS256`   |
//! | RSA             | anything else / none | `RS256`   |
//! | EC secp256k1    | none or `es256k`     | `ES256K`  |
//! | Ed25519         | none or `eddsa`      | `EdDSA`   |
//!
//! Everything else fails with [`Error::UnsupportedAlgorithm`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::signing::key::{AlgorithmTag, CURVE_ED25519, CURVE_SECP256K1, KeyMaterial};

/// Supported JWS signature algorithms.
///
/// The set is closed: adding a variant requires every dispatch site to be
/// updated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Algorithm {
    /// RSASSA-PSS using SHA-256 (RSA keys).
    #[serde(rename = "PS256")]
    Ps256,

    /// RSASSA-PKCS1-v1_5 using SHA-256 (RSA keys).
    #[serde(rename = "RS256")]
    Rs256,

    /// ECDSA using secp256k1 and SHA-256.
    #[serde(rename = "ES256K")]
    Es256K,

    /// `EdDSA` using Ed25519.
    #[serde(rename = "EdDSA")]
    EdDsa,
}

impl Algorithm {
    /// The JWS `alg` header value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ps256 => "PS256",
            Self::Rs256 => "RS256",
            Self::Es256K => "ES256K",
            Self::EdDsa => "EdDSA",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PS256" => Ok(Self::Ps256),
            "RS256" => Ok(Self::Rs256),
            "ES256K" => Ok(Self::Es256K),
            "EdDSA" => Ok(Self::EdDsa),
            _ => Err(Error::UnsupportedAlgorithm(format!("`{s}` is not a supported JWS algorithm"))),
        }
    }
}

/// Resolve the signature algorithm for the key material.
///
/// # Errors
///
/// Returns [`Error::UnsupportedAlgorithm`] when the key family or curve is not
/// supported, or when a scheme hint on a non-RSA key names a different
/// algorithm.
pub fn resolve(key: &KeyMaterial) -> Result<Algorithm, Error> {
    let hint = key.scheme_hint();

    let algorithm = match key.algorithm_tag() {
        AlgorithmTag::Rsa => {
            if hint.is_some_and(|h| h.eq_ignore_ascii_case("ps256")) {
                return Ok(Algorithm::Ps256);
            }
            return Ok(Algorithm::Rs256);
        }
        AlgorithmTag::Ec(curve) if curve == CURVE_SECP256K1 => Algorithm::Es256K,
        AlgorithmTag::EdDsa(curve) if curve == CURVE_ED25519 => Algorithm::EdDsa,
        tag @ (AlgorithmTag::Ec(_) | AlgorithmTag::EdDsa(_) | AlgorithmTag::Other(_)) => {
            return Err(Error::UnsupportedAlgorithm(format!("no algorithm for {tag} keys")));
        }
    };

    if let Some(hint) = hint
        && !hint.eq_ignore_ascii_case(algorithm.as_str())
    {
        return Err(Error::UnsupportedAlgorithm(format!(
            "scheme `{hint}` cannot be used with {} keys",
            key.algorithm_tag()
        )));
    }

    Ok(algorithm)
}
