//! # Key Material
//!
//! Signing keys are supplied as PKCS#8 documents. The key's algorithm family
//! is read from the PKCS#8 `AlgorithmIdentifier` and recorded as an
//! [`AlgorithmTag`], which is the only input (besides an optional scheme
//! hint) used to choose a signature algorithm.

use std::fmt;
use std::path::Path;

use ed25519_dalek::pkcs8::KeypairBytes;
use pkcs8::der::pem::PemLabel;
use pkcs8::{DecodePrivateKey, EncodePublicKey, ObjectIdentifier, PrivateKeyInfo, SecretDocument};
use rsa::RsaPrivateKey;
use zeroize::Zeroizing;

use crate::error::Error;

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
const ED448: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.113");

const SECP256K1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");
const P256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const P384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const P521: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

/// Curve name for secp256k1 keys.
pub const CURVE_SECP256K1: &str = "secp256k1";

/// Curve name for Ed25519 keys.
pub const CURVE_ED25519: &str = "Ed25519";

/// The key family, derived from the key's encoding.
///
/// Used for algorithm dispatch only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AlgorithmTag {
    /// An RSA key.
    Rsa,

    /// An elliptic curve key on the named curve.
    Ec(String),

    /// An Edwards-curve key (`Ed25519` or `Ed448`).
    EdDsa(String),

    /// Any other key type, identified by its algorithm OID.
    Other(String),
}

impl fmt::Display for AlgorithmTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => write!(f, "RSA"),
            Self::Ec(curve) => write!(f, "EC-{curve}"),
            Self::EdDsa(curve) => write!(f, "{curve}"),
            Self::Other(oid) => write!(f, "{oid}"),
        }
    }
}

impl AlgorithmTag {
    fn from_pkcs8(info: &PrivateKeyInfo<'_>) -> Self {
        let oid = info.algorithm.oid;
        if oid == RSA_ENCRYPTION {
            Self::Rsa
        } else if oid == ED25519 {
            Self::EdDsa(CURVE_ED25519.to_string())
        } else if oid == ED448 {
            Self::EdDsa("Ed448".to_string())
        } else if oid == EC_PUBLIC_KEY {
            let curve = match info.algorithm.parameters_oid() {
                Ok(curve) if curve == SECP256K1 => CURVE_SECP256K1.to_string(),
                Ok(curve) if curve == P256 => "P-256".to_string(),
                Ok(curve) if curve == P384 => "P-384".to_string(),
                Ok(curve) if curve == P521 => "P-521".to_string(),
                Ok(curve) => curve.to_string(),
                Err(_) => "unnamed".to_string(),
            };
            Self::Ec(curve)
        } else {
            Self::Other(oid.to_string())
        }
    }
}

/// A private/public key pair used to sign credentials.
///
/// Constructed once when the issuer is configured and immutable thereafter.
pub struct KeyMaterial {
    private_key: Zeroizing<Vec<u8>>,
    public_key: Option<Vec<u8>>,
    key_id: Option<String>,
    algorithm_tag: AlgorithmTag,
    scheme_hint: Option<String>,
}

impl KeyMaterial {
    /// Load key material from a PKCS#8 file, PEM or DER encoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the file cannot be read or does not
    /// contain a PKCS#8 private key.
    pub fn load(path: impl AsRef<Path>, key_id: Option<String>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::InvalidKey(format!("reading {}: {e}", path.display())))?;

        if bytes.starts_with(b"-----BEGIN") {
            let pem = std::str::from_utf8(&bytes)
                .map_err(|e| Error::InvalidKey(format!("PEM is not UTF-8: {e}")))?;
            Self::from_pkcs8_pem(pem, key_id)
        } else {
            Self::from_pkcs8_der(&bytes, key_id)
        }
    }

    /// Create key material from a PEM-encoded PKCS#8 private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the PEM document is not a PKCS#8
    /// private key.
    pub fn from_pkcs8_pem(pem: &str, key_id: Option<String>) -> Result<Self, Error> {
        let (label, doc) = SecretDocument::from_pem(pem)
            .map_err(|e| Error::InvalidKey(format!("decoding PEM: {e}")))?;
        if label != PrivateKeyInfo::PEM_LABEL {
            return Err(Error::InvalidKey(format!("unexpected PEM label `{label}`")));
        }
        Self::from_pkcs8_der(doc.as_bytes(), key_id)
    }

    /// Create key material from a DER-encoded PKCS#8 private key.
    ///
    /// The public key is derived for supported key families. Keys of other
    /// families are accepted here and rejected when a signing service is
    /// configured with them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the document is not a PKCS#8 private
    /// key or the key it holds is malformed.
    pub fn from_pkcs8_der(der: &[u8], key_id: Option<String>) -> Result<Self, Error> {
        let info = PrivateKeyInfo::try_from(der)
            .map_err(|e| Error::InvalidKey(format!("decoding PKCS#8: {e}")))?;
        let algorithm_tag = AlgorithmTag::from_pkcs8(&info);
        let public_key = derive_public_key(&algorithm_tag, der)?;

        Ok(Self {
            private_key: Zeroizing::new(der.to_vec()),
            public_key,
            key_id,
            algorithm_tag,
            scheme_hint: None,
        })
    }

    /// Set the signature scheme hint (for example, `"PS256"` for RSA keys).
    #[must_use]
    pub fn with_scheme_hint(mut self, hint: impl Into<String>) -> Self {
        self.scheme_hint = Some(hint.into());
        self
    }

    /// The key family derived from the key encoding.
    #[must_use]
    pub const fn algorithm_tag(&self) -> &AlgorithmTag {
        &self.algorithm_tag
    }

    /// The key identifier echoed into signed artifacts.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// The configured signature scheme hint.
    #[must_use]
    pub fn scheme_hint(&self) -> Option<&str> {
        self.scheme_hint.as_deref()
    }

    /// The DER-encoded `SubjectPublicKeyInfo`, when it could be derived.
    #[must_use]
    pub fn public_key(&self) -> Option<&[u8]> {
        self.public_key.as_deref()
    }

    /// The DER-encoded PKCS#8 private key.
    pub(crate) fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_id", &self.key_id)
            .field("algorithm_tag", &self.algorithm_tag)
            .field("scheme_hint", &self.scheme_hint)
            .finish_non_exhaustive()
    }
}

fn derive_public_key(tag: &AlgorithmTag, der: &[u8]) -> Result<Option<Vec<u8>>, Error> {
    let invalid = |e: &dyn fmt::Display| Error::InvalidKey(format!("{tag} key: {e}"));

    let spki = match tag {
        AlgorithmTag::Rsa => {
            let key = RsaPrivateKey::from_pkcs8_der(der).map_err(|e| invalid(&e))?;
            key.to_public_key().to_public_key_der().map_err(|e| invalid(&e))?
        }
        AlgorithmTag::Ec(curve) if curve == CURVE_SECP256K1 => {
            let key = k256::SecretKey::from_pkcs8_der(der).map_err(|e| invalid(&e))?;
            key.public_key().to_public_key_der().map_err(|e| invalid(&e))?
        }
        AlgorithmTag::EdDsa(curve) if curve == CURVE_ED25519 => {
            let bytes = KeypairBytes::from_pkcs8_der(der).map_err(|e| invalid(&e))?;
            let signing_key = ed25519_dalek::SigningKey::from_bytes(&bytes.secret_key);
            signing_key.verifying_key().to_public_key_der().map_err(|e| invalid(&e))?
        }
        AlgorithmTag::Ec(_) | AlgorithmTag::EdDsa(_) | AlgorithmTag::Other(_) => return Ok(None),
    };

    Ok(Some(spki.as_bytes().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA: &str = include_str!("../../../crates/test-utils/data/keys/rsa.pem");
    const SECP256K1_KEY: &str = include_str!("../../../crates/test-utils/data/keys/secp256k1.pem");
    const ED25519_KEY: &str = include_str!("../../../crates/test-utils/data/keys/ed25519.pem");
    const P256_KEY: &str = include_str!("../../../crates/test-utils/data/keys/p256.pem");

    #[test]
    fn tags() {
        let tag = |pem| KeyMaterial::from_pkcs8_pem(pem, None).expect("should load").algorithm_tag;

        assert_eq!(tag(RSA).to_string(), "RSA");
        assert_eq!(tag(SECP256K1_KEY).to_string(), "EC-secp256k1");
        assert_eq!(tag(ED25519_KEY).to_string(), "Ed25519");
        assert_eq!(tag(P256_KEY).to_string(), "EC-P-256");
    }

    #[test]
    fn public_key_derived() {
        let key = KeyMaterial::from_pkcs8_pem(ED25519_KEY, Some("key-1".into())).unwrap();
        assert!(key.public_key().is_some());
        assert_eq!(key.key_id(), Some("key-1"));

        // unsupported curves load, but carry no public key
        let key = KeyMaterial::from_pkcs8_pem(P256_KEY, None).unwrap();
        assert!(key.public_key().is_none());
    }

    #[test]
    fn debug_hides_key() {
        let key = KeyMaterial::from_pkcs8_pem(SECP256K1_KEY, None).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("Ec(\"secp256k1\")"));
        assert!(!debug.contains("private_key"));
    }

    #[test]
    fn not_a_key() {
        let err = KeyMaterial::from_pkcs8_der(b"not a key", None).unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)));

        let pem = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        assert!(KeyMaterial::from_pkcs8_pem(pem, None).is_err());
    }
}
