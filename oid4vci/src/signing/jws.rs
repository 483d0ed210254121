//! # JWS Compact Serialization
//!
//! Produces and verifies [RFC7515] compact JWS strings for each supported
//! [`Algorithm`]. Each algorithm has exactly one signing routine and one
//! verification routine, selected with an exhaustive `match`.
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515

use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::pkcs8::KeypairBytes;
use pkcs8::{DecodePrivateKey, DecodePublicKey};
use rand_core::OsRng;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey, pkcs1v15, pss};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::error::Error;
use crate::signing::algorithm::Algorithm;

/// The JWS protected header.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Header {
    /// The signature algorithm.
    pub alg: Algorithm,

    /// The media type of the complete JWS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Identifies the key used to sign the JWS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// Sign `payload` with the PKCS#8 `private_key`, returning a compact JWS.
///
/// # Errors
///
/// Returns [`Error::Signing`] if the key cannot be decoded for the algorithm
/// or the signature operation fails.
pub fn sign(
    header: &Header, payload: &impl Serialize, private_key: &[u8],
) -> Result<String, Error> {
    let header_json =
        serde_json::to_vec(header).map_err(|e| Error::signing("encoding JWS header", e))?;
    let payload_json =
        serde_json::to_vec(payload).map_err(|e| Error::signing("encoding JWS payload", e))?;

    let signing_input = format!(
        "{}.{}",
        Base64UrlUnpadded::encode_string(&header_json),
        Base64UrlUnpadded::encode_string(&payload_json)
    );
    let signature = sign_bytes(header.alg, signing_input.as_bytes(), private_key)?;

    Ok(format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(&signature)))
}

fn sign_bytes(alg: Algorithm, msg: &[u8], private_key: &[u8]) -> Result<Vec<u8>, Error> {
    match alg {
        Algorithm::Rs256 => {
            let key = RsaPrivateKey::from_pkcs8_der(private_key)
                .map_err(|e| Error::signing("decoding RSA key", e))?;
            let signer = pkcs1v15::SigningKey::<Sha256>::new(key);
            let signature = signer.try_sign(msg).map_err(|e| Error::signing("signing RS256", e))?;
            Ok(signature.to_vec())
        }
        Algorithm::Ps256 => {
            let key = RsaPrivateKey::from_pkcs8_der(private_key)
                .map_err(|e| Error::signing("decoding RSA key", e))?;
            let signer = pss::BlindedSigningKey::<Sha256>::new(key);
            let signature = signer
                .try_sign_with_rng(&mut OsRng, msg)
                .map_err(|e| Error::signing("signing PS256", e))?;
            Ok(signature.to_vec())
        }
        Algorithm::Es256K => {
            let secret = k256::SecretKey::from_pkcs8_der(private_key)
                .map_err(|e| Error::signing("decoding secp256k1 key", e))?;
            let signer = k256::ecdsa::SigningKey::from_bytes(&secret.to_bytes())
                .map_err(|e| Error::signing("decoding secp256k1 key", e))?;
            let signature: k256::ecdsa::Signature =
                signer.try_sign(msg).map_err(|e| Error::signing("signing ES256K", e))?;
            Ok(signature.to_bytes().to_vec())
        }
        Algorithm::EdDsa => {
            let bytes = KeypairBytes::from_pkcs8_der(private_key)
                .map_err(|e| Error::signing("decoding Ed25519 key", e))?;
            let signer = ed25519_dalek::SigningKey::from_bytes(&bytes.secret_key);
            let signature = signer.try_sign(msg).map_err(|e| Error::signing("signing EdDSA", e))?;
            Ok(signature.to_bytes().to_vec())
        }
    }
}

/// Decode the protected header of a compact JWS without verifying it.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] if the token is not a compact JWS or the
/// header names an unsupported algorithm.
pub fn decode_header(token: &str) -> Result<Header, Error> {
    let Some((header, _)) = token.split_once('.') else {
        return Err(Error::InvalidRequest("token is not a compact JWS".into()));
    };
    let bytes = Base64UrlUnpadded::decode_vec(header)
        .map_err(|e| Error::InvalidRequest(format!("decoding JWS header: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidRequest(format!("parsing JWS header: {e}")))
}

/// Verify a compact JWS with the DER-encoded `SubjectPublicKeyInfo`, using the
/// algorithm named in the token's header. Returns the decoded payload.
///
/// # Errors
///
/// Returns [`Error::InvalidRequest`] if the token is malformed or its
/// signature does not verify.
pub fn verify(token: &str, public_key: &[u8]) -> Result<Value, Error> {
    let header = decode_header(token)?;

    let parts: Vec<&str> = token.split('.').collect();
    let [header_b64, payload_b64, signature_b64] = parts.as_slice() else {
        return Err(Error::InvalidRequest("token is not a compact JWS".into()));
    };
    let signature = Base64UrlUnpadded::decode_vec(signature_b64)
        .map_err(|e| Error::InvalidRequest(format!("decoding signature: {e}")))?;
    let signing_input = format!("{header_b64}.{payload_b64}");

    verify_bytes(header.alg, signing_input.as_bytes(), &signature, public_key)
        .map_err(|e| Error::InvalidRequest(format!("{} signature invalid: {e}", header.alg)))?;

    let payload = Base64UrlUnpadded::decode_vec(payload_b64)
        .map_err(|e| Error::InvalidRequest(format!("decoding payload: {e}")))?;
    serde_json::from_slice(&payload)
        .map_err(|e| Error::InvalidRequest(format!("parsing payload: {e}")))
}

fn verify_bytes(
    alg: Algorithm, msg: &[u8], signature: &[u8], public_key: &[u8],
) -> anyhow::Result<()> {
    match alg {
        Algorithm::Rs256 => {
            let key = RsaPublicKey::from_public_key_der(public_key)?;
            let signature = pkcs1v15::Signature::try_from(signature)?;
            pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(msg, &signature)?;
        }
        Algorithm::Ps256 => {
            let key = RsaPublicKey::from_public_key_der(public_key)?;
            let signature = pss::Signature::try_from(signature)?;
            pss::VerifyingKey::<Sha256>::new(key).verify(msg, &signature)?;
        }
        Algorithm::Es256K => {
            let key = k256::ecdsa::VerifyingKey::from_public_key_der(public_key)?;
            let signature = k256::ecdsa::Signature::from_slice(signature)?;
            key.verify(msg, &signature)?;
        }
        Algorithm::EdDsa => {
            let key = ed25519_dalek::VerifyingKey::from_public_key_der(public_key)?;
            let signature = ed25519_dalek::Signature::from_slice(signature)?;
            key.verify(msg, &signature)?;
        }
    }
    Ok(())
}
