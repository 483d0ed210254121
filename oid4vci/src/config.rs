//! # Issuer Configuration
//!
//! Typed configuration for an issuer instance, validated once when loaded.
//!
//! ```json
//! {
//!     "issuer": "https://issuer.io",
//!     "signing": {
//!         "key_path": "keys/rsa.pem",
//!         "key_id": "did:web:issuer.io#key-1",
//!         "signature_scheme": "PS256"
//!     },
//!     "expose_format_types": true
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::signing::KeyMaterial;

/// Issuer configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuerConfig {
    /// The issuer identifier (URL), used as the credential `issuer`.
    pub issuer: String,

    /// The credential endpoint. Defaults to `<issuer>/credential`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_endpoint: Option<String>,

    /// The signing key.
    pub signing: KeyConfig,

    /// Include the supported credential types, grouped by encoding, in the
    /// discovery document.
    #[serde(default)]
    pub expose_format_types: bool,

    /// How long issued credentials remain valid. Credentials do not expire
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_validity_secs: Option<u64>,
}

/// Signing key configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct KeyConfig {
    /// Path to a PKCS#8 private key, PEM or DER encoded.
    pub key_path: PathBuf,

    /// Key identifier added to signed credentials as `kid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// RSA signature scheme. `PS256` selects RSA-PSS, anything else
    /// RSASSA-PKCS1-v1_5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_scheme: Option<String>,
}

impl IssuerConfig {
    /// Read and validate configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the file cannot be read or parsed
    /// or the configuration is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Configuration(format!("reading {}: {e}", path.display())))?;
        let config: Self = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Configuration(format!("parsing {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        if !is_http_url(&self.issuer) {
            return Err(Error::Configuration(format!(
                "issuer must be an http(s) URL, not `{}`",
                self.issuer
            )));
        }
        if let Some(endpoint) = &self.credential_endpoint
            && !is_http_url(endpoint)
        {
            return Err(Error::Configuration(format!(
                "credential_endpoint must be an http(s) URL, not `{endpoint}`"
            )));
        }
        if self.credential_validity_secs == Some(0) {
            return Err(Error::Configuration("credential_validity_secs must be positive".into()));
        }
        if self.credential_validity_secs.is_some_and(|secs| i64::try_from(secs).is_err()) {
            return Err(Error::Configuration("credential_validity_secs is too large".into()));
        }
        if self.signing.key_path.as_os_str().is_empty() {
            return Err(Error::Configuration("signing.key_path is required".into()));
        }
        Ok(())
    }

    /// The credential endpoint URL.
    #[must_use]
    pub fn credential_endpoint(&self) -> String {
        self.credential_endpoint
            .clone()
            .unwrap_or_else(|| format!("{}/credential", self.issuer.trim_end_matches('/')))
    }

    /// The validity period of issued credentials.
    #[must_use]
    pub fn credential_validity(&self) -> Option<TimeDelta> {
        self.credential_validity_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(TimeDelta::try_seconds)
    }
}

impl KeyConfig {
    /// Load the configured key material.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the key cannot be read or decoded.
    pub fn load(&self) -> Result<KeyMaterial, Error> {
        let key = KeyMaterial::load(&self.key_path, self.key_id.clone())?;
        Ok(match &self.signature_scheme {
            Some(scheme) => key.with_scheme_hint(scheme),
            None => key,
        })
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://"));
    rest.is_some_and(|host| !host.is_empty())
}
