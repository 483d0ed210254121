//! # Well-Known Discovery Document
//!
//! Extends the host's base `OpenID` Connect discovery document with the
//! metadata needed for credential issuance:
//!
//! - the pre-authorized code grant is appended to `grant_types_supported`,
//! - `credential_endpoint` is set,
//! - the supported credential types are grouped by encoding.
//!
//! Every other field of the base document is passed through unchanged.
//!
//! The grouped types are always computed. They are only serialized (under
//! `credentials_supported`) when [`DiscoveryDocument::expose_format_types`]
//! is enabled.

use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::catalog::SupportedCredential;

/// The pre-authorized code grant type.
pub const PRE_AUTHORIZED_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:pre-authorized_code";

const GRANT_TYPES_SUPPORTED: &str = "grant_types_supported";
const CREDENTIAL_ENDPOINT: &str = "credential_endpoint";
const CREDENTIALS_SUPPORTED: &str = "credentials_supported";

/// The credential types supported for one encoding.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FormatObject {
    /// Supported types, sorted and without duplicates.
    pub types: Vec<String>,
}

impl FormatObject {
    fn from_types<'a>(types: impl IntoIterator<Item = &'a String>) -> Self {
        let types: BTreeSet<&String> = types.into_iter().collect();
        Self {
            types: types.into_iter().cloned().collect(),
        }
    }
}

/// The issuer's discovery document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiscoveryDocument {
    /// The base document, augmented with `grant_types_supported` and
    /// `credential_endpoint`.
    pub metadata: Map<String, Value>,

    /// Types supported as linked-data-proof credentials (`ldp_vc`).
    pub ldp_vc: FormatObject,

    /// Types supported as JWT-encoded credentials.
    pub jwt_vc: FormatObject,

    expose_format_types: bool,
}

impl DiscoveryDocument {
    /// Whether the grouped credential types are included when the document is
    /// serialized. Defaults to `false`.
    #[must_use]
    pub const fn expose_format_types(mut self, expose: bool) -> Self {
        self.expose_format_types = expose;
        self
    }

    /// The grant types the issuer supports.
    #[must_use]
    pub fn grant_types_supported(&self) -> Vec<&str> {
        self.metadata
            .get(GRANT_TYPES_SUPPORTED)
            .and_then(Value::as_array)
            .map(|grants| grants.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// The issuer's credential endpoint.
    #[must_use]
    pub fn credential_endpoint(&self) -> Option<&str> {
        self.metadata.get(CREDENTIAL_ENDPOINT).and_then(Value::as_str)
    }
}

#[derive(Serialize)]
struct Supported<'a> {
    ldp_vc: &'a FormatObject,
    jwt_vc: &'a FormatObject,
}

impl Serialize for DiscoveryDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (k, v) in &self.metadata {
            if self.expose_format_types && k == CREDENTIALS_SUPPORTED {
                continue;
            }
            map.serialize_entry(k, v)?;
        }
        if self.expose_format_types {
            map.serialize_entry(
                CREDENTIALS_SUPPORTED,
                &Supported {
                    ldp_vc: &self.ldp_vc,
                    jwt_vc: &self.jwt_vc,
                },
            )?;
        }
        map.end()
    }
}

/// Build the discovery document from the host's base document.
///
/// An absent (or non-array) `grant_types_supported` is treated as empty. The
/// pre-authorized code grant is appended only when the base does not already
/// list it, so a base document that carries the grant never advertises it
/// twice.
#[must_use]
pub fn build(
    base: Map<String, Value>, catalog: &BTreeSet<SupportedCredential>, credential_endpoint: &str,
) -> DiscoveryDocument {
    let mut metadata = base;

    let mut grants = match metadata.remove(GRANT_TYPES_SUPPORTED) {
        Some(Value::Array(grants)) => grants,
        Some(other) => {
            tracing::warn!("ignoring non-array {GRANT_TYPES_SUPPORTED}: {other}");
            vec![]
        }
        None => vec![],
    };
    if !grants.iter().any(|g| g.as_str() == Some(PRE_AUTHORIZED_CODE_GRANT)) {
        grants.push(Value::String(PRE_AUTHORIZED_CODE_GRANT.to_string()));
    }
    metadata.insert(GRANT_TYPES_SUPPORTED.to_string(), Value::Array(grants));
    metadata.insert(CREDENTIAL_ENDPOINT.to_string(), Value::String(credential_endpoint.to_string()));

    let (ldp, jwt): (Vec<&SupportedCredential>, Vec<&SupportedCredential>) =
        catalog.iter().partition(|sc| !sc.format.is_jwt());
    tracing::debug!(ldp = ldp.len(), jwt = jwt.len(), "grouped supported credentials");

    DiscoveryDocument {
        metadata,
        ldp_vc: FormatObject::from_types(ldp.iter().flat_map(|sc| &sc.types)),
        jwt_vc: FormatObject::from_types(jwt.iter().flat_map(|sc| &sc.types)),
        expose_format_types: false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog::Format;

    fn base(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else { panic!("should be an object") };
        map
    }

    fn catalog() -> BTreeSet<SupportedCredential> {
        BTreeSet::from([
            SupportedCredential::new(Format::LdpVc, ["DiplomaCredential"]),
            SupportedCredential::new(Format::JwtVc, ["ProofOfAge", "DiplomaCredential"]),
            SupportedCredential::new(Format::JwtVcJson, ["DiplomaCredential", "Membership"]),
        ])
    }

    #[test]
    fn no_grant_types() {
        let doc = build(Map::new(), &BTreeSet::new(), "https://issuer.io/credential");
        assert_eq!(doc.grant_types_supported(), vec![PRE_AUTHORIZED_CODE_GRANT]);
        assert_eq!(doc.credential_endpoint(), Some("https://issuer.io/credential"));
    }

    #[test]
    fn passthrough() {
        let base = base(json!({
            "issuer": "https://issuer.io",
            "grant_types_supported": ["authorization_code", "refresh_token"],
            "scopes_supported": ["openid"],
        }));
        let doc = build(base, &catalog(), "https://issuer.io/credential");

        assert_eq!(
            doc.grant_types_supported(),
            vec!["authorization_code", "refresh_token", PRE_AUTHORIZED_CODE_GRANT]
        );
        assert_eq!(doc.metadata["issuer"], "https://issuer.io");
        assert_eq!(doc.metadata["scopes_supported"], json!(["openid"]));
    }

    #[test]
    fn grant_appended_once() {
        let base = base(json!({ "grant_types_supported": [PRE_AUTHORIZED_CODE_GRANT] }));
        let doc = build(base, &catalog(), "https://issuer.io/credential");
        assert_eq!(doc.grant_types_supported(), vec![PRE_AUTHORIZED_CODE_GRANT]);
    }

    #[test]
    fn buckets() {
        let doc = build(Map::new(), &catalog(), "https://issuer.io/credential");
        assert_eq!(doc.ldp_vc.types, vec!["DiplomaCredential"]);
        assert_eq!(doc.jwt_vc.types, vec!["DiplomaCredential", "Membership", "ProofOfAge"]);
    }

    // Buckets are held on the document but only serialized when exposed.
    #[test]
    fn serialized_buckets() {
        let doc = build(Map::new(), &catalog(), "https://issuer.io/credential");

        let hidden = serde_json::to_value(&doc).unwrap();
        assert!(hidden.get("credentials_supported").is_none());
        assert_eq!(hidden["credential_endpoint"], "https://issuer.io/credential");

        let shown = serde_json::to_value(doc.expose_format_types(true)).unwrap();
        assert_eq!(
            shown["credentials_supported"],
            json!({
                "ldp_vc": { "types": ["DiplomaCredential"] },
                "jwt_vc": { "types": ["DiplomaCredential", "Membership", "ProofOfAge"] },
            })
        );
    }
}
