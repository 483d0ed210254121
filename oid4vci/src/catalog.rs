//! # Supported Credential Catalog
//!
//! Clients declare the credentials they may be issued using attributes of the
//! form:
//!
//! ```text
//! vctypes.<format> = ["TypeA", "TypeB"]
//! vctypes.<format> = TypeA,TypeB
//! ```
//!
//! The catalog is the de-duplicated set of `(format, types)` pairs declared
//! across all clients. It is recomputed on every request. Malformed
//! attributes are skipped, never failing the request.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::ClientConfig;

/// Prefix of client attributes declaring issuable credential types.
pub const VC_TYPES_PREFIX: &str = "vctypes.";

/// Credential encodings.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    /// W3C credential secured with a linked-data proof.
    #[serde(rename = "ldp_vc")]
    LdpVc,

    /// W3C credential secured as a compact JWT.
    #[serde(rename = "jwt_vc")]
    JwtVc,

    /// W3C credential secured as a JWT, not using JSON-LD.
    #[serde(rename = "jwt_vc_json")]
    JwtVcJson,

    /// W3C credential secured as a JWT, using JSON-LD.
    #[serde(rename = "jwt_vc_json-ld")]
    JwtVcJsonLd,
}

impl Format {
    /// The format identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LdpVc => "ldp_vc",
            Self::JwtVc => "jwt_vc",
            Self::JwtVcJson => "jwt_vc_json",
            Self::JwtVcJsonLd => "jwt_vc_json-ld",
        }
    }

    /// Whether credentials in this format are JWT-encoded.
    #[must_use]
    pub const fn is_jwt(&self) -> bool {
        match self {
            Self::LdpVc => false,
            Self::JwtVc | Self::JwtVcJson | Self::JwtVcJsonLd => true,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ldp_vc" => Ok(Self::LdpVc),
            "jwt_vc" => Ok(Self::JwtVc),
            "jwt_vc_json" => Ok(Self::JwtVcJson),
            "jwt_vc_json-ld" => Ok(Self::JwtVcJsonLd),
            _ => Err(Error::UnsupportedCredentialFormat(s.to_string())),
        }
    }
}

/// A credential the issuer can produce: a format and a set of types.
///
/// Equality is by `(format, types)`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SupportedCredential {
    /// The credential format.
    pub format: Format,

    /// The credential types.
    pub types: BTreeSet<String>,
}

impl SupportedCredential {
    /// Create a supported credential.
    pub fn new<T: Into<String>>(format: Format, types: impl IntoIterator<Item = T>) -> Self {
        Self {
            format,
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a credential of `format` with every one of `types` may be
    /// issued under this entry.
    #[must_use]
    pub fn covers(&self, format: Format, types: &[String]) -> bool {
        self.format == format && types.iter().all(|t| self.types.contains(t))
    }
}

/// Parse a single client attribute into a supported credential.
///
/// Returns `Ok(None)` when the attribute declares no types.
///
/// # Errors
///
/// Returns [`Error::CatalogParse`] when the key does not name a known format
/// or the value cannot be parsed.
pub fn parse_attribute(key: &str, value: &str) -> Result<Option<SupportedCredential>, Error> {
    let parse_error = |reason: String| Error::CatalogParse {
        key: key.to_string(),
        reason,
    };

    let Some(format) = key.strip_prefix(VC_TYPES_PREFIX) else {
        return Err(parse_error(format!("missing `{VC_TYPES_PREFIX}` prefix")));
    };
    let format = Format::from_str(format).map_err(|e| parse_error(e.to_string()))?;

    let value = value.trim();
    let types: Vec<String> = if value.starts_with('[') {
        serde_json::from_str(value).map_err(|e| parse_error(e.to_string()))?
    } else {
        value.split(',').map(ToString::to_string).collect()
    };

    let types: BTreeSet<String> =
        types.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).map(ToString::to_string).collect();
    if types.is_empty() {
        return Ok(None);
    }

    Ok(Some(SupportedCredential { format, types }))
}

/// Collect the credentials declared by `clients`.
///
/// The result does not depend on the order of `clients`. Clients without
/// attributes and malformed attributes contribute nothing.
pub fn catalog<'a>(clients: impl IntoIterator<Item = &'a ClientConfig>) -> BTreeSet<SupportedCredential> {
    clients
        .into_iter()
        .filter_map(|client| client.attributes.as_ref().map(|attrs| (client, attrs)))
        .flat_map(|(client, attrs)| attrs.iter().map(move |(k, v)| (&client.client_id, k, v)))
        .filter(|(_, key, _)| key.starts_with(VC_TYPES_PREFIX))
        .filter_map(|(client_id, key, value)| match parse_attribute(key, value) {
            Ok(supported) => supported,
            Err(e) => {
                tracing::warn!(client_id, "skipping credential attribute: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn client(id: &str, attrs: &[(&str, &str)]) -> ClientConfig {
        ClientConfig {
            client_id: id.to_string(),
            attributes: Some(
                attrs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
            ),
        }
    }

    #[test]
    fn two_clients() {
        let a = client("a", &[("vctypes.ldp_vc", r#"["DiplomaCredential"]"#)]);
        let b =
            client("b", &[("vctypes.jwt_vc", r#"["DiplomaCredential","ProofOfAge"]"#)]);

        let supported = catalog(&[a, b]);
        let expected = BTreeSet::from([
            SupportedCredential::new(Format::LdpVc, ["DiplomaCredential"]),
            SupportedCredential::new(Format::JwtVc, ["DiplomaCredential", "ProofOfAge"]),
        ]);
        assert_eq!(supported, expected);
    }

    #[test]
    fn order_independent() {
        let clients = vec![
            client("a", &[("vctypes.ldp_vc", "A"), ("vctypes.jwt_vc", "A,B")]),
            client("b", &[("vctypes.jwt_vc", r#"["B", "A"]"#)]),
            client("c", &[("vctypes.jwt_vc_json", "C"), ("other", "x")]),
            ClientConfig {
                client_id: "d".into(),
                attributes: None,
            },
        ];
        let expected = catalog(&clients);
        assert_eq!(expected.len(), 3);

        let mut reversed = clients.clone();
        reversed.reverse();
        assert_eq!(catalog(&reversed), expected);

        let mut rotated = clients;
        rotated.rotate_left(2);
        assert_eq!(catalog(&rotated), expected);
        assert_eq!(catalog(&rotated), catalog(&rotated));
    }

    #[test]
    fn duplicates_collapse() {
        let a = client("a", &[("vctypes.jwt_vc", "A, B")]);
        let b = client("b", &[("vctypes.jwt_vc", r#"["B","A","A"]"#)]);
        let supported = catalog(&[a, b]);
        assert_eq!(supported.len(), 1);
    }

    // Malformed entries are skipped; the remaining entries are kept.
    #[test]
    fn malformed_skipped() {
        let a = client(
            "a",
            &[
                ("vctypes.mso_mdoc", "A"),
                ("vctypes.jwt_vc", r#"["unterminated""#),
                ("vctypes.ldp_vc", "   "),
                ("vctypes.ldp_vc_extra", "A"),
                ("vctypes.jwt_vc_json-ld", "Good"),
            ],
        );
        let supported = catalog(&[a]);
        assert_eq!(
            supported,
            BTreeSet::from([SupportedCredential::new(Format::JwtVcJsonLd, ["Good"])])
        );
    }

    #[test]
    fn no_attributes() {
        let clients = [ClientConfig {
            client_id: "a".into(),
            attributes: None,
        }];
        assert!(catalog(&clients).is_empty());

        let empty = ClientConfig {
            client_id: "b".into(),
            attributes: Some(HashMap::new()),
        };
        assert!(catalog([&empty]).is_empty());
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            parse_attribute("vctypes.cbor", "A"),
            Err(Error::CatalogParse { key, .. }) if key == "vctypes.cbor"
        ));
        assert!(parse_attribute("vctypes.jwt_vc", "[1, 2]").is_err());
        assert_eq!(parse_attribute("vctypes.jwt_vc", "[]").unwrap(), None);
    }

    #[test]
    fn covers() {
        let supported = SupportedCredential::new(Format::JwtVc, ["A", "B"]);
        assert!(supported.covers(Format::JwtVc, &["A".to_string()]));
        assert!(supported.covers(Format::JwtVc, &["B".to_string(), "A".to_string()]));
        assert!(!supported.covers(Format::LdpVc, &["A".to_string()]));
        assert!(!supported.covers(Format::JwtVc, &["C".to_string()]));
    }
}
