//! # Verifiable Credential Templates
//!
//! A [`CredentialTemplate`] is the unsigned, builder-style form of a W3C
//! Verifiable Credential. Claim mappers add to it during composition; it is
//! frozen into a [`VerifiableCredential`] immediately before signing.

use chrono::serde::{ts_seconds, ts_seconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, invalid};

/// The base W3C credentials `@context`.
pub const BASE_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// The base credential type every credential carries.
pub const BASE_TYPE: &str = "VerifiableCredential";

/// Unsigned credential under construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialTemplate {
    context: Vec<String>,
    id: Option<String>,
    type_: Vec<String>,
    issuer: String,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    subject: CredentialSubject,
}

impl Default for CredentialTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialTemplate {
    /// A template carrying only the base context and type.
    #[must_use]
    pub fn new() -> Self {
        Self {
            context: vec![BASE_CONTEXT.to_string()],
            id: None,
            type_: vec![BASE_TYPE.to_string()],
            issuer: String::new(),
            valid_from: None,
            valid_until: None,
            subject: CredentialSubject::default(),
        }
    }

    /// Sets the `id` property.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the `issuer` property.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Adds a `@context` entry, ignoring duplicates.
    #[must_use]
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        if !self.context.contains(&context) {
            self.context.push(context);
        }
        self
    }

    /// Adds a credential type, ignoring duplicates.
    #[must_use]
    pub fn add_type(mut self, type_: impl Into<String>) -> Self {
        let type_ = type_.into();
        if !self.type_.contains(&type_) {
            self.type_.push(type_);
        }
        self
    }

    /// Sets the `validFrom` property.
    #[must_use]
    pub fn valid_from(mut self, valid_from: DateTime<Utc>) -> Self {
        self.valid_from = Some(valid_from);
        self
    }

    /// Sets the `validUntil` property.
    #[must_use]
    pub fn valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    /// Sets the credential subject's `id`.
    #[must_use]
    pub fn subject_id(mut self, id: impl Into<String>) -> Self {
        self.subject.id = Some(id.into());
        self
    }

    /// Sets a credential subject claim, replacing any previous value.
    #[must_use]
    pub fn claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.subject.claims.insert(name.into(), value);
        self
    }

    /// The credential types, base type first.
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.type_
    }

    /// The `@context` entries, base context first.
    #[must_use]
    pub fn contexts(&self) -> &[String] {
        &self.context
    }

    /// The credential subject.
    #[must_use]
    pub const fn subject(&self) -> &CredentialSubject {
        &self.subject
    }

    pub(crate) fn subject_mut(&mut self) -> &mut CredentialSubject {
        &mut self.subject
    }

    /// Freeze the template into a credential ready for signing.
    ///
    /// A credential `id` (`urn:uuid:...`) is generated when none was set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when the issuer is missing, the
    /// subject is empty, or the validity period is inverted.
    pub fn build(self) -> Result<VerifiableCredential, Error> {
        if self.issuer.is_empty() {
            return Err(invalid!("credential has no issuer"));
        }
        if self.subject.id.is_none() && self.subject.claims.is_empty() {
            return Err(invalid!("credential subject is empty"));
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until)
            && until < from
        {
            return Err(invalid!("validUntil {} precedes validFrom {}", until, from));
        }

        Ok(VerifiableCredential {
            context: self.context,
            id: self.id.unwrap_or_else(|| format!("urn:uuid:{}", uuid::Uuid::new_v4())),
            type_: self.type_,
            issuer: self.issuer,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            credential_subject: self.subject,
        })
    }
}

/// Claims about the credential's subject.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialSubject {
    /// A URI that uniquely identifies the subject of the claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Claims about the subject.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

/// A frozen W3C Verifiable Credential, the payload of a `jwt_vc`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// JSON-LD contexts, base context first.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The credential identifier.
    pub id: String,

    /// Credential types, base type first.
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// The issuer identifier.
    pub issuer: String,

    /// The date-time the credential becomes valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// The date-time the credential ceases to be valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,

    /// The credential subject.
    pub credential_subject: CredentialSubject,
}

/// Claims used for Verifiable Credential issuance when format is `jwt_vc`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VcClaims {
    /// The `issuer` property of the Credential.
    pub iss: String,

    /// The Holder ID the Credential is intended for, taken from the
    /// `credentialSubject.id` property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// The time the credential was signed.
    #[serde(with = "ts_seconds")]
    pub iat: DateTime<Utc>,

    /// The Credential's `validFrom`, as a UNIX timestamp.
    #[serde(with = "ts_seconds_option")]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nbf: Option<DateTime<Utc>>,

    /// The Credential's `validUntil`, as a UNIX timestamp.
    #[serde(with = "ts_seconds_option")]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exp: Option<DateTime<Utc>>,

    /// The `id` property of the Credential.
    pub jti: String,

    /// The Credential.
    pub vc: VerifiableCredential,
}

impl VcClaims {
    /// Create the JWT claims set for a credential.
    #[must_use]
    pub fn from_vc(vc: VerifiableCredential, issued_at: DateTime<Utc>) -> Self {
        Self {
            iss: vc.issuer.clone(),
            sub: vc.credential_subject.id.clone(),
            iat: issued_at,
            nbf: vc.valid_from,
            exp: vc.valid_until,
            jti: vc.id.clone(),
            vc,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use serde_json::json;

    use super::*;

    #[test]
    fn builder() {
        let vc = CredentialTemplate::new()
            .issuer("https://issuer.io")
            .add_type("DiplomaCredential")
            .add_type("DiplomaCredential")
            .add_context("https://example.org/diploma/v1")
            .claim("degree", json!("BSc"))
            .claim("degree", json!("MSc"))
            .build()
            .expect("should build");

        assert_eq!(vc.type_, vec![BASE_TYPE, "DiplomaCredential"]);
        assert_eq!(vc.context, vec![BASE_CONTEXT, "https://example.org/diploma/v1"]);
        assert_eq!(vc.credential_subject.claims["degree"], "MSc");
        assert!(vc.id.starts_with("urn:uuid:"));
    }

    #[test]
    fn serialize() {
        let vc = CredentialTemplate::new()
            .id("urn:uuid:1234")
            .issuer("https://issuer.io")
            .subject_id("did:example:holder")
            .claim("email", json!("jane@example.com"))
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&vc).unwrap(),
            json!({
                "@context": [BASE_CONTEXT],
                "id": "urn:uuid:1234",
                "type": [BASE_TYPE],
                "issuer": "https://issuer.io",
                "credentialSubject": {
                    "id": "did:example:holder",
                    "email": "jane@example.com"
                }
            })
        );
    }

    #[test]
    fn incomplete() {
        assert!(CredentialTemplate::new().claim("a", json!(1)).build().is_err());
        assert!(CredentialTemplate::new().issuer("https://issuer.io").build().is_err());

        let now = Utc::now();
        let inverted = CredentialTemplate::new()
            .issuer("https://issuer.io")
            .subject_id("did:example:holder")
            .valid_from(now)
            .valid_until(now - TimeDelta::hours(1));
        assert!(matches!(inverted.build(), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn jwt_claims() {
        let now = Utc::now();
        let vc = CredentialTemplate::new()
            .issuer("https://issuer.io")
            .subject_id("did:example:holder")
            .valid_from(now)
            .build()
            .unwrap();
        let claims = VcClaims::from_vc(vc.clone(), now);

        assert_eq!(claims.iss, "https://issuer.io");
        assert_eq!(claims.sub.as_deref(), Some("did:example:holder"));
        assert_eq!(claims.jti, vc.id);

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["nbf"], now.timestamp());
        assert!(json.get("exp").is_none());
    }
}
