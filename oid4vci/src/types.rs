//! # Issuance Types
//!
//! Data supplied by the issuer's host (clients, users, sessions) and the
//! request and response bodies of the issuer's endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use crate::catalog::{Format, SupportedCredential};
pub use crate::well_known::{DiscoveryDocument, FormatObject};

/// A client (relying party) registered with the issuer.
///
/// Only the client's attributes are read. Attributes whose key starts with
/// [`crate::catalog::VC_TYPES_PREFIX`] declare the credentials the client
/// may be issued.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// The client identifier.
    pub client_id: String,

    /// Client attributes. May be absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, String>>,
}

/// Multi-valued attributes. A value may be null.
pub type Attributes = HashMap<String, Vec<Option<String>>>;

/// The authenticated session a credential is being issued for.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// The identifier of the subject (holder) the credential is issued to.
    pub subject_id: String,

    /// The user bound to the session, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// A user known to the issuer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// The user's identifier.
    pub id: String,

    /// The user's login name.
    pub username: String,

    /// The user's email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Whether the email address has been verified.
    pub email_verified: bool,

    /// The user's first name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// The user's last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// The user's preferred locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Custom attributes.
    pub attributes: Attributes,

    /// Groups the user is a member of, in membership order.
    pub groups: Vec<Group>,
}

impl User {
    /// The user's own values for the named attribute. Built-in attributes
    /// (`username`, `email`, `emailVerified`, `firstName`, `lastName`,
    /// `locale`) take precedence over custom attributes.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Vec<Option<String>> {
        let builtin = match name {
            "username" => Some(Some(self.username.clone())),
            "email" => Some(self.email.clone()),
            "emailVerified" => Some(Some(self.email_verified.to_string())),
            "firstName" => Some(self.first_name.clone()),
            "lastName" => Some(self.last_name.clone()),
            "locale" => Some(self.locale.clone()),
            _ => None,
        };

        match builtin {
            Some(Some(value)) => vec![Some(value)],
            Some(None) => vec![],
            None => self.attributes.get(name).cloned().unwrap_or_default(),
        }
    }

    /// Resolve the named attribute across the user and their groups.
    ///
    /// Without aggregation, the user's own values win; otherwise the values of
    /// the first group (searching up each group's ancestry) holding the
    /// attribute are returned. With aggregation, the user's values and every
    /// group's values are combined, without duplicates, in first-seen order.
    #[must_use]
    pub fn resolve_attribute(&self, name: &str, aggregate: bool) -> Vec<Option<String>> {
        let own = self.attribute(name);
        if !aggregate {
            if !own.is_empty() {
                return own;
            }
            return self
                .groups
                .iter()
                .map(|g| g.resolve_attribute(name))
                .find(|values| !values.is_empty())
                .unwrap_or_default();
        }

        let mut values = Vec::new();
        let group_values = self.groups.iter().flat_map(|g| g.resolve_attribute(name));
        for value in own.into_iter().chain(group_values) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        values
    }
}

/// A group of users.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    /// The group name.
    pub name: String,

    /// Group attributes.
    pub attributes: Attributes,

    /// The parent group, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Group>>,
}

impl Group {
    /// The group's values for the attribute, or the nearest ancestor's.
    #[must_use]
    pub fn resolve_attribute(&self, name: &str) -> Vec<Option<String>> {
        let mut group = Some(self);
        while let Some(current) = group {
            if let Some(values) = current.attributes.get(name)
                && !values.is_empty()
            {
                return values.clone();
            }
            group = current.parent.as_deref();
        }
        vec![]
    }
}

/// The client and session an access token was issued for.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Authorized {
    /// The client the token was issued to.
    pub client_id: String,

    /// The user session.
    pub session: UserSession,
}

/// Request for the issuer's discovery document.
#[derive(Clone, Debug, Default)]
pub struct DiscoveryRequest;

/// The issuer's discovery document.
#[derive(Clone, Debug, Serialize)]
pub struct DiscoveryResponse(pub DiscoveryDocument);

/// A request for a credential.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialRequest {
    /// The requested credential format.
    pub format: Format,

    /// The requested credential types, not including `VerifiableCredential`.
    pub types: Vec<String>,
}

/// An issued credential.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialResponse {
    /// The format of the issued credential.
    pub format: Format,

    /// The signed credential.
    pub credential: String,
}
