//! # Claim Mappers
//!
//! A claim mapper contributes claims to a credential from the session it is
//! being issued for. Mappers are configured per client as [`MapperConfig`]s
//! and instantiated through a [`MapperRegistry`], keyed by a stable mapper
//! identifier.
//!
//! Built-in mappers:
//!
//! | Identifier                          | Contributes                              |
//! | ----------------------------------- | ---------------------------------------- |
//! | `oidc4vp-user-attribute-mapper`     | a subject claim from a user attribute    |
//! | `oidc4vp-static-claim-mapper`       | a subject claim with a fixed value       |
//! | `oidc4vp-subject-id-mapper`         | the subject `id`                         |
//! | `oidc4vp-context-mapper`            | a credential `@context` entry            |
//! | `oidc4vp-credential-type-mapper`    | a credential type                        |

pub mod context;
pub mod credential_type;
pub mod static_claim;
pub mod subject_id;
pub mod user_attribute;

use std::collections::HashMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use self::context::ContextMapper;
pub use self::credential_type::CredentialTypeMapper;
pub use self::static_claim::StaticClaimMapper;
pub use self::subject_id::SubjectIdMapper;
pub use self::user_attribute::UserAttributeMapper;
use crate::credential::CredentialTemplate;
use crate::error::Error;
use crate::types::UserSession;

/// Config key naming the subject claim a mapper writes.
pub const SUBJECT_PROPERTY: &str = "subjectProperty";

/// Contributes claims to a credential.
///
/// Both hooks default to contributing nothing.
pub trait ClaimMapper: Debug + Send + Sync {
    /// Contribute credential-level claims (types, contexts). The template is
    /// passed by value and the updated template returned.
    fn credential_claims(
        &self, template: CredentialTemplate, _session: &UserSession,
    ) -> CredentialTemplate {
        template
    }

    /// Contribute subject claims by inserting (or overwriting) entries in the
    /// in-progress subject map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MapperContribution`] when the mapper's source data
    /// cannot be resolved.
    fn subject_claims(
        &self, _subject: &mut Map<String, Value>, _session: &UserSession,
    ) -> Result<(), Error> {
        Ok(())
    }
}

/// Persisted configuration of a mapper instance.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MapperConfig {
    /// Name of the mapper instance.
    pub name: String,

    /// Identifier of the mapper implementation.
    pub protocol_mapper: String,

    /// When `true`, failing to build or run the mapper fails issuance.
    #[serde(default)]
    pub required: bool,

    /// Mapper options.
    #[serde(default)]
    pub config: HashMap<String, String>,
}

impl MapperConfig {
    /// Mark the mapper as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// A non-blank option value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the option is missing or blank.
    pub fn option(&self, key: &str) -> Result<&str, Error> {
        match self.config.get(key).map(|v| v.trim()) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::Configuration(format!("mapper `{}` is missing `{key}`", self.name))),
        }
    }

    /// A `"true"`/`"false"` option value, `false` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the value is not a boolean.
    pub fn flag(&self, key: &str) -> Result<bool, Error> {
        let Some(value) = self.config.get(key) else {
            return Ok(false);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            _ => Err(Error::Configuration(format!(
                "mapper `{}`: `{key}` must be true or false, not `{value}`",
                self.name
            ))),
        }
    }

    fn new(name: &str, protocol_mapper: &str, options: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            protocol_mapper: protocol_mapper.to_string(),
            required: false,
            config: options.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect(),
        }
    }
}

/// Builds a mapper from its persisted configuration.
pub type MapperFactory = fn(&MapperConfig) -> Result<Box<dyn ClaimMapper>, Error>;

fn boxed<M: ClaimMapper + 'static>(mapper: M) -> Box<dyn ClaimMapper> {
    Box::new(mapper)
}

/// Mapper implementations keyed by identifier.
#[derive(Clone, Debug)]
pub struct MapperRegistry {
    factories: HashMap<String, MapperFactory>,
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MapperRegistry {
    /// A registry holding the built-in mappers.
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .register(UserAttributeMapper::ID, |c| UserAttributeMapper::from_config(c).map(boxed))
            .register(StaticClaimMapper::ID, |c| StaticClaimMapper::from_config(c).map(boxed))
            .register(SubjectIdMapper::ID, |c| Ok(boxed(SubjectIdMapper::from_config(c))))
            .register(ContextMapper::ID, |c| ContextMapper::from_config(c).map(boxed))
            .register(CredentialTypeMapper::ID, |c| CredentialTypeMapper::from_config(c).map(boxed))
    }

    /// A registry with no mappers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) a mapper implementation.
    #[must_use]
    pub fn register(mut self, id: impl Into<String>, factory: MapperFactory) -> Self {
        self.factories.insert(id.into(), factory);
        self
    }

    /// Whether a mapper implementation is registered for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Instantiate the mapper described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when no implementation is registered
    /// for the mapper or its options are invalid.
    pub fn create(&self, config: &MapperConfig) -> Result<Box<dyn ClaimMapper>, Error> {
        let Some(factory) = self.factories.get(&config.protocol_mapper) else {
            return Err(Error::Configuration(format!(
                "mapper `{}`: unknown implementation `{}`",
                config.name, config.protocol_mapper
            )));
        };
        factory(config)
    }
}
