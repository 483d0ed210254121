//! Writes a fixed value to a subject claim.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::mapper::{ClaimMapper, MapperConfig, SUBJECT_PROPERTY};
use crate::types::UserSession;

/// Config key holding the value to write.
pub const STATIC_VALUE: &str = "staticValue";

/// Writes a static claim into the credential subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticClaimMapper {
    subject_property: String,
    value: String,
}

impl StaticClaimMapper {
    /// Mapper identifier.
    pub const ID: &'static str = "oidc4vp-static-claim-mapper";

    /// Configuration for a new mapper instance.
    #[must_use]
    pub fn create(name: &str, subject_property: &str, value: &str) -> MapperConfig {
        MapperConfig::new(
            name,
            Self::ID,
            &[(SUBJECT_PROPERTY, subject_property), (STATIC_VALUE, value)],
        )
    }

    /// Build the mapper from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when an option is missing.
    pub fn from_config(config: &MapperConfig) -> Result<Self, Error> {
        Ok(Self {
            subject_property: config.option(SUBJECT_PROPERTY)?.to_string(),
            value: config.option(STATIC_VALUE)?.to_string(),
        })
    }
}

impl ClaimMapper for StaticClaimMapper {
    fn subject_claims(&self, subject: &mut Map<String, Value>, _: &UserSession) -> Result<(), Error> {
        subject.insert(self.subject_property.clone(), Value::String(self.value.clone()));
        Ok(())
    }
}
