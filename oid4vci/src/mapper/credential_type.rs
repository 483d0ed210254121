//! Adds a type to the credential.

use crate::credential::CredentialTemplate;
use crate::error::Error;
use crate::mapper::{ClaimMapper, MapperConfig};
use crate::types::UserSession;

/// Config key holding the credential type.
pub const CREDENTIAL_TYPE: &str = "credentialType";

/// Appends a credential type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialTypeMapper {
    credential_type: String,
}

impl CredentialTypeMapper {
    /// Mapper identifier.
    pub const ID: &'static str = "oidc4vp-credential-type-mapper";

    /// Configuration for a new mapper instance.
    #[must_use]
    pub fn create(name: &str, credential_type: &str) -> MapperConfig {
        MapperConfig::new(name, Self::ID, &[(CREDENTIAL_TYPE, credential_type)])
    }

    /// Build the mapper from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the type is missing.
    pub fn from_config(config: &MapperConfig) -> Result<Self, Error> {
        Ok(Self {
            credential_type: config.option(CREDENTIAL_TYPE)?.to_string(),
        })
    }
}

impl ClaimMapper for CredentialTypeMapper {
    fn credential_claims(&self, template: CredentialTemplate, _: &UserSession) -> CredentialTemplate {
        template.add_type(&self.credential_type)
    }
}
