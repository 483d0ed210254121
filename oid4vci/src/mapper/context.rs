//! Adds a JSON-LD `@context` entry to the credential.

use crate::credential::CredentialTemplate;
use crate::error::Error;
use crate::mapper::{ClaimMapper, MapperConfig};
use crate::types::UserSession;

/// Config key holding the context URL.
pub const CONTEXT: &str = "context";

/// Appends a `@context` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextMapper {
    context: String,
}

impl ContextMapper {
    /// Mapper identifier.
    pub const ID: &'static str = "oidc4vp-context-mapper";

    /// Configuration for a new mapper instance.
    #[must_use]
    pub fn create(name: &str, context: &str) -> MapperConfig {
        MapperConfig::new(name, Self::ID, &[(CONTEXT, context)])
    }

    /// Build the mapper from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the context is missing.
    pub fn from_config(config: &MapperConfig) -> Result<Self, Error> {
        Ok(Self {
            context: config.option(CONTEXT)?.to_string(),
        })
    }
}

impl ClaimMapper for ContextMapper {
    fn credential_claims(&self, template: CredentialTemplate, _: &UserSession) -> CredentialTemplate {
        template.add_context(&self.context)
    }
}
