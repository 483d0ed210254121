//! Sets the credential subject's `id` to the session's subject (holder).

use serde_json::{Map, Value};

use crate::error::Error;
use crate::mapper::{ClaimMapper, MapperConfig};
use crate::types::UserSession;

/// Subject property the identifier is written to.
pub const SUBJECT_ID: &str = "id";

/// Writes the holder's identifier into the credential subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectIdMapper {
    name: String,
}

impl SubjectIdMapper {
    /// Mapper identifier.
    pub const ID: &'static str = "oidc4vp-subject-id-mapper";

    /// Configuration for a new mapper instance.
    #[must_use]
    pub fn create(name: &str) -> MapperConfig {
        MapperConfig::new(name, Self::ID, &[])
    }

    /// Build the mapper from its configuration.
    #[must_use]
    pub fn from_config(config: &MapperConfig) -> Self {
        Self {
            name: config.name.clone(),
        }
    }
}

impl ClaimMapper for SubjectIdMapper {
    fn subject_claims(
        &self, subject: &mut Map<String, Value>, session: &UserSession,
    ) -> Result<(), Error> {
        if session.subject_id.trim().is_empty() {
            return Err(Error::MapperContribution {
                mapper: self.name.clone(),
                reason: "session has no subject id".into(),
            });
        }
        subject.insert(SUBJECT_ID.to_string(), Value::String(session.subject_id.clone()));
        Ok(())
    }
}
