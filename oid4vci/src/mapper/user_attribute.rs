//! Maps a user attribute to a subject claim.
//!
//! Null values are dropped and the remaining values joined with `,`. When no
//! values remain the claim is omitted.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::mapper::{ClaimMapper, MapperConfig, SUBJECT_PROPERTY};
use crate::types::UserSession;

/// Config key naming the user attribute to read.
pub const USER_ATTRIBUTE: &str = "userAttribute";

/// Config key enabling aggregation of the attribute across groups.
pub const AGGREGATE_ATTRIBUTES: &str = "aggregateAttributes";

/// Writes a user attribute into the credential subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserAttributeMapper {
    name: String,
    subject_property: String,
    user_attribute: String,
    aggregate: bool,
}

impl UserAttributeMapper {
    /// Mapper identifier.
    pub const ID: &'static str = "oidc4vp-user-attribute-mapper";

    /// Configuration for a new mapper instance.
    #[must_use]
    pub fn create(
        name: &str, subject_property: &str, user_attribute: &str, aggregate: bool,
    ) -> MapperConfig {
        MapperConfig::new(
            name,
            Self::ID,
            &[
                (SUBJECT_PROPERTY, subject_property),
                (USER_ATTRIBUTE, user_attribute),
                (AGGREGATE_ATTRIBUTES, if aggregate { "true" } else { "false" }),
            ],
        )
    }

    /// Build the mapper from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when an option is missing or invalid.
    pub fn from_config(config: &MapperConfig) -> Result<Self, Error> {
        Ok(Self {
            name: config.name.clone(),
            subject_property: config.option(SUBJECT_PROPERTY)?.to_string(),
            user_attribute: config.option(USER_ATTRIBUTE)?.to_string(),
            aggregate: config.flag(AGGREGATE_ATTRIBUTES)?,
        })
    }
}

impl ClaimMapper for UserAttributeMapper {
    fn subject_claims(
        &self, subject: &mut Map<String, Value>, session: &UserSession,
    ) -> Result<(), Error> {
        let Some(user) = &session.user else {
            return Err(Error::MapperContribution {
                mapper: self.name.clone(),
                reason: "session has no user".into(),
            });
        };

        let values: Vec<String> = user
            .resolve_attribute(&self.user_attribute, self.aggregate)
            .into_iter()
            .flatten()
            .collect();
        if values.is_empty() {
            tracing::debug!(mapper = %self.name, attribute = %self.user_attribute, "no values");
            return Ok(());
        }

        subject.insert(self.subject_property.clone(), Value::String(values.join(",")));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::{Group, User};

    fn session() -> UserSession {
        let group = Group {
            name: "staff".into(),
            attributes: HashMap::from([("role".into(), vec![Some("c".into())])]),
            parent: None,
        };
        UserSession {
            subject_id: "did:example:holder".into(),
            user: Some(User {
                username: "jane".into(),
                attributes: HashMap::from([
                    ("role".into(), vec![Some("a".into()), None, Some("b".into())]),
                    ("empty".into(), vec![None]),
                ]),
                groups: vec![group],
                ..User::default()
            }),
        }
    }

    fn mapper(attribute: &str, aggregate: bool) -> UserAttributeMapper {
        UserAttributeMapper::from_config(&UserAttributeMapper::create(
            "m", "claim", attribute, aggregate,
        ))
        .unwrap()
    }

    #[test]
    fn nulls_stripped() {
        let mut subject = Map::new();
        mapper("role", false).subject_claims(&mut subject, &session()).unwrap();
        assert_eq!(subject["claim"], "a,b");
    }

    #[test]
    fn aggregated() {
        let mut subject = Map::new();
        mapper("role", true).subject_claims(&mut subject, &session()).unwrap();
        assert_eq!(subject["claim"], "a,b,c");
    }

    // Only null values, or none at all, and no claim is written.
    #[test]
    fn empty_omitted() {
        let mut subject = Map::new();
        mapper("empty", true).subject_claims(&mut subject, &session()).unwrap();
        mapper("missing", false).subject_claims(&mut subject, &session()).unwrap();
        assert!(subject.is_empty());
    }

    #[test]
    fn builtin_attribute() {
        let mut subject = Map::new();
        mapper("username", false).subject_claims(&mut subject, &session()).unwrap();
        assert_eq!(subject["claim"], "jane");
    }

    #[test]
    fn no_user() {
        let session = UserSession {
            subject_id: "did:example:holder".into(),
            user: None,
        };
        let err = mapper("role", false).subject_claims(&mut Map::new(), &session).unwrap_err();
        assert!(matches!(err, Error::MapperContribution { mapper, .. } if mapper == "m"));
    }
}
