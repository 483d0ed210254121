//! # Claim Composition
//!
//! The [`ClaimComposer`] runs an ordered list of claim mappers over a
//! credential template. For each mapper, in order, the credential-level hook
//! runs first and then the subject hook.
//!
//! Later mappers overwrite subject claims written by earlier mappers under the
//! same property. A mapper that fails contributes nothing and composition
//! continues, unless the mapper is marked `required`.

use serde_json::{Map, Value};

use crate::credential::CredentialTemplate;
use crate::error::Error;
use crate::mapper::subject_id::SUBJECT_ID;
use crate::mapper::{ClaimMapper, MapperConfig, MapperRegistry};
use crate::types::UserSession;

#[derive(Debug)]
struct Entry {
    name: String,
    required: bool,
    mapper: Box<dyn ClaimMapper>,
}

/// Composes claims from an ordered list of mappers.
#[derive(Debug, Default)]
pub struct ClaimComposer {
    mappers: Vec<Entry>,
}

impl ClaimComposer {
    /// A composer with no mappers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapper. Mappers run in the order they are added.
    #[must_use]
    pub fn with_mapper(
        mut self, name: impl Into<String>, required: bool, mapper: impl ClaimMapper + 'static,
    ) -> Self {
        self.mappers.push(Entry {
            name: name.into(),
            required,
            mapper: Box::new(mapper),
        });
        self
    }

    /// Instantiate `configs`, in order, using the registry.
    ///
    /// Mappers that cannot be built are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MapperContribution`] when a required mapper cannot be
    /// built.
    pub fn from_configs(registry: &MapperRegistry, configs: &[MapperConfig]) -> Result<Self, Error> {
        let mut mappers = Vec::with_capacity(configs.len());

        for config in configs {
            match registry.create(config) {
                Ok(mapper) => mappers.push(Entry {
                    name: config.name.clone(),
                    required: config.required,
                    mapper,
                }),
                Err(e) if config.required => {
                    return Err(Error::MapperContribution {
                        mapper: config.name.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => tracing::warn!(mapper = %config.name, "skipping mapper: {e}"),
            }
        }

        Ok(Self { mappers })
    }

    /// The number of mappers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Whether the composer has no mappers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Run every mapper over `template` for `session`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MapperContribution`] when a required mapper fails.
    pub fn compose(
        &self, template: CredentialTemplate, session: &UserSession,
    ) -> Result<CredentialTemplate, Error> {
        let mut template = template;
        let mut subject = subject_map(&template);

        for entry in &self.mappers {
            // a failed mapper leaves no partial contribution
            let staged = entry.mapper.credential_claims(template.clone(), session);
            let mut scratch = subject.clone();
            match entry.mapper.subject_claims(&mut scratch, session) {
                Ok(()) => {
                    template = staged;
                    subject = scratch;
                }
                Err(e) if entry.required => {
                    return Err(match e {
                        Error::MapperContribution { .. } => e,
                        other => Error::MapperContribution {
                            mapper: entry.name.clone(),
                            reason: other.to_string(),
                        },
                    });
                }
                Err(e) => tracing::warn!(mapper = %entry.name, "omitting contribution: {e}"),
            }
            tracing::debug!(mapper = %entry.name, claims = subject.len(), "mapper applied");
        }

        set_subject(&mut template, subject);
        Ok(template)
    }
}

// The subject as one map, including its `id`.
fn subject_map(template: &CredentialTemplate) -> Map<String, Value> {
    let current = template.subject();
    let mut subject = current.claims.clone();
    if let Some(id) = &current.id {
        subject.insert(SUBJECT_ID.to_string(), Value::String(id.clone()));
    }
    subject
}

fn set_subject(template: &mut CredentialTemplate, mut claims: Map<String, Value>) {
    let subject = template.subject_mut();
    match claims.remove(SUBJECT_ID) {
        Some(Value::String(id)) => subject.id = Some(id),
        Some(other) => {
            // a non-string `id` is kept as a claim
            claims.insert(SUBJECT_ID.to_string(), other);
            subject.id = None;
        }
        None => subject.id = None,
    }
    subject.claims = claims;
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::mapper::{
        ContextMapper, CredentialTypeMapper, StaticClaimMapper, SubjectIdMapper,
        UserAttributeMapper,
    };
    use crate::types::User;

    fn session() -> UserSession {
        UserSession {
            subject_id: "did:example:holder".into(),
            user: Some(User {
                username: "jane".into(),
                email: Some("jane@example.com".into()),
                attributes: HashMap::from([(
                    "roles".into(),
                    vec![Some("a".into()), None, Some("b".into())],
                )]),
                ..User::default()
            }),
        }
    }

    fn base() -> CredentialTemplate {
        CredentialTemplate::new().issuer("https://issuer.io")
    }

    // The later of two mappers writing the same property wins.
    #[test]
    fn last_write_wins() {
        let registry = MapperRegistry::new();
        let configs = [
            StaticClaimMapper::create("first", "name", "first"),
            StaticClaimMapper::create("second", "name", "second"),
        ];
        let composer = ClaimComposer::from_configs(&registry, &configs).unwrap();
        let template = composer.compose(base(), &session()).unwrap();
        assert_eq!(template.subject().claims["name"], "second");

        let reversed = [configs[1].clone(), configs[0].clone()];
        let composer = ClaimComposer::from_configs(&registry, &reversed).unwrap();
        let template = composer.compose(base(), &session()).unwrap();
        assert_eq!(template.subject().claims["name"], "first");
    }

    #[test]
    fn aggregation() {
        let configs = [
            UserAttributeMapper::create("roles", "roles", "roles", true),
            UserAttributeMapper::create("locale", "locale", "locale", true),
        ];
        let composer = ClaimComposer::from_configs(&MapperRegistry::new(), &configs).unwrap();
        let template = composer.compose(base(), &session()).unwrap();

        assert_eq!(template.subject().claims["roles"], "a,b");
        assert!(!template.subject().claims.contains_key("locale"));
    }

    #[test]
    fn credential_level() {
        let configs = [
            SubjectIdMapper::create("id"),
            ContextMapper::create("ctx", "https://example.org/diploma/v1"),
            CredentialTypeMapper::create("type", "DiplomaCredential"),
            UserAttributeMapper::create("email", "email", "email", false),
        ];
        let composer = ClaimComposer::from_configs(&MapperRegistry::new(), &configs).unwrap();
        assert_eq!(composer.len(), 4);

        let vc = composer.compose(base(), &session()).unwrap().build().unwrap();
        assert_eq!(vc.type_, vec!["VerifiableCredential", "DiplomaCredential"]);
        assert_eq!(vc.context.last().map(String::as_str), Some("https://example.org/diploma/v1"));
        assert_eq!(vc.credential_subject.id.as_deref(), Some("did:example:holder"));
        assert_eq!(
            serde_json::to_value(&vc.credential_subject).unwrap(),
            json!({ "id": "did:example:holder", "email": "jane@example.com" })
        );
    }

    // A failing mapper is skipped unless required.
    #[test]
    fn failures() {
        let anonymous = UserSession {
            subject_id: "did:example:holder".into(),
            user: None,
        };
        let configs = [
            StaticClaimMapper::create("static", "level", "gold"),
            UserAttributeMapper::create("email", "email", "email", false),
        ];
        let composer = ClaimComposer::from_configs(&MapperRegistry::new(), &configs).unwrap();
        let template = composer.compose(base(), &anonymous).unwrap();
        assert_eq!(template.subject().claims.len(), 1);
        assert_eq!(template.subject().claims["level"], "gold");

        let required = [configs[0].clone(), configs[1].clone().required()];
        let composer = ClaimComposer::from_configs(&MapperRegistry::new(), &required).unwrap();
        let err = composer.compose(base(), &anonymous).unwrap_err();
        assert!(matches!(err, Error::MapperContribution { mapper, .. } if mapper == "email"));
    }

    #[test]
    fn unbuildable() {
        let broken = MapperConfig {
            name: "broken".into(),
            protocol_mapper: StaticClaimMapper::ID.into(),
            ..MapperConfig::default()
        };
        let composer =
            ClaimComposer::from_configs(&MapperRegistry::new(), &[broken.clone()]).unwrap();
        assert!(composer.is_empty());

        let err = ClaimComposer::from_configs(&MapperRegistry::new(), &[broken.required()])
            .unwrap_err();
        assert!(matches!(err, Error::MapperContribution { .. }));
    }

    #[derive(Debug)]
    struct Partial;

    impl ClaimMapper for Partial {
        fn credential_claims(
            &self, template: CredentialTemplate, _: &UserSession,
        ) -> CredentialTemplate {
            template.add_type("PartialCredential").add_context("https://example.org/partial/v1")
        }

        fn subject_claims(
            &self, subject: &mut Map<String, Value>, _: &UserSession,
        ) -> Result<(), Error> {
            subject.insert("partial".into(), json!(true));
            Err(Error::MapperContribution {
                mapper: "partial".into(),
                reason: "failed after writing".into(),
            })
        }
    }

    #[test]
    fn no_partial_contribution() {
        let subject = SubjectIdMapper::from_config(&SubjectIdMapper::create("subject"));
        let composer = ClaimComposer::new()
            .with_mapper("subject", false, subject)
            .with_mapper("partial", false, Partial);
        let template = composer.compose(base(), &session()).unwrap();
        assert!(!template.subject().claims.contains_key("partial"));
        assert_eq!(template.subject().id.as_deref(), Some("did:example:holder"));
        assert_eq!(template.types(), ["VerifiableCredential"]);
        assert!(!template.contexts().iter().any(|c| c.contains("partial")));
    }
}
