//! # Issuer
//!
//! The [`Issuer`] holds everything configured once per issuer instance: the
//! configuration, the signing service, and the mapper registry. Per-request
//! data (the base discovery document, clients, mapper configurations and the
//! user session) is supplied by the caller on every call.

use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::catalog::{self, SupportedCredential};
use crate::compose::ClaimComposer;
use crate::config::IssuerConfig;
use crate::credential::{BASE_TYPE, CredentialTemplate};
use crate::error::{Error, invalid};
use crate::mapper::{MapperConfig, MapperRegistry};
use crate::signing::SigningService;
use crate::types::{ClientConfig, CredentialRequest, CredentialResponse, UserSession};
use crate::well_known::{self, DiscoveryDocument};

/// A configured credential issuer.
#[derive(Debug)]
pub struct Issuer {
    config: IssuerConfig,
    signer: SigningService,
    registry: MapperRegistry,
}

impl Issuer {
    /// Create an issuer, loading the configured signing key.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the signing key
    /// cannot be loaded or is not supported.
    pub fn new(config: IssuerConfig) -> Result<Self, Error> {
        config.validate()?;
        let signer = SigningService::new(config.signing.load()?)?;
        Ok(Self {
            config,
            signer,
            registry: MapperRegistry::new(),
        })
    }

    /// Create an issuer with an existing signing service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the configuration is invalid.
    pub fn with_signer(config: IssuerConfig, signer: SigningService) -> Result<Self, Error> {
        if config.issuer.is_empty() {
            return Err(Error::Configuration("issuer is required".into()));
        }
        Ok(Self {
            config,
            signer,
            registry: MapperRegistry::new(),
        })
    }

    /// Replace the mapper registry.
    #[must_use]
    pub fn registry(mut self, registry: MapperRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The issuer's configuration.
    #[must_use]
    pub const fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// The issuer's signing service.
    #[must_use]
    pub const fn signer(&self) -> &SigningService {
        &self.signer
    }

    /// Build the discovery document from the host's base document and the
    /// issuer's clients.
    #[must_use]
    pub fn discovery(&self, base: Map<String, Value>, clients: &[ClientConfig]) -> DiscoveryDocument {
        let supported = catalog::catalog(clients);
        well_known::build(base, &supported, &self.config.credential_endpoint())
            .expose_format_types(self.config.expose_format_types)
    }

    /// Issue a credential for `session`, composing claims with the client's
    /// mappers.
    ///
    /// The requested types, and any types added by mappers, must all be
    /// advertised for the requested format by a single client attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid, the credential is not
    /// advertised, a required mapper fails, or signing fails.
    pub fn issue(
        &self, request: &CredentialRequest, session: &UserSession, clients: &[ClientConfig],
        mappers: &[MapperConfig],
    ) -> Result<CredentialResponse, Error> {
        let types: Vec<String> =
            request.types.iter().filter(|t| *t != BASE_TYPE).cloned().collect();
        if types.is_empty() {
            return Err(invalid!("no credential types requested"));
        }

        let supported = catalog::catalog(clients);
        check_supported(&supported, request, &types)?;
        if !request.format.is_jwt() {
            return Err(Error::UnsupportedCredentialFormat(request.format.to_string()));
        }

        let now = Utc::now();
        let mut template = CredentialTemplate::new().issuer(&self.config.issuer).valid_from(now);
        if let Some(validity) = self.config.credential_validity() {
            template = template.valid_until(now + validity);
        }
        for t in types {
            template = template.add_type(t);
        }

        let composer = ClaimComposer::from_configs(&self.registry, mappers)?;
        let template = composer.compose(template, session)?;

        // mappers may add types: re-check what will actually be signed
        let composed: Vec<String> =
            template.types().iter().filter(|t| *t != BASE_TYPE).cloned().collect();
        check_supported(&supported, request, &composed)?;

        let credential = self.signer.sign(template)?;

        tracing::debug!(format = %request.format, subject = %session.subject_id, "credential issued");
        Ok(CredentialResponse {
            format: request.format,
            credential,
        })
    }
}

fn check_supported(
    supported: &BTreeSet<SupportedCredential>, request: &CredentialRequest, types: &[String],
) -> Result<(), Error> {
    if supported.iter().any(|sc| sc.covers(request.format, types)) {
        return Ok(());
    }
    Err(Error::UnsupportedCredentialType(format!(
        "{} is not advertised for {}",
        types.join(","),
        request.format
    )))
}
