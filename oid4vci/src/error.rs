//! # Issuer Errors
//!
//! Errors raised while signing credentials, composing claims, building the
//! discovery document, or handling issuance requests.
//!
//! Errors returned to a client serialize to the `OAuth` 2.0 error object
//! (`{"error": "...", "error_description": "..."}`). Errors that describe a
//! problem with the issuer itself (key material, configuration, mappers) are
//! reported as `server_error` so internal detail is carried in the
//! description rather than the code.

use std::error::Error as StdError;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Boxed underlying cause of a failure.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors for credential issuance and issuer discovery.
#[derive(Error, Debug)]
pub enum Error {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, or is otherwise malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested credential format is not supported by the issuer.
    #[error("unsupported credential format: {0}")]
    UnsupportedCredentialFormat(String),

    /// The requested credential type is not advertised by any client of the
    /// issuer.
    #[error("unsupported credential type: {0}")]
    UnsupportedCredentialType(String),

    /// The key material does not map to any supported signature algorithm,
    /// or the configured signature scheme does not fit the key.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The cryptographic signing operation failed. Never retried.
    #[error("signing failed: {message}")]
    Signing {
        /// What was being attempted.
        message: String,

        /// The underlying cryptographic or encoding failure.
        #[source]
        source: BoxError,
    },

    /// A claim mapper could not resolve its source data.
    #[error("mapper `{mapper}` could not contribute: {reason}")]
    MapperContribution {
        /// Name of the mapper instance.
        mapper: String,

        /// Why the contribution failed.
        reason: String,
    },

    /// A client attribute declaring credential types is malformed.
    #[error("malformed credential attribute `{key}`: {reason}")]
    CatalogParse {
        /// The attribute key.
        key: String,

        /// Why the attribute could not be parsed.
        reason: String,
    },

    /// Key material could not be read or decoded.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// The issuer configuration is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The issuer encountered an unexpected condition that prevented it from
    /// fulfilling the request.
    #[error("server error: {0}")]
    ServerError(String),
}

impl Error {
    /// Wrap a cryptographic failure as a [`Error::Signing`] error.
    pub fn signing(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Signing {
            message: message.into(),
            source: source.into(),
        }
    }

    /// The `OAuth` 2.0 error code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_credential_request",
            Self::UnsupportedCredentialFormat(_) => "unsupported_credential_format",
            Self::UnsupportedCredentialType(_) => "unsupported_credential_type",
            Self::UnsupportedAlgorithm(_)
            | Self::Signing { .. }
            | Self::MapperContribution { .. }
            | Self::CatalogParse { .. }
            | Self::InvalidKey(_)
            | Self::Configuration(_)
            | Self::ServerError(_) => "server_error",
        }
    }

    /// Returns `true` when the error was caused by the client's request
    /// rather than by the issuer.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::UnsupportedCredentialFormat(_)
                | Self::UnsupportedCredentialType(_)
        )
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("error", self.code())?;
        map.serialize_entry("error_description", &self.to_string())?;
        map.end()
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<Self>() {
            Ok(e) => e,
            Err(err) => {
                let stack = err.chain().fold(String::new(), |cause, e| format!("{cause} -> {e}"));
                let stack = stack.trim_start_matches(" -> ").to_string();
                Self::ServerError(stack)
            }
        }
    }
}

/// Construct an `Error::InvalidRequest` error from a string or existing error
/// value.
macro_rules! invalid {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::InvalidRequest(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::InvalidRequest(format!($err))
    };
}
pub(crate) use invalid;
