#![forbid(unsafe_code)]

use crate::claim::UserType;
use chrono::{DateTime, FixedOffset};
use std::path::PathBuf;

/// Why a token was rejected. Every pipeline stage fails with exactly one of these.
#[derive(Debug, thiserror::Error)]
pub enum SamlError {
    /// Not a well-formed signed assertion, or a required part is missing.
    #[error("malformed SAML token: {0}")]
    MalformedToken(String),

    /// No trust anchor validates the signature. The engine error is kept
    /// as-is, so a digest mismatch still names its reference.
    #[error(transparent)]
    InvalidSignature(tma_saml_core::Error),

    /// `now` lies outside `[not_before, not_on_or_after)`.
    #[error("SAML token is outside its validity window ({not_before} .. {not_on_or_after})")]
    Expired {
        not_before: DateTime<FixedOffset>,
        not_on_or_after: DateTime<FixedOffset>,
    },

    #[error("attributes match neither a citizen nor a business")]
    UnknownUserType,

    #[error("citizen identifier fails the 11-test")]
    InvalidIdentifier,

    /// The token is valid but holds the other kind of claim.
    #[error("expected a {expected} token, found {found}")]
    WrongUserType { expected: UserType, found: UserType },
}

impl SamlError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedToken(msg.into())
    }
}

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("cannot read certificate {}: {source}", path.display())]
    ReadCertificate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = SamlError> = std::result::Result<T, E>;
