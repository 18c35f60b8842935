#![forbid(unsafe_code)]

//! Settings from the environment.

use crate::anchors::SECONDARY_CERTIFICATE_VAR;
use crate::error::ConfigError;
use std::path::PathBuf;

/// Environment variable holding the path to the primary certificate PEM.
pub const PRIMARY_CERTIFICATE_VAR: &str = "TMA_CERTIFICATE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Path to the primary certificate PEM.
    pub primary_certificate: PathBuf,
    /// Inline secondary certificate PEM, as set at startup.
    pub secondary_certificate: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any name → value lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let primary_certificate = lookup(PRIMARY_CERTIFICATE_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingVar(PRIMARY_CERTIFICATE_VAR))?;
        let secondary_certificate =
            lookup(SECONDARY_CERTIFICATE_VAR).filter(|v| !v.trim().is_empty());
        Ok(Self {
            primary_certificate,
            secondary_certificate,
        })
    }

    /// Read the primary certificate file.
    pub fn primary_pem(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.primary_certificate).map_err(|source| {
            ConfigError::ReadCertificate {
                path: self.primary_certificate.clone(),
                source,
            }
        })
    }
}
