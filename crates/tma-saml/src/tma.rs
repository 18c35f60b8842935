#![forbid(unsafe_code)]

//! Caller-facing entry points. Each runs signature and validity checks
//! before reading anything from the token.

use crate::anchors::{CertificateSource, EnvCertificateSource, StaticCertificateSource, TrustAnchorResolver};
use crate::attributes::{extract_attributes, AttributeMap};
use crate::claim::{classify, BusinessClaim, Claim, UserType};
use crate::config::Settings;
use crate::error::{ConfigError, Result, SamlError};
use crate::validity::{check_validity, ValidityWindow};
use crate::verifier::{SignatureVerifier, VerifiedAssertion};
use chrono::{DateTime, FixedOffset, Utc};

/// Everything one token says about its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_type: UserType,
    pub claim: Claim,
    pub session_valid_until: DateTime<FixedOffset>,
}

#[derive(Debug)]
pub struct TmaSaml {
    resolver: TrustAnchorResolver,
    verifier: SignatureVerifier,
}

impl TmaSaml {
    pub fn new(resolver: TrustAnchorResolver) -> Self {
        Self {
            resolver,
            verifier: SignatureVerifier,
        }
    }

    /// Both anchors exactly as `settings` holds them.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let primary = settings.primary_pem()?;
        Ok(Self::with_certificates(primary, settings.secondary_certificate.clone()))
    }

    /// Primary from `TMA_CERTIFICATE`. The secondary is re-read from
    /// `TMA_CERTIFICATE_SECONDARY` on every call.
    pub fn from_env() -> Result<Self, ConfigError> {
        let primary = Settings::from_env()?.primary_pem()?;
        Ok(Self::with_source(primary, EnvCertificateSource::default()))
    }

    /// Fixed anchors, no environment lookups.
    pub fn with_certificates(primary_pem: impl Into<String>, secondary_pem: Option<String>) -> Self {
        Self::with_source(primary_pem, StaticCertificateSource(secondary_pem))
    }

    pub fn with_source(primary_pem: impl Into<String>, source: impl CertificateSource + 'static) -> Self {
        Self::new(TrustAnchorResolver::new(primary_pem, source))
    }

    pub fn authenticate(&self, token: &str) -> Result<Identity> {
        self.authenticate_at(token, Utc::now())
    }

    pub fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity> {
        let (assertion, window) = self.verified_at(token, now)?;
        let (user_type, claim) = classify(&extract_attributes(&assertion)?)?;
        Ok(Identity {
            user_type,
            claim,
            session_valid_until: window.not_on_or_after,
        })
    }

    pub fn get_user_type(&self, token: &str) -> Result<UserType> {
        self.get_user_type_at(token, Utc::now())
    }

    /// Citizen tokens only count when their BSN passes the 11-test.
    pub fn get_user_type_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserType> {
        self.authenticate_at(token, now).map(|identity| identity.user_type)
    }

    pub fn get_bsn(&self, token: &str) -> Result<String> {
        self.get_bsn_at(token, Utc::now())
    }

    pub fn get_bsn_at(&self, token: &str, now: DateTime<Utc>) -> Result<String> {
        match self.authenticate_at(token, now)?.claim {
            Claim::Citizen(citizen) => Ok(citizen.national_id),
            other => Err(SamlError::WrongUserType {
                expected: UserType::Citizen,
                found: other.user_type(),
            }),
        }
    }

    pub fn get_business_attributes(&self, token: &str) -> Result<BusinessClaim> {
        self.get_business_attributes_at(token, Utc::now())
    }

    pub fn get_business_attributes_at(&self, token: &str, now: DateTime<Utc>) -> Result<BusinessClaim> {
        match self.authenticate_at(token, now)?.claim {
            Claim::Business(business) => Ok(business),
            other => Err(SamlError::WrongUserType {
                expected: UserType::Business,
                found: other.user_type(),
            }),
        }
    }

    pub fn get_attributes(&self, token: &str) -> Result<AttributeMap> {
        self.get_attributes_at(token, Utc::now())
    }

    pub fn get_attributes_at(&self, token: &str, now: DateTime<Utc>) -> Result<AttributeMap> {
        let (assertion, _) = self.verified_at(token, now)?;
        extract_attributes(&assertion)
    }

    pub fn get_session_valid_until(&self, token: &str) -> Result<DateTime<FixedOffset>> {
        self.get_session_valid_until_at(token, Utc::now())
    }

    pub fn get_session_valid_until_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<DateTime<FixedOffset>> {
        self.verified_at(token, now).map(|(_, window)| window.not_on_or_after)
    }

    fn verified_at(&self, token: &str, now: DateTime<Utc>) -> Result<(VerifiedAssertion, ValidityWindow)> {
        let anchors = self.resolver.resolve();
        let assertion = self.verifier.verify(token, &anchors)?;
        let window = check_validity(&assertion, now)?;
        Ok((assertion, window))
    }
}
