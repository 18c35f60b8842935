#![forbid(unsafe_code)]

//! Verification of SAML tokens issued by the TMA identity broker.
//!
//! A token arrives in the [`TMA_SAML_HEADER`] request header. Processing
//! goes signature → validity window → attributes → classification, and
//! citizen tokens additionally pass the BSN 11-test:
//!
//! ```no_run
//! use tma_saml::{TmaSaml, UserType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tma = TmaSaml::from_env()?;
//! # let token = "";
//! let identity = tma.authenticate(token)?;
//! if identity.user_type == UserType::Citizen {
//!     println!("valid until {}", identity.session_valid_until);
//! }
//! # Ok(())
//! # }
//! ```

pub mod anchors;
pub mod attributes;
pub mod bsn;
pub mod claim;
pub mod config;
pub mod error;
pub mod tma;
pub mod validity;
pub mod verifier;

pub use anchors::{
    AnchorRole, CertificateSource, EnvCertificateSource, StaticCertificateSource, TrustAnchor,
    TrustAnchorResolver, TrustAnchorSet,
};
pub use attributes::{extract_attributes, AttributeMap};
pub use bsn::{is_valid_bsn, validate_bsn};
pub use claim::{
    classify, BusinessClaim, CitizenClaim, Claim, UserType, BRANCH_NUMBER_KEY, CITIZEN_ID_KEY,
    KVK_NUMBER_KEY,
};
pub use config::Settings;
pub use error::{ConfigError, SamlError};
pub use tma::{Identity, TmaSaml};
pub use validity::{check_validity, session_valid_until, ValidityWindow};
pub use verifier::{SignatureVerifier, VerifiedAssertion};

/// Request header carrying the token.
pub const TMA_SAML_HEADER: &str = "X-Saml-Attribute";
