#![forbid(unsafe_code)]

//! Keys for TMA SAML signature processing.
//!
//! Trust anchors arrive as X.509 certificates; only their public key is used.
//! Private keys are loaded for signing test tokens.

pub mod key;
pub mod loader;

pub use key::{Key, KeyData};
pub use loader::{load_private_key_pem, load_x509_cert_der, load_x509_cert_pem};
