#![forbid(unsafe_code)]

//! Cryptographic primitives used by the signature engine.
//!
//! Only what signed SAML tokens actually carry is supported: SHA-1/SHA-2
//! digests, RSA PKCS#1 v1.5 and ECDSA over P-256/P-384.

pub mod digest;
pub mod sign;

pub use digest::DigestMethod;
pub use sign::{SignatureMethod, SigningKey};
