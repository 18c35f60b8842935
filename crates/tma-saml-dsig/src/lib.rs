#![forbid(unsafe_code)]

//! XML Digital Signature processing for signed SAML tokens.
//!
//! Verification uses only the key it is given: `KeyInfo` inside the
//! document is never consulted.

pub mod signature;
pub mod sign;
pub mod transforms;
pub mod verify;

pub use sign::sign_template;
pub use verify::{verify_with_key, SignedTarget, VerifiedDocument};

pub(crate) fn decode_base64(text: &str, what: &str) -> Result<Vec<u8>, tma_saml_core::Error> {
    use base64::Engine;
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(clean)
        .map_err(|e| tma_saml_core::Error::Base64(format!("{what}: {e}")))
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
