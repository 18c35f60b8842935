#![forbid(unsafe_code)]

//! Signature verification with primary/secondary trust-anchor fallback.

use crate::anchors::{AnchorRole, TrustAnchor, TrustAnchorSet};
use crate::error::{Result, SamlError};
use tma_saml_core::ns;
use tma_saml_dsig::VerifiedDocument;
use tma_saml_xml::document::find_element;

/// A token whose signature verified against one of the trust anchors.
///
/// Only [`SignatureVerifier::verify`] constructs one. Readers see the
/// assertion inside the signed element and nothing outside it.
#[derive(Debug, Clone)]
pub struct VerifiedAssertion {
    document: VerifiedDocument,
    anchor: AnchorRole,
}

impl VerifiedAssertion {
    /// Which anchor validated the signature.
    pub fn anchor(&self) -> AnchorRole {
        self.anchor
    }

    /// Run `f` on the signed `<saml:Assertion>` element.
    pub fn with_assertion<T>(
        &self,
        f: impl FnOnce(roxmltree::Node<'_, '_>) -> Result<T>,
    ) -> Result<T> {
        let doc = self
            .document
            .parse()
            .map_err(|e| SamlError::malformed(e.to_string()))?;
        let signed = self
            .document
            .signed_node(&doc)
            .map_err(|e| SamlError::malformed(e.to_string()))?;
        let assertion = find_element(signed, ns::SAML2_ASSERTION, ns::node::ASSERTION)
            .ok_or_else(|| SamlError::malformed("signed content holds no Assertion"))?;
        f(assertion)
    }
}

/// Verifies raw tokens against a [`TrustAnchorSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Try the primary anchor, then the secondary if the primary rejected
    /// the signature itself. If both fail the primary's error is returned.
    pub fn verify(&self, token: &str, anchors: &TrustAnchorSet) -> Result<VerifiedAssertion> {
        if token.trim().is_empty() {
            return Err(SamlError::malformed("empty token"));
        }

        let primary_err = match verify_with_anchor(token, &anchors.primary) {
            Ok(document) => {
                tracing::debug!(anchor = %AnchorRole::Primary, "signature verified");
                return Ok(VerifiedAssertion {
                    document,
                    anchor: AnchorRole::Primary,
                });
            }
            Err(e) => e,
        };

        if !primary_err.is_signature_failure() {
            tracing::debug!(error = %primary_err, "token rejected as malformed");
            return Err(SamlError::MalformedToken(primary_err.to_string()));
        }

        if let Some(secondary) = &anchors.secondary {
            tracing::debug!(error = %primary_err, "primary anchor rejected signature, trying secondary");
            match verify_with_anchor(token, secondary) {
                Ok(document) => {
                    tracing::warn!(anchor = %AnchorRole::Secondary, "signature verified by secondary trust anchor");
                    return Ok(VerifiedAssertion {
                        document,
                        anchor: AnchorRole::Secondary,
                    });
                }
                Err(e) => tracing::debug!(error = %e, "secondary anchor rejected signature"),
            }
        }

        Err(SamlError::InvalidSignature(primary_err))
    }
}

fn verify_with_anchor(
    token: &str,
    anchor: &TrustAnchor,
) -> std::result::Result<VerifiedDocument, tma_saml_core::Error> {
    let key = tma_saml_keys::load_x509_cert_pem(anchor.pem.as_bytes())?
        .with_name(anchor.role.to_string());
    tma_saml_dsig::verify_with_key(token, &key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::TrustAnchorResolver;
    use tma_saml_testkit::{keys, TokenBuilder};

    #[test]
    fn empty_token_is_malformed() {
        let anchors = TrustAnchorResolver::primary_only(keys::PRIMARY_CERT_PEM).resolve();
        let err = SignatureVerifier.verify("  ", &anchors).unwrap_err();
        assert!(matches!(err, SamlError::MalformedToken(_)));
    }

    #[test]
    fn garbage_is_malformed_not_retried() {
        let anchors = TrustAnchorResolver::new(
            keys::PRIMARY_CERT_PEM,
            crate::anchors::StaticCertificateSource::with(keys::SECONDARY_CERT_PEM),
        )
        .resolve();
        let err = SignatureVerifier.verify("<not-saml/>", &anchors).unwrap_err();
        assert!(matches!(err, SamlError::MalformedToken(_)));
    }

    #[test]
    fn assertion_is_reachable() {
        let token = TokenBuilder::citizen("987654329").build().unwrap();
        let anchors = TrustAnchorResolver::primary_only(keys::PRIMARY_CERT_PEM).resolve();
        let verified = SignatureVerifier.verify(&token, &anchors).unwrap();
        assert_eq!(verified.anchor(), AnchorRole::Primary);
        let name = verified
            .with_assertion(|a| Ok(a.tag_name().name().to_owned()))
            .unwrap();
        assert_eq!(name, "Assertion");
    }

    #[test]
    fn malformed_primary_certificate_falls_back() {
        let token = TokenBuilder::citizen("987654329").build().unwrap();
        let anchors = TrustAnchorResolver::new(
            "not a certificate",
            crate::anchors::StaticCertificateSource::with(keys::PRIMARY_CERT_PEM),
        )
        .resolve();
        let verified = SignatureVerifier.verify(&token, &anchors).unwrap();
        assert_eq!(verified.anchor(), AnchorRole::Secondary);
    }
}
