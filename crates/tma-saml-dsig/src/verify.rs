#![forbid(unsafe_code)]

//! XML-DSig signature verification against a single, explicitly given key.
//!
//! Processing order:
//! 1. Parse the document, register ID attributes (duplicates rejected)
//! 2. Read `<SignedInfo>`: CanonicalizationMethod, SignatureMethod, References
//! 3. For each `<Reference>`: resolve the URI, run transforms, compare digests
//! 4. Canonicalize `<SignedInfo>`
//! 5. Verify `<SignatureValue>` with the given key
//!
//! References are checked first, so a modified document reports a digest
//! mismatch even when the key is also wrong.

use crate::signature::SignatureElement;
use crate::transforms;
use std::collections::HashMap;
use tma_saml_core::Error;
use tma_saml_keys::Key;
use tma_saml_xml::document::{build_id_map, parse_same_document_ref, resolve_id, DEFAULT_ID_ATTRS};
use tma_saml_xml::NodeSet;

/// What the first `<Reference>` of a verified signature covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedTarget {
    /// `URI=""`: the whole document.
    Document,
    /// `URI="#id"`: the element carrying that ID.
    Id(String),
}

/// A document whose signature verified. Only [`verify_with_key`] builds one.
#[derive(Debug, Clone)]
pub struct VerifiedDocument {
    xml: String,
    target: SignedTarget,
}

impl VerifiedDocument {
    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn target(&self) -> &SignedTarget {
        &self.target
    }

    /// Re-parse the verified text.
    pub fn parse(&self) -> Result<roxmltree::Document<'_>, Error> {
        tma_saml_xml::parse(&self.xml)
    }

    /// The element the signature covers, inside a document returned by
    /// [`VerifiedDocument::parse`].
    pub fn signed_node<'a, 'input>(
        &self,
        doc: &'a roxmltree::Document<'input>,
    ) -> Result<roxmltree::Node<'a, 'input>, Error> {
        match &self.target {
            SignedTarget::Document => Ok(doc.root_element()),
            SignedTarget::Id(id) => {
                let id_map = build_id_map(doc, &DEFAULT_ID_ATTRS)?;
                resolve_id(doc, &id_map, id)
            }
        }
    }
}

/// Verify the enveloped signature in `xml` with `key`.
///
/// Errors from malformed input (parse failures, missing elements, bad
/// base64, unsupported algorithms) are distinct from
/// [`Error::DigestMismatch`] and [`Error::SignatureInvalid`]; see
/// [`Error::is_signature_failure`].
pub fn verify_with_key(xml: &str, key: &Key) -> Result<VerifiedDocument, Error> {
    let doc = tma_saml_xml::parse(xml)?;
    let id_map = build_id_map(&doc, &DEFAULT_ID_ATTRS)?;
    let signature = SignatureElement::locate(&doc)?;

    let mut target = None;
    for (index, reference) in signature.references.iter().enumerate() {
        let (nodes, reference_target) = resolve_reference(&doc, &id_map, reference.uri)?;
        target.get_or_insert(reference_target);

        let expected = crate::decode_base64(
            reference.digest_value.text().unwrap_or(""),
            "DigestValue",
        )?;
        let octets = transforms::apply(&doc, nodes, &reference.transforms, signature.node)?;
        if reference.digest.digest(&octets) != expected {
            return Err(Error::DigestMismatch {
                index,
                uri: reference.uri.to_owned(),
            });
        }
    }

    let signed_info = tma_saml_c14n::canonicalize_doc(
        &doc,
        signature.c14n_mode,
        Some(&NodeSet::tree_without_comments(signature.signed_info)),
        &signature.inclusive_prefixes,
    )?;
    let signature_value = crate::decode_base64(
        signature.signature_value()?.text().unwrap_or(""),
        "SignatureValue",
    )?;

    let verifying_key = key.to_verifying_key();
    if !signature
        .method
        .verify(&verifying_key, &signed_info, &signature_value)?
    {
        return Err(Error::SignatureInvalid(
            "signature value does not match SignedInfo".into(),
        ));
    }

    Ok(VerifiedDocument {
        xml: xml.to_owned(),
        target: target.unwrap_or(SignedTarget::Document),
    })
}

/// Resolve a same-document reference URI to its initial node set.
pub(crate) fn resolve_reference(
    doc: &roxmltree::Document<'_>,
    id_map: &HashMap<String, roxmltree::NodeId>,
    uri: &str,
) -> Result<(NodeSet, SignedTarget), Error> {
    if uri.is_empty() {
        return Ok((NodeSet::all_without_comments(doc), SignedTarget::Document));
    }
    match parse_same_document_ref(uri) {
        Some(id) => {
            let node = resolve_id(doc, id_map, id)?;
            Ok((NodeSet::tree_without_comments(node), SignedTarget::Id(id.to_owned())))
        }
        None => Err(Error::InvalidUri(format!("external URI not supported: {uri}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_document_is_malformed() {
        let key = tma_saml_keys::load_x509_cert_pem(include_bytes!(
            "../../../test-data/keys/primary-cert.pem"
        ))
        .unwrap();
        let err = verify_with_key("<a/>", &key).unwrap_err();
        assert!(matches!(err, Error::MissingElement(_)));
        assert!(!err.is_signature_failure());
    }

    #[test]
    fn external_reference_is_rejected() {
        let doc = tma_saml_xml::parse("<a/>").unwrap();
        let err = resolve_reference(&doc, &HashMap::new(), "http://example.org/x").unwrap_err();
        assert!(matches!(err, Error::InvalidUri(_)));
    }
}
