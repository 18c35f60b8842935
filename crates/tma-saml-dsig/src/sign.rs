#![forbid(unsafe_code)]

//! XML-DSig signature creation from a template.
//!
//! The template carries a complete `<Signature>` whose `<DigestValue>` and
//! `<SignatureValue>` elements are empty; both are filled in.

use crate::signature::SignatureElement;
use crate::transforms;
use crate::verify::resolve_reference;
use std::ops::Range;
use tma_saml_core::Error;
use tma_saml_keys::Key;
use tma_saml_xml::document::{build_id_map, DEFAULT_ID_ATTRS};
use tma_saml_xml::NodeSet;

/// Sign an XML template with `key`, returning the signed document.
pub fn sign_template(template_xml: &str, key: &Key) -> Result<String, Error> {
    let signing_key = key
        .to_signing_key()
        .ok_or_else(|| Error::Key("private key required for signing".into()))?;

    // Digests first: the enveloped transform keeps DigestValue out of them.
    let with_digests = {
        let doc = tma_saml_xml::parse(template_xml)?;
        let id_map = build_id_map(&doc, &DEFAULT_ID_ATTRS)?;
        let signature = SignatureElement::locate(&doc)?;

        let mut edits = Vec::with_capacity(signature.references.len());
        for reference in &signature.references {
            let (nodes, _) = resolve_reference(&doc, &id_map, reference.uri)?;
            let octets = transforms::apply(&doc, nodes, &reference.transforms, signature.node)?;
            let value = crate::encode_base64(&reference.digest.digest(&octets));
            edits.push(fill_element(reference.digest_value, &value));
        }
        splice(template_xml, edits)
    };

    let doc = tma_saml_xml::parse(&with_digests)?;
    let signature = SignatureElement::locate(&doc)?;
    let signed_info = tma_saml_c14n::canonicalize_doc(
        &doc,
        signature.c14n_mode,
        Some(&NodeSet::tree_without_comments(signature.signed_info)),
        &signature.inclusive_prefixes,
    )?;
    let value = crate::encode_base64(&signature.method.sign(&signing_key, &signed_info)?);
    let edit = fill_element(signature.signature_value()?, &value);
    Ok(splice(&with_digests, vec![edit]))
}

/// Replacement text for an element, keeping its tag name but not its content.
fn fill_element(node: roxmltree::Node<'_, '_>, text: &str) -> (Range<usize>, String) {
    let name = tma_saml_c14n::render::qualified_element_name(node);
    (node.range(), format!("<{name}>{text}</{name}>"))
}

fn splice(xml: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
    let mut out = xml.to_owned();
    for (range, text) in edits {
        out.replace_range(range, &text);
    }
    out
}
