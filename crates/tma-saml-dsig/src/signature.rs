#![forbid(unsafe_code)]

//! The parsed shape of a `<Signature>` element.

use crate::transforms::Transform;
use tma_saml_c14n::C14nMode;
use tma_saml_core::{ns, Error};
use tma_saml_crypto::{DigestMethod, SignatureMethod};
use tma_saml_xml::document::{find_child_element, find_child_elements, find_element, require_attribute, require_child_element};

/// A `<Signature>` and the algorithms its `<SignedInfo>` names.
pub struct SignatureElement<'a, 'input> {
    pub node: roxmltree::Node<'a, 'input>,
    pub signed_info: roxmltree::Node<'a, 'input>,
    pub c14n_mode: C14nMode,
    pub inclusive_prefixes: Vec<String>,
    pub method: SignatureMethod,
    pub references: Vec<ReferenceElement<'a, 'input>>,
}

/// One `<Reference>` inside `<SignedInfo>`.
pub struct ReferenceElement<'a, 'input> {
    pub node: roxmltree::Node<'a, 'input>,
    pub uri: &'a str,
    pub digest: DigestMethod,
    pub transforms: Vec<Transform>,
    pub digest_value: roxmltree::Node<'a, 'input>,
}

impl<'a, 'input> SignatureElement<'a, 'input> {
    /// Locate the first `<ds:Signature>` in the document and read its
    /// `<SignedInfo>`.
    pub fn locate(doc: &'a roxmltree::Document<'input>) -> Result<Self, Error> {
        let node = find_element(doc.root(), ns::DSIG, ns::node::SIGNATURE)
            .ok_or_else(|| Error::MissingElement(ns::node::SIGNATURE.into()))?;
        let signed_info = require_child_element(node, ns::DSIG, ns::node::SIGNED_INFO)?;

        let c14n_node =
            require_child_element(signed_info, ns::DSIG, ns::node::CANONICALIZATION_METHOD)?;
        let c14n_uri = require_attribute(c14n_node, ns::attr::ALGORITHM)?;
        let c14n_mode = C14nMode::from_uri(c14n_uri)
            .ok_or_else(|| Error::UnsupportedAlgorithm(format!("C14N: {c14n_uri}")))?;

        let method_node = require_child_element(signed_info, ns::DSIG, ns::node::SIGNATURE_METHOD)?;
        let method = SignatureMethod::from_uri(require_attribute(method_node, ns::attr::ALGORITHM)?)?;

        let references = find_child_elements(signed_info, ns::DSIG, ns::node::REFERENCE)
            .into_iter()
            .map(ReferenceElement::read)
            .collect::<Result<Vec<_>, _>>()?;
        if references.is_empty() {
            return Err(Error::MissingElement(ns::node::REFERENCE.into()));
        }

        Ok(Self {
            node,
            signed_info,
            c14n_mode,
            inclusive_prefixes: read_inclusive_prefixes(c14n_node),
            method,
            references,
        })
    }

    pub fn signature_value(&self) -> Result<roxmltree::Node<'a, 'input>, Error> {
        require_child_element(self.node, ns::DSIG, ns::node::SIGNATURE_VALUE)
    }
}

impl<'a, 'input> ReferenceElement<'a, 'input> {
    fn read(node: roxmltree::Node<'a, 'input>) -> Result<Self, Error> {
        let digest_node = require_child_element(node, ns::DSIG, ns::node::DIGEST_METHOD)?;
        let digest = DigestMethod::from_uri(require_attribute(digest_node, ns::attr::ALGORITHM)?)?;

        let transforms = match find_child_element(node, ns::DSIG, ns::node::TRANSFORMS) {
            Some(list) => find_child_elements(list, ns::DSIG, ns::node::TRANSFORM)
                .into_iter()
                .map(Transform::from_node)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            node,
            uri: node.attribute(ns::attr::URI).unwrap_or(""),
            digest,
            transforms,
            digest_value: require_child_element(node, ns::DSIG, ns::node::DIGEST_VALUE)?,
        })
    }
}

/// PrefixList of an `<ec:InclusiveNamespaces>` child, if any.
pub(crate) fn read_inclusive_prefixes(node: roxmltree::Node<'_, '_>) -> Vec<String> {
    find_child_element(node, ns::EXC_C14N, ns::node::INCLUSIVE_NAMESPACES)
        .and_then(|n| n.attribute(ns::attr::PREFIX_LIST))
        .map(|list| list.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}
