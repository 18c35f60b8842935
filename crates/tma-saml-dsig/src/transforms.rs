#![forbid(unsafe_code)]

//! Reference transforms.
//!
//! A reference starts as a node set (the whole document or the subtree
//! named by `#id`). The enveloped-signature transform removes the
//! `<Signature>` subtree; a canonicalization transform turns the node set
//! into octets. A node set left at the end is serialized with C14N 1.0.

use crate::signature::read_inclusive_prefixes;
use tma_saml_c14n::C14nMode;
use tma_saml_core::{algorithm, ns, Error};
use tma_saml_xml::NodeSet;

/// A transform named by a `<Transform Algorithm="...">` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    EnvelopedSignature,
    Canonicalize {
        mode: C14nMode,
        inclusive_prefixes: Vec<String>,
    },
}

impl Transform {
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Result<Self, Error> {
        let uri = node.attribute(ns::attr::ALGORITHM).unwrap_or("");
        if uri == algorithm::ENVELOPED_SIGNATURE {
            return Ok(Self::EnvelopedSignature);
        }
        match C14nMode::from_uri(uri) {
            Some(mode) => Ok(Self::Canonicalize {
                mode,
                inclusive_prefixes: read_inclusive_prefixes(node),
            }),
            None => Err(Error::UnsupportedAlgorithm(format!("transform: {uri}"))),
        }
    }
}

/// Data flowing between transforms.
enum TransformData {
    Nodes(NodeSet),
    Octets(Vec<u8>),
}

/// Run `transforms` over `input` and return the octets to digest.
///
/// `signature` is the `<Signature>` element the reference belongs to.
pub fn apply(
    doc: &roxmltree::Document<'_>,
    input: NodeSet,
    transforms: &[Transform],
    signature: roxmltree::Node<'_, '_>,
) -> Result<Vec<u8>, Error> {
    let mut data = TransformData::Nodes(input);

    for transform in transforms {
        let TransformData::Nodes(mut nodes) = data else {
            return Err(Error::Transform(
                "transforms after canonicalization are not supported".into(),
            ));
        };
        data = match transform {
            Transform::EnvelopedSignature => {
                nodes.remove_subtree(signature);
                TransformData::Nodes(nodes)
            }
            Transform::Canonicalize {
                mode,
                inclusive_prefixes,
            } => TransformData::Octets(tma_saml_c14n::canonicalize_doc(
                doc,
                *mode,
                Some(&nodes),
                inclusive_prefixes,
            )?),
        };
    }

    match data {
        TransformData::Octets(bytes) => Ok(bytes),
        TransformData::Nodes(nodes) => {
            tma_saml_c14n::canonicalize_doc(doc, C14nMode::Inclusive, Some(&nodes), &[])
        }
    }
}
