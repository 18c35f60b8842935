#![forbid(unsafe_code)]

//! XML Canonicalization (C14N) for signed SAML tokens.
//!
//! Implements the four variants a broker can put in `<SignedInfo>` or a
//! `<Transform>`:
//! - Canonical XML 1.0 (with and without comments)
//! - Exclusive Canonical XML 1.0 (with and without comments)

pub mod escape;
pub mod exclusive;
pub mod inclusive;
pub mod render;

use tma_saml_core::{algorithm, Error};
use tma_saml_xml::NodeSet;

/// The canonicalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C14nMode {
    /// Canonical XML 1.0
    Inclusive,
    /// Canonical XML 1.0 with comments
    InclusiveWithComments,
    /// Exclusive Canonical XML 1.0
    Exclusive,
    /// Exclusive Canonical XML 1.0 with comments
    ExclusiveWithComments,
}

impl C14nMode {
    /// Get the algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => algorithm::C14N,
            Self::InclusiveWithComments => algorithm::C14N_WITH_COMMENTS,
            Self::Exclusive => algorithm::EXC_C14N,
            Self::ExclusiveWithComments => algorithm::EXC_C14N_WITH_COMMENTS,
        }
    }

    /// Parse a C14N mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::C14N => Some(Self::Inclusive),
            algorithm::C14N_WITH_COMMENTS => Some(Self::InclusiveWithComments),
            algorithm::EXC_C14N => Some(Self::Exclusive),
            algorithm::EXC_C14N_WITH_COMMENTS => Some(Self::ExclusiveWithComments),
            _ => None,
        }
    }

    pub fn with_comments(&self) -> bool {
        matches!(self, Self::InclusiveWithComments | Self::ExclusiveWithComments)
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive | Self::ExclusiveWithComments)
    }
}

/// Canonicalize XML text.
///
/// - `xml`: the raw XML text
/// - `mode`: which C14N variant to use
/// - `node_set`: optional node set (for document-subset canonicalization)
/// - `inclusive_prefixes`: for exclusive C14N, the InclusiveNamespaces PrefixList
pub fn canonicalize(
    xml: &str,
    mode: C14nMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let doc = tma_saml_xml::parse(xml)?;
    canonicalize_doc(&doc, mode, node_set, inclusive_prefixes)
}

/// Canonicalize a pre-parsed document.
pub fn canonicalize_doc(
    doc: &roxmltree::Document<'_>,
    mode: C14nMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    if mode.is_exclusive() {
        exclusive::canonicalize(doc, mode.with_comments(), node_set, inclusive_prefixes)
    } else {
        inclusive::canonicalize(doc, mode.with_comments(), node_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<a:root xmlns:a="urn:a" xmlns:b="urn:b"><a:child z="2" b:attr="1" c="3"/><!-- note --></a:root>"#;

    #[test]
    fn mode_uri_round_trip() {
        for mode in [
            C14nMode::Inclusive,
            C14nMode::InclusiveWithComments,
            C14nMode::Exclusive,
            C14nMode::ExclusiveWithComments,
        ] {
            assert_eq!(C14nMode::from_uri(mode.uri()), Some(mode));
        }
        assert_eq!(C14nMode::from_uri("urn:unknown"), None);
    }

    #[test]
    fn exclusive_renders_only_utilized_namespaces() {
        let out = canonicalize(DOC, C14nMode::Exclusive, None, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<a:root xmlns:a="urn:a"><a:child xmlns:b="urn:b" c="3" z="2" b:attr="1"></a:child></a:root>"#
        );
    }

    #[test]
    fn inclusive_renders_all_namespaces_on_root() {
        let out = canonicalize(DOC, C14nMode::Inclusive, None, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<a:root xmlns:a="urn:a" xmlns:b="urn:b"><a:child c="3" z="2" b:attr="1"></a:child></a:root>"#
        );
    }

    #[test]
    fn comments_kept_only_when_requested() {
        let out = canonicalize(DOC, C14nMode::ExclusiveWithComments, None, &[]).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("<!-- note -->"));
    }

    #[test]
    fn subset_apex_carries_inherited_namespaces() {
        let doc = tma_saml_xml::parse(DOC).unwrap();
        let child = doc.descendants().find(|n| n.has_tag_name(("urn:a", "child"))).unwrap();
        let set = NodeSet::tree_without_comments(child);

        let exc = canonicalize_doc(&doc, C14nMode::Exclusive, Some(&set), &[]).unwrap();
        assert_eq!(
            String::from_utf8(exc).unwrap(),
            r#"<a:child xmlns:a="urn:a" xmlns:b="urn:b" c="3" z="2" b:attr="1"></a:child>"#
        );

        let inc = canonicalize_doc(&doc, C14nMode::Inclusive, Some(&set), &[]).unwrap();
        assert_eq!(
            String::from_utf8(inc).unwrap(),
            r#"<a:child xmlns:a="urn:a" xmlns:b="urn:b" c="3" z="2" b:attr="1"></a:child>"#
        );
    }

    #[test]
    fn inclusive_prefix_list_forces_declaration() {
        let xml = r#"<r xmlns:x="urn:x"><c/></r>"#;
        let plain = canonicalize(xml, C14nMode::Exclusive, None, &[]).unwrap();
        assert_eq!(String::from_utf8(plain).unwrap(), "<r><c></c></r>");
        let listed = canonicalize(xml, C14nMode::Exclusive, None, &["x".to_owned()]).unwrap();
        assert_eq!(
            String::from_utf8(listed).unwrap(),
            r#"<r xmlns:x="urn:x"><c></c></r>"#
        );
    }
}
