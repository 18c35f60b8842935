#![forbid(unsafe_code)]

//! Flattening `saml:AttributeStatement` into name → value.

use crate::error::{Result, SamlError};
use crate::verifier::VerifiedAssertion;
use std::collections::BTreeMap;
use tma_saml_core::ns;
use tma_saml_xml::document::{find_child_element, find_child_elements};

/// Attribute `Name` → first `AttributeValue` text.
pub type AttributeMap = BTreeMap<String, String>;

pub fn extract_attributes(assertion: &VerifiedAssertion) -> Result<AttributeMap> {
    assertion.with_assertion(attributes_of)
}

/// Read every `saml:Attribute` of the assertion's attribute statements.
///
/// Multi-valued attributes keep their first value; an attribute without a
/// value maps to `""`. Attributes without a `Name` are skipped.
pub fn attributes_of(assertion: roxmltree::Node<'_, '_>) -> Result<AttributeMap> {
    let statements =
        find_child_elements(assertion, ns::SAML2_ASSERTION, ns::node::ATTRIBUTE_STATEMENT);
    if statements.is_empty() {
        return Err(SamlError::malformed("assertion has no AttributeStatement"));
    }

    let mut attrs = AttributeMap::new();
    for attribute in statements
        .into_iter()
        .flat_map(|s| find_child_elements(s, ns::SAML2_ASSERTION, ns::node::ATTRIBUTE))
    {
        let Some(name) = attribute.attribute(ns::attr::NAME) else {
            continue;
        };
        let value = find_child_element(attribute, ns::SAML2_ASSERTION, ns::node::ATTRIBUTE_VALUE)
            .map(text_content)
            .unwrap_or_default();
        attrs.entry(name.to_owned()).or_insert(value);
    }
    tracing::debug!(count = attrs.len(), "attributes extracted");
    Ok(attrs)
}

/// All descendant text of `node`, joined across comments.
fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(body: &str) -> Result<AttributeMap> {
        let xml = format!(
            r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion">{body}</saml:Assertion>"#
        );
        let doc = tma_saml_xml::parse(&xml).unwrap();
        attributes_of(doc.root_element())
    }

    #[test]
    fn first_value_wins() {
        let attrs = extract(
            r#"<saml:AttributeStatement>
                 <saml:Attribute Name="uid"><saml:AttributeValue>987654329</saml:AttributeValue><saml:AttributeValue>123</saml:AttributeValue></saml:Attribute>
                 <saml:Attribute Name="uid"><saml:AttributeValue>111</saml:AttributeValue></saml:Attribute>
               </saml:AttributeStatement>"#,
        )
        .unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["uid"], "987654329");
    }

    #[test]
    fn empty_and_nameless_attributes() {
        let attrs = extract(
            r#"<saml:AttributeStatement><saml:Attribute Name="empty"/><saml:Attribute><saml:AttributeValue>x</saml:AttributeValue></saml:Attribute></saml:AttributeStatement>"#,
        )
        .unwrap();
        assert_eq!(attrs.get("empty").map(String::as_str), Some(""));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn comment_inside_value_does_not_truncate() {
        let attrs = extract(
            r#"<saml:AttributeStatement><saml:Attribute Name="kvk"><saml:AttributeValue>1234<!---->5678</saml:AttributeValue></saml:Attribute></saml:AttributeStatement>"#,
        )
        .unwrap();
        assert_eq!(attrs["kvk"], "12345678");
    }

    #[test]
    fn foreign_namespace_is_ignored() {
        let attrs = extract(
            r#"<saml:AttributeStatement><x:Attribute xmlns:x="urn:other" Name="uid"/></saml:AttributeStatement>"#,
        )
        .unwrap();
        assert!(attrs.is_empty());
    }

    #[test]
    fn missing_statement_is_malformed() {
        assert!(matches!(extract(""), Err(SamlError::MalformedToken(_))));
    }
}
