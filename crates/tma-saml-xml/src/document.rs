#![forbid(unsafe_code)]

//! Element lookup and ID registration on parsed documents.

use std::collections::HashMap;
use tma_saml_core::Error;

/// Attribute names registered as element IDs.
pub const DEFAULT_ID_ATTRS: [&str; 3] = ["ID", "Id", "id"];

/// True if `node` is an element named `local_name` in namespace `ns_uri`.
pub fn is_element(node: roxmltree::Node<'_, '_>, ns_uri: &str, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace().unwrap_or("") == ns_uri
}

/// Find the first descendant-or-self element with the given namespace and local name.
pub fn find_element<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.descendants().find(|n| is_element(*n, ns_uri, local_name))
}

/// Find the first child element with the given namespace and local name.
pub fn find_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent.children().find(|n| is_element(*n, ns_uri, local_name))
}

/// Collect all child elements with the given namespace and local name.
pub fn find_child_elements<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .filter(|n| is_element(*n, ns_uri, local_name))
        .collect()
}

/// Like [`find_child_element`] but fails with `MissingElement`.
pub fn require_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Result<roxmltree::Node<'a, 'input>, Error> {
    find_child_element(parent, ns_uri, local_name)
        .ok_or_else(|| Error::MissingElement(local_name.to_owned()))
}

/// Read a required attribute.
pub fn require_attribute<'a>(
    node: roxmltree::Node<'a, '_>,
    name: &str,
) -> Result<&'a str, Error> {
    node.attribute(name).ok_or_else(|| {
        Error::MissingAttribute(format!("{name} on {}", node.tag_name().name()))
    })
}

/// Build the ID → NodeId mapping for a parsed document.
///
/// An ID value that occurs twice is an error: with two candidates a
/// reference could be checked against one element while the application
/// reads the other.
pub fn build_id_map(
    doc: &roxmltree::Document<'_>,
    attr_names: &[&str],
) -> Result<HashMap<String, roxmltree::NodeId>, Error> {
    let mut map = HashMap::new();
    for node in doc.descendants().filter(|n| n.is_element()) {
        for attr_name in attr_names {
            if let Some(val) = node.attribute(*attr_name) {
                if map.insert(val.to_owned(), node.id()).is_some() {
                    return Err(Error::XmlStructure(format!("duplicate ID value: {val}")));
                }
            }
        }
    }
    Ok(map)
}

/// Parse a same-document reference (e.g., `#foo` → `foo`).
pub fn parse_same_document_ref(uri: &str) -> Option<&str> {
    uri.strip_prefix('#')
}

/// Resolve an ID value in a parsed document using a pre-built ID map.
pub fn resolve_id<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    id_map: &HashMap<String, roxmltree::NodeId>,
    id: &str,
) -> Result<roxmltree::Node<'a, 'input>, Error> {
    id_map
        .get(id)
        .and_then(|nid| doc.get_node(*nid))
        .ok_or_else(|| Error::InvalidUri(format!("ID not found: {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tma_saml_core::ns;

    #[test]
    fn finds_namespaced_children() {
        let xml = r#"<s:A xmlns:s="urn:oasis:names:tc:SAML:2.0:assertion"><s:Issuer>x</s:Issuer><Issuer/></s:A>"#;
        let doc = crate::parse(xml).unwrap();
        let root = doc.root_element();
        let found = find_child_elements(root, ns::SAML2_ASSERTION, "Issuer");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text(), Some("x"));
        assert!(require_child_element(root, ns::SAML2_ASSERTION, "Subject").is_err());
    }

    #[test]
    fn id_map_resolves_references() {
        let doc = crate::parse(r#"<a ID="one"><b Id="two"/></a>"#).unwrap();
        let map = build_id_map(&doc, &DEFAULT_ID_ATTRS).unwrap();
        let id = parse_same_document_ref("#two").unwrap();
        let node = resolve_id(&doc, &map, id).unwrap();
        assert_eq!(node.tag_name().name(), "b");
        assert!(resolve_id(&doc, &map, "three").is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doc = crate::parse(r#"<a ID="x"><b ID="x"/></a>"#).unwrap();
        assert!(matches!(
            build_id_map(&doc, &DEFAULT_ID_ATTRS),
            Err(Error::XmlStructure(_))
        ));
    }
}
