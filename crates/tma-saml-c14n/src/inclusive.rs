#![forbid(unsafe_code)]

//! Canonical XML 1.0 (inclusive C14N).
//!
//! Algorithm URI: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315`
//!
//! Every in-scope namespace that the nearest rendered ancestor did not
//! already declare is output. In a document subset, `xml:*` attributes of
//! omitted ancestors are carried onto the apex element.

use crate::escape;
use crate::render::{self, Attr, NsDecl};
use std::collections::BTreeMap;
use tma_saml_core::{ns, Error};
use tma_saml_xml::NodeSet;

/// Canonicalize a document using Inclusive C14N 1.0.
pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
) -> Result<Vec<u8>, Error> {
    let ctx = C14n {
        with_comments,
        node_set,
    };
    let mut output = Vec::new();
    ctx.process(doc.root(), &mut output, &BTreeMap::new());
    Ok(output)
}

struct C14n<'a> {
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
}

impl C14n<'_> {
    fn is_visible(&self, node: roxmltree::Node<'_, '_>) -> bool {
        self.node_set.map_or(true, |set| set.contains(node))
    }

    fn process(
        &self,
        node: roxmltree::Node<'_, '_>,
        output: &mut Vec<u8>,
        rendered: &BTreeMap<String, String>,
    ) {
        match node.node_type() {
            roxmltree::NodeType::Root => {
                for child in node.children() {
                    self.process(child, output, rendered);
                }
            }
            roxmltree::NodeType::Element => self.process_element(node, output, rendered),
            roxmltree::NodeType::Text => {
                if self.is_visible(node) {
                    let text = node.text().unwrap_or("");
                    output.extend_from_slice(escape::escape_text(text).as_bytes());
                }
            }
            roxmltree::NodeType::Comment => {
                if self.with_comments && self.is_visible(node) {
                    render::write_misc(output, node);
                }
            }
            roxmltree::NodeType::PI => {
                if self.is_visible(node) {
                    render::write_misc(output, node);
                }
            }
        }
    }

    fn process_element(
        &self,
        node: roxmltree::Node<'_, '_>,
        output: &mut Vec<u8>,
        rendered: &BTreeMap<String, String>,
    ) {
        if !self.is_visible(node) {
            for child in node.children() {
                self.process(child, output, rendered);
            }
            return;
        }

        let inscope = render::inscope_namespaces(node);
        let mut decls: Vec<NsDecl> = inscope
            .iter()
            .filter(|(prefix, uri)| rendered.get(*prefix) != Some(*uri))
            .map(|(prefix, uri)| NsDecl {
                prefix: prefix.clone(),
                uri: uri.clone(),
            })
            .collect();
        if !inscope.contains_key("") && rendered.get("").is_some_and(|uri| !uri.is_empty()) {
            decls.push(NsDecl {
                prefix: String::new(),
                uri: String::new(),
            });
        }
        decls.sort();

        let mut attrs = render::sorted_attributes(node);
        let parent_omitted = node
            .parent()
            .map_or(true, |p| !p.is_element() || !self.is_visible(p));
        if self.node_set.is_some() && parent_omitted {
            attrs.extend(inherited_xml_attrs(node, &attrs));
            attrs.sort();
        }

        let name = render::qualified_element_name(node);
        render::write_start_tag(output, name, &decls, &attrs);

        let mut child_rendered = rendered.clone();
        for decl in decls {
            child_rendered.insert(decl.prefix, decl.uri);
        }
        for child in node.children() {
            self.process(child, output, &child_rendered);
        }

        render::write_end_tag(output, name);
    }
}

/// `xml:*` attributes of ancestors not already present on `node`.
/// The nearest ancestor's value wins.
fn inherited_xml_attrs(node: roxmltree::Node<'_, '_>, own: &[Attr]) -> Vec<Attr> {
    let mut inherited: BTreeMap<&str, &str> = BTreeMap::new();
    for ancestor in node.ancestors().skip(1).filter(|n| n.is_element()) {
        for attr in ancestor.attributes() {
            if attr.namespace() == Some(ns::XML) {
                inherited.entry(attr.name()).or_insert(attr.value());
            }
        }
    }

    inherited
        .into_iter()
        .filter(|(name, _)| !own.iter().any(|a| a.ns_uri == ns::XML && a.local_name == *name))
        .map(|(name, value)| Attr {
            ns_uri: ns::XML.to_owned(),
            local_name: name.to_owned(),
            qualified_name: format!("xml:{name}"),
            value: value.to_owned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_apex_inherits_xml_attributes() {
        let xml = r#"<a xml:lang="nl"><b id="x"><c/></b></a>"#;
        let doc = tma_saml_xml::parse(xml).unwrap();
        let b = doc.descendants().find(|n| n.has_tag_name("b")).unwrap();
        let set = NodeSet::tree_without_comments(b);
        let out = canonicalize(&doc, false, Some(&set)).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<b id="x" xml:lang="nl"><c></c></b>"#
        );
    }

    #[test]
    fn whole_document_keeps_xml_attributes_in_place() {
        let xml = r#"<a xml:lang="nl"><b/></a>"#;
        let doc = tma_saml_xml::parse(xml).unwrap();
        let out = canonicalize(&doc, false, None).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<a xml:lang="nl"><b></b></a>"#
        );
    }

    #[test]
    fn top_level_comments_get_line_breaks() {
        let xml = "<!--head--><a/><!--tail-->";
        let doc = tma_saml_xml::parse(xml).unwrap();
        let out = canonicalize(&doc, true, None).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<!--head-->\n<a></a>\n<!--tail-->");
    }
}
