#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0 (exc-C14N).
//!
//! Algorithm URI: `http://www.w3.org/2001/10/xml-exc-c14n#`
//!
//! Only "visibly utilized" namespace declarations are output. A prefix is
//! visibly utilized by an element when:
//! 1. the element's tag name uses it, or
//! 2. one of the element's attributes uses it, or
//! 3. it appears in the InclusiveNamespaces PrefixList.

use crate::escape;
use crate::render::{self, NsDecl};
use std::collections::{BTreeMap, BTreeSet};
use tma_saml_core::Error;
use tma_saml_xml::NodeSet;

/// Canonicalize using Exclusive C14N 1.0.
pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let forced = inclusive_prefixes
        .iter()
        .map(|p| if p == "#default" { String::new() } else { p.clone() })
        .collect();
    let ctx = ExcC14n {
        with_comments,
        node_set,
        forced_prefixes: forced,
    };
    let mut output = Vec::new();
    ctx.process(doc.root(), &mut output, &BTreeMap::new());
    Ok(output)
}

struct ExcC14n<'a> {
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
    forced_prefixes: BTreeSet<String>,
}

impl ExcC14n<'_> {
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
            // Declarations only appear on visible start tags.
            for child in node.children() {
                self.process(child, output, rendered);
            }
            return;
        }

        let attrs = render::sorted_attributes(node);

        let mut utilized: BTreeSet<String> = self.forced_prefixes.clone();
        utilized.insert(render::element_prefix(node).to_owned());
        for attr in &attrs {
            if let Some(prefix) = attr.prefix() {
                utilized.insert(prefix.to_owned());
            }
        }
        utilized.remove("xml");

        let inscope = render::inscope_namespaces(node);
        let mut decls = Vec::new();
        for prefix in &utilized {
            match inscope.get(prefix) {
                Some(uri) if rendered.get(prefix) != Some(uri) => decls.push(NsDecl {
                    prefix: prefix.clone(),
                    uri: uri.clone(),
                }),
                Some(_) => {}
                None if prefix.is_empty() => {
                    // The default namespace is no longer in scope.
                    if rendered.get("").is_some_and(|uri| !uri.is_empty()) {
                        decls.push(NsDecl {
                            prefix: String::new(),
                            uri: String::new(),
                        });
                    }
                }
                None => {}
            }
        }
        decls.sort();

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

#[cfg(test)]
mod tests {
    use super::*;

    fn exc(xml: &str) -> String {
        let doc = tma_saml_xml::parse(xml).unwrap();
        String::from_utf8(canonicalize(&doc, false, None, &[]).unwrap()).unwrap()
    }

    #[test]
    fn empty_elements_are_expanded() {
        assert_eq!(exc("<a><b/></a>"), "<a><b></b></a>");
    }

    #[test]
    fn default_namespace_is_undeclared_when_left() {
        assert_eq!(
            exc(r#"<a xmlns="urn:d"><b xmlns=""/></a>"#),
            r#"<a xmlns="urn:d"><b xmlns=""></b></a>"#
        );
    }

    #[test]
    fn redeclared_prefix_is_rendered_again() {
        assert_eq!(
            exc(r#"<p:a xmlns:p="urn:1"><p:b xmlns:p="urn:2"/></p:a>"#),
            r#"<p:a xmlns:p="urn:1"><p:b xmlns:p="urn:2"></p:b></p:a>"#
        );
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(exc("<a>x &amp; y &lt; z</a>"), "<a>x &amp; y &lt; z</a>");
    }

    #[test]
    fn removed_subtree_is_skipped() {
        let doc = tma_saml_xml::parse("<a><sig><x/></sig><b>1</b></a>").unwrap();
        let sig = doc.descendants().find(|n| n.has_tag_name("sig")).unwrap();
        let mut set = NodeSet::all_without_comments(&doc);
        set.remove_subtree(sig);
        let out = canonicalize(&doc, false, Some(&set), &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<a><b>1</b></a>");
    }
}
