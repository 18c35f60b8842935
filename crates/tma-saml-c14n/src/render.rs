#![forbid(unsafe_code)]

//! Rendering pieces shared by the inclusive and exclusive canonicalizers.

use crate::escape;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tma_saml_core::ns;

/// A namespace declaration to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    /// The prefix ("" for default namespace).
    pub prefix: String,
    /// The namespace URI ("" undeclares the default namespace).
    pub uri: String,
}

impl NsDecl {
    pub fn render(&self, out: &mut Vec<u8>) {
        if self.prefix.is_empty() {
            out.extend_from_slice(b" xmlns=\"");
        } else {
            out.extend_from_slice(b" xmlns:");
            out.extend_from_slice(self.prefix.as_bytes());
            out.extend_from_slice(b"=\"");
        }
        out.extend_from_slice(escape::escape_attr(&self.uri).as_bytes());
        out.push(b'"');
    }
}

impl Ord for NsDecl {
    // The default namespace sorts first, then by prefix.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.prefix.is_empty(), other.prefix.is_empty()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => self.prefix.cmp(&other.prefix),
        }
    }
}

impl PartialOrd for NsDecl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An attribute to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// The namespace URI of the attribute ("" for no namespace).
    pub ns_uri: String,
    pub local_name: String,
    /// The name as written in the source (prefix:local or just local).
    pub qualified_name: String,
    pub value: String,
}

impl Attr {
    pub fn from_node(attr: &roxmltree::Attribute<'_, '_>, input: &str) -> Self {
        Self {
            ns_uri: attr.namespace().unwrap_or("").to_owned(),
            local_name: attr.name().to_owned(),
            qualified_name: input[attr.range_qname()].to_owned(),
            value: attr.value().to_owned(),
        }
    }

    /// Prefix used by this attribute, if it is namespaced.
    pub fn prefix(&self) -> Option<&str> {
        if self.ns_uri.is_empty() {
            return None;
        }
        self.qualified_name.split_once(':').map(|(p, _)| p)
    }

    pub fn render(&self, out: &mut Vec<u8>) {
        out.push(b' ');
        out.extend_from_slice(self.qualified_name.as_bytes());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(escape::escape_attr(&self.value).as_bytes());
        out.push(b'"');
    }
}

impl Ord for Attr {
    // Unqualified attributes first, by local name; then by (namespace URI, local name).
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.ns_uri.is_empty(), other.ns_uri.is_empty()) {
            (true, true) => self.local_name.cmp(&other.local_name),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .ns_uri
                .cmp(&other.ns_uri)
                .then_with(|| self.local_name.cmp(&other.local_name)),
        }
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The element's tag name exactly as written in the source.
///
/// roxmltree resolves prefixes away, but C14N must reproduce them.
pub fn qualified_element_name<'input>(node: roxmltree::Node<'_, 'input>) -> &'input str {
    let input = node.document().input_text();
    let tail = &input[node.range().start + 1..];
    let end = tail
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(tail.len());
    &tail[..end]
}

/// Prefix of the element's tag name ("" when unprefixed).
pub fn element_prefix<'input>(node: roxmltree::Node<'_, 'input>) -> &'input str {
    qualified_element_name(node)
        .split_once(':')
        .map_or("", |(p, _)| p)
}

/// Collect the element's attributes, sorted in canonical order.
pub fn sorted_attributes(node: roxmltree::Node<'_, '_>) -> Vec<Attr> {
    let input = node.document().input_text();
    let mut attrs: Vec<Attr> = node
        .attributes()
        .map(|a| Attr::from_node(&a, input))
        .collect();
    attrs.sort();
    attrs
}

/// In-scope namespace bindings of an element, keyed by prefix ("" = default).
///
/// The `xml` prefix and an undeclared default namespace are left out.
pub fn inscope_namespaces(node: roxmltree::Node<'_, '_>) -> BTreeMap<String, String> {
    node.namespaces()
        .filter(|n| !n.uri().is_empty() && n.uri() != ns::XML)
        .map(|n| (n.name().unwrap_or("").to_owned(), n.uri().to_owned()))
        .collect()
}

/// Write the opening tag with the given declarations and attributes.
pub fn write_start_tag(out: &mut Vec<u8>, name: &str, decls: &[NsDecl], attrs: &[Attr]) {
    out.push(b'<');
    out.extend_from_slice(name.as_bytes());
    for decl in decls {
        decl.render(out);
    }
    for attr in attrs {
        attr.render(out);
    }
    out.push(b'>');
}

pub fn write_end_tag(out: &mut Vec<u8>, name: &str) {
    out.extend_from_slice(b"</");
    out.extend_from_slice(name.as_bytes());
    out.push(b'>');
}

/// Write a comment or processing instruction, adding the line breaks C14N
/// requires around nodes that sit outside the document element.
pub fn write_misc(out: &mut Vec<u8>, node: roxmltree::Node<'_, '_>) {
    let top_level = node.parent().is_some_and(|p| p.is_root());
    if top_level && node.prev_siblings().skip(1).any(|s| s.is_element()) {
        out.push(b'\n');
    }

    if let Some(pi) = node.pi() {
        out.extend_from_slice(b"<?");
        out.extend_from_slice(pi.target.as_bytes());
        if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
            out.push(b' ');
            out.extend_from_slice(escape::escape_pi(value).as_bytes());
        }
        out.extend_from_slice(b"?>");
    } else {
        out.extend_from_slice(b"<!--");
        out.extend_from_slice(node.text().unwrap_or("").as_bytes());
        out.extend_from_slice(b"-->");
    }

    if top_level && node.next_siblings().skip(1).any(|s| s.is_element()) {
        out.push(b'\n');
    }
}
