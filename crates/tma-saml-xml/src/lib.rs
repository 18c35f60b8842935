#![forbid(unsafe_code)]

//! XML helpers over `roxmltree` for signature processing.
//!
//! Provides element lookup, ID registration and the `NodeSet` used by
//! canonicalization and the enveloped-signature transform.

pub mod document;
pub mod nodeset;

pub use nodeset::NodeSet;

/// Upper bound on nodes in a single token.
const NODES_LIMIT: u32 = 100_000;

/// Return roxmltree parsing options for untrusted tokens. DTDs are rejected.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: false,
        nodes_limit: NODES_LIMIT,
    }
}

/// Parse XML text with [`parsing_options`].
pub fn parse(text: &str) -> Result<roxmltree::Document<'_>, tma_saml_core::Error> {
    roxmltree::Document::parse_with_options(text, parsing_options())
        .map_err(|e| tma_saml_core::Error::XmlParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_dtd() {
        let xml = r#"<!DOCTYPE a [<!ENTITY x "y">]><a>&x;</a>"#;
        assert!(parse(xml).is_err());
    }

    #[test]
    fn parses_plain_document() {
        let doc = parse("<a><b/></a>").unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "a");
    }
}
