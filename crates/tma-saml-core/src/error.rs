#![forbid(unsafe_code)]

/// Errors produced by the XML signature engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("invalid XML structure: {0}")]
    XmlStructure(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),

    /// A `<Reference>` digest did not match the referenced content.
    ///
    /// `index` is the zero-based position of the reference inside
    /// `<SignedInfo>`.
    #[error("Digest mismatch for reference {index}")]
    DigestMismatch { index: usize, uri: String },

    #[error("canonicalization error: {0}")]
    Canonicalization(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("invalid URI reference: {0}")]
    InvalidUri(String),

    #[error("certificate error: {0}")]
    Certificate(String),
}

impl Error {
    /// True when the failure means "this key does not vouch for this
    /// document", as opposed to "this is not a usable signed document".
    ///
    /// Certificate and key errors count as signature failures: a broken
    /// trust anchor cannot validate anything, and the next anchor may.
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            Error::SignatureInvalid(_)
                | Error::DigestMismatch { .. }
                | Error::Crypto(_)
                | Error::Key(_)
                | Error::Certificate(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_mismatch_message() {
        let err = Error::DigestMismatch {
            index: 0,
            uri: "#_a1".into(),
        };
        assert_eq!(err.to_string(), "Digest mismatch for reference 0");
        assert!(err.is_signature_failure());
    }

    #[test]
    fn structural_errors_are_not_signature_failures() {
        assert!(!Error::XmlParse("eof".into()).is_signature_failure());
        assert!(!Error::MissingElement("SignedInfo".into()).is_signature_failure());
        assert!(Error::Certificate("bad pem".into()).is_signature_failure());
    }
}
