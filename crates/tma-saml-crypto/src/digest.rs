#![forbid(unsafe_code)]

//! Digest (hash) algorithms.

use digest::Digest;
use tma_saml_core::{algorithm, Error};

/// A digest algorithm named by a `DigestMethod` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestMethod {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestMethod {
    /// Look up a digest algorithm by its URI.
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            algorithm::SHA1 => Ok(Self::Sha1),
            algorithm::SHA256 => Ok(Self::Sha256),
            algorithm::SHA384 => Ok(Self::Sha384),
            algorithm::SHA512 => Ok(Self::Sha512),
            _ => Err(Error::UnsupportedAlgorithm(format!(
                "digest algorithm: {uri}"
            ))),
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Self::Sha1 => algorithm::SHA1,
            Self::Sha256 => algorithm::SHA256,
            Self::Sha384 => algorithm::SHA384,
            Self::Sha512 => algorithm::SHA512,
        }
    }

    /// Hash `data` in one shot.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        macro_rules! hash {
            ($hasher:ty) => {
                <$hasher>::digest(data).to_vec()
            };
        }
        match self {
            Self::Sha1 => hash!(sha1::Sha1),
            Self::Sha256 => hash!(sha2::Sha256),
            Self::Sha384 => hash!(sha2::Sha384),
            Self::Sha512 => hash!(sha2::Sha512),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn sha256_known_value() {
        let result = DigestMethod::from_uri(algorithm::SHA256).unwrap().digest(b"hello");
        assert_eq!(
            hex(&result),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn output_lengths() {
        assert_eq!(DigestMethod::Sha1.digest(b"x").len(), 20);
        assert_eq!(DigestMethod::Sha384.digest(b"x").len(), 48);
        assert_eq!(DigestMethod::Sha512.digest(b"x").len(), 64);
    }

    #[test]
    fn unknown_uri_is_unsupported() {
        let err = DigestMethod::from_uri("http://www.w3.org/2001/04/xmldsig-more#md5").unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }
}
