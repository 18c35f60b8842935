#![forbid(unsafe_code)]

//! Signature algorithms (RSA PKCS#1 v1.5, ECDSA).

use crate::digest::DigestMethod;
use signature::{SignatureEncoding, Signer, Verifier};
use tma_saml_core::{algorithm, Error};

/// Key material for signature operations.
pub enum SigningKey {
    Rsa(rsa::RsaPrivateKey),
    RsaPublic(rsa::RsaPublicKey),
    EcP256(p256::ecdsa::SigningKey),
    EcP256Public(p256::ecdsa::VerifyingKey),
    EcP384(p384::ecdsa::SigningKey),
    EcP384Public(p384::ecdsa::VerifyingKey),
}

/// A signature algorithm named by a `SignatureMethod` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMethod {
    RsaPkcs1v15(DigestMethod),
    Ecdsa(DigestMethod),
}

impl SignatureMethod {
    /// Look up a signature algorithm by its URI.
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        match uri {
            algorithm::RSA_SHA1 => Ok(Self::RsaPkcs1v15(DigestMethod::Sha1)),
            algorithm::RSA_SHA256 => Ok(Self::RsaPkcs1v15(DigestMethod::Sha256)),
            algorithm::RSA_SHA384 => Ok(Self::RsaPkcs1v15(DigestMethod::Sha384)),
            algorithm::RSA_SHA512 => Ok(Self::RsaPkcs1v15(DigestMethod::Sha512)),
            algorithm::ECDSA_SHA256 => Ok(Self::Ecdsa(DigestMethod::Sha256)),
            algorithm::ECDSA_SHA384 => Ok(Self::Ecdsa(DigestMethod::Sha384)),
            _ => Err(Error::UnsupportedAlgorithm(format!(
                "signature algorithm: {uri}"
            ))),
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Self::RsaPkcs1v15(DigestMethod::Sha1) => algorithm::RSA_SHA1,
            Self::RsaPkcs1v15(DigestMethod::Sha256) => algorithm::RSA_SHA256,
            Self::RsaPkcs1v15(DigestMethod::Sha384) => algorithm::RSA_SHA384,
            Self::RsaPkcs1v15(DigestMethod::Sha512) => algorithm::RSA_SHA512,
            Self::Ecdsa(DigestMethod::Sha384) => algorithm::ECDSA_SHA384,
            Self::Ecdsa(_) => algorithm::ECDSA_SHA256,
        }
    }

    /// Sign `data`, returning the raw `SignatureValue` bytes.
    pub fn sign(&self, key: &SigningKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        match (self, key) {
            (Self::RsaPkcs1v15(hash), SigningKey::Rsa(private_key)) => {
                macro_rules! rsa_sign {
                    ($hasher:ty) => {
                        rsa::pkcs1v15::SigningKey::<$hasher>::new(private_key.clone())
                            .sign(data)
                            .to_vec()
                    };
                }
                Ok(match hash {
                    DigestMethod::Sha1 => rsa_sign!(sha1::Sha1),
                    DigestMethod::Sha256 => rsa_sign!(sha2::Sha256),
                    DigestMethod::Sha384 => rsa_sign!(sha2::Sha384),
                    DigestMethod::Sha512 => rsa_sign!(sha2::Sha512),
                })
            }
            (Self::Ecdsa(DigestMethod::Sha256), SigningKey::EcP256(sk)) => {
                let sig: p256::ecdsa::Signature = sk.sign(data);
                Ok(sig.to_bytes().to_vec())
            }
            (Self::Ecdsa(DigestMethod::Sha384), SigningKey::EcP384(sk)) => {
                let sig: p384::ecdsa::Signature = sk.sign(data);
                Ok(sig.to_bytes().to_vec())
            }
            _ => Err(Error::Key(format!(
                "key does not fit signature algorithm {}",
                self.uri()
            ))),
        }
    }

    /// Check `sig_bytes` over `data`.
    ///
    /// `Ok(false)` means a well-formed signature that does not verify;
    /// `Err` means the key or the signature bytes are unusable.
    pub fn verify(&self, key: &SigningKey, data: &[u8], sig_bytes: &[u8]) -> Result<bool, Error> {
        match self {
            Self::RsaPkcs1v15(hash) => {
                let public_key = match key {
                    SigningKey::Rsa(pk) => pk.to_public_key(),
                    SigningKey::RsaPublic(pk) => pk.clone(),
                    _ => return Err(Error::Key("RSA key required".into())),
                };
                let sig = rsa::pkcs1v15::Signature::try_from(sig_bytes)
                    .map_err(|e| Error::Crypto(format!("invalid RSA signature: {e}")))?;
                macro_rules! rsa_verify {
                    ($hasher:ty) => {
                        rsa::pkcs1v15::VerifyingKey::<$hasher>::new(public_key)
                            .verify(data, &sig)
                            .is_ok()
                    };
                }
                Ok(match hash {
                    DigestMethod::Sha1 => rsa_verify!(sha1::Sha1),
                    DigestMethod::Sha256 => rsa_verify!(sha2::Sha256),
                    DigestMethod::Sha384 => rsa_verify!(sha2::Sha384),
                    DigestMethod::Sha512 => rsa_verify!(sha2::Sha512),
                })
            }
            Self::Ecdsa(DigestMethod::Sha256) => {
                let vk = match key {
                    SigningKey::EcP256(sk) => *sk.verifying_key(),
                    SigningKey::EcP256Public(vk) => *vk,
                    _ => return Err(Error::Key("P-256 key required".into())),
                };
                let sig = p256::ecdsa::Signature::from_slice(sig_bytes)
                    .map_err(|e| Error::Crypto(format!("invalid P-256 signature: {e}")))?;
                Ok(vk.verify(data, &sig).is_ok())
            }
            Self::Ecdsa(DigestMethod::Sha384) => {
                let vk = match key {
                    SigningKey::EcP384(sk) => *sk.verifying_key(),
                    SigningKey::EcP384Public(vk) => *vk,
                    _ => return Err(Error::Key("P-384 key required".into())),
                };
                let sig = p384::ecdsa::Signature::from_slice(sig_bytes)
                    .map_err(|e| Error::Crypto(format!("invalid P-384 signature: {e}")))?;
                Ok(vk.verify(data, &sig).is_ok())
            }
            Self::Ecdsa(other) => Err(Error::UnsupportedAlgorithm(format!(
                "ECDSA with {}",
                other.uri()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ec_p256() -> SigningKey {
        let bytes = [7u8; 32];
        SigningKey::EcP256(p256::ecdsa::SigningKey::from_slice(&bytes).unwrap())
    }

    #[test]
    fn uri_lookup() {
        let method = SignatureMethod::from_uri(algorithm::RSA_SHA256).unwrap();
        assert_eq!(method, SignatureMethod::RsaPkcs1v15(DigestMethod::Sha256));
        assert_eq!(method.uri(), algorithm::RSA_SHA256);
        assert!(SignatureMethod::from_uri("urn:hmac").is_err());
    }

    #[test]
    fn ecdsa_sign_then_verify() {
        let key = ec_p256();
        let method = SignatureMethod::Ecdsa(DigestMethod::Sha256);
        let sig = method.sign(&key, b"signed info").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(method.verify(&key, b"signed info", &sig).unwrap());
        assert!(!method.verify(&key, b"other info", &sig).unwrap());
    }

    #[test]
    fn mismatched_key_is_a_key_error() {
        let key = ec_p256();
        let method = SignatureMethod::RsaPkcs1v15(DigestMethod::Sha256);
        assert!(matches!(method.verify(&key, b"x", &[0u8; 256]), Err(Error::Key(_))));
        assert!(matches!(method.sign(&key, b"x"), Err(Error::Key(_))));
    }
}
