#![forbid(unsafe_code)]

//! Key loading from PEM and DER (X.509 certificates, PKCS#8, PKCS#1).

use crate::key::{Key, KeyData};
use tma_saml_core::Error;

/// Load the public key from a PEM-encoded X.509 certificate.
pub fn load_x509_cert_pem(pem_data: &[u8]) -> Result<Key, Error> {
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Certificate(format!("invalid PEM encoding: {e}")))?;

    // Certificates pasted into environment variables often carry extra blank lines.
    let (label, der_bytes) = pem_rfc7468::decode_vec(pem_str.trim().as_bytes())
        .map_err(|e| Error::Certificate(format!("failed to decode certificate PEM: {e}")))?;

    if label != "CERTIFICATE" {
        return Err(Error::Certificate(format!(
            "expected CERTIFICATE PEM label, got: {label}"
        )));
    }

    load_x509_cert_der(&der_bytes)
}

/// Load the public key from a DER-encoded X.509 certificate.
pub fn load_x509_cert_der(data: &[u8]) -> Result<Key, Error> {
    use der::{Decode, Encode};
    use x509_cert::Certificate;

    let cert = Certificate::from_der(data)
        .map_err(|e| Error::Certificate(format!("failed to parse X.509 certificate: {e}")))?;
    let spki_der = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::Certificate(format!("failed to encode SPKI: {e}")))?;

    let mut key = load_spki_der(&spki_der)?;
    key.certificate = Some(data.to_vec());
    Ok(key)
}

/// Load a public key from SubjectPublicKeyInfo DER bytes.
pub fn load_spki_der(spki_der: &[u8]) -> Result<Key, Error> {
    use spki::DecodePublicKey;

    if let Ok(public) = rsa::RsaPublicKey::from_public_key_der(spki_der) {
        return Ok(Key::new(KeyData::Rsa {
            private: None,
            public,
        }));
    }
    if let Ok(public) = p256::ecdsa::VerifyingKey::from_public_key_der(spki_der) {
        return Ok(Key::new(KeyData::EcP256 {
            private: None,
            public,
        }));
    }
    if let Ok(public) = p384::ecdsa::VerifyingKey::from_public_key_der(spki_der) {
        return Ok(Key::new(KeyData::EcP384 {
            private: None,
            public,
        }));
    }

    Err(Error::Key("unsupported public key algorithm".into()))
}

/// Load a private key from PEM, PKCS#8 (`PRIVATE KEY`) or PKCS#1
/// (`RSA PRIVATE KEY`).
pub fn load_private_key_pem(pem_data: &[u8]) -> Result<Key, Error> {
    use pkcs1::DecodeRsaPrivateKey;

    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::Key(format!("invalid PEM encoding: {e}")))?;
    let (label, der_bytes) = pem_rfc7468::decode_vec(pem_str.trim().as_bytes())
        .map_err(|e| Error::Key(format!("failed to decode private key PEM: {e}")))?;

    match label {
        "PRIVATE KEY" => load_private_key_pkcs8_der(&der_bytes),
        "RSA PRIVATE KEY" => {
            let private = rsa::RsaPrivateKey::from_pkcs1_der(&der_bytes)
                .map_err(|e| Error::Key(format!("failed to parse RSA private key: {e}")))?;
            Ok(rsa_private(private))
        }
        _ => Err(Error::Key(format!("unsupported PEM label: {label}"))),
    }
}

/// Tries RSA, then EC P-256 and P-384.
fn load_private_key_pkcs8_der(der: &[u8]) -> Result<Key, Error> {
    use pkcs8::DecodePrivateKey;

    if let Ok(private) = rsa::RsaPrivateKey::from_pkcs8_der(der) {
        return Ok(rsa_private(private));
    }
    if let Ok(sk) = p256::ecdsa::SigningKey::from_pkcs8_der(der) {
        let public = *sk.verifying_key();
        return Ok(Key::new(KeyData::EcP256 {
            private: Some(sk),
            public,
        }));
    }
    if let Ok(sk) = p384::ecdsa::SigningKey::from_pkcs8_der(der) {
        let public = *sk.verifying_key();
        return Ok(Key::new(KeyData::EcP384 {
            private: Some(sk),
            public,
        }));
    }

    Err(Error::Key(
        "unable to parse PKCS#8 private key (tried RSA, P-256, P-384)".into(),
    ))
}

fn rsa_private(private: rsa::RsaPrivateKey) -> Key {
    let public = private.to_public_key();
    Key::new(KeyData::Rsa {
        private: Some(private),
        public,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod keys {
        pub const PRIMARY_CERT_PEM: &str = include_str!("../../../test-data/keys/primary-cert.pem");
        pub const PRIMARY_KEY_PEM: &str = include_str!("../../../test-data/keys/primary-key.pem");
        pub const SECONDARY_CERT_PEM: &str =
            include_str!("../../../test-data/keys/secondary-cert.pem");
    }

    #[test]
    fn certificate_yields_public_rsa_key() {
        let key = load_x509_cert_pem(keys::PRIMARY_CERT_PEM.as_bytes()).unwrap();
        assert!(matches!(key.data, KeyData::Rsa { private: None, .. }));
        assert!(key.certificate.is_some());
        assert!(key.to_signing_key().is_none());
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let padded = format!("\n\n{}\n\n", keys::SECONDARY_CERT_PEM);
        assert!(load_x509_cert_pem(padded.as_bytes()).is_ok());
    }

    #[test]
    fn private_key_matches_certificate() {
        let private = load_private_key_pem(keys::PRIMARY_KEY_PEM.as_bytes()).unwrap();
        let cert = load_x509_cert_pem(keys::PRIMARY_CERT_PEM.as_bytes()).unwrap();
        match (&private.data, &cert.data) {
            (KeyData::Rsa { public: a, .. }, KeyData::Rsa { public: b, .. }) => assert_eq!(a, b),
            other => panic!("unexpected key types: {other:?}"),
        }
    }

    #[test]
    fn garbage_is_a_certificate_error() {
        let err = load_x509_cert_pem(b"not a certificate").unwrap_err();
        assert!(matches!(err, Error::Certificate(_)));
    }

    #[test]
    fn private_key_pem_is_not_a_certificate() {
        let err = load_x509_cert_pem(keys::PRIMARY_KEY_PEM.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Certificate(_)));
    }
}
