#![forbid(unsafe_code)]

//! Key types.

use tma_saml_crypto::SigningKey;

/// The underlying key data.
pub enum KeyData {
    Rsa {
        private: Option<rsa::RsaPrivateKey>,
        public: rsa::RsaPublicKey,
    },
    EcP256 {
        private: Option<p256::ecdsa::SigningKey>,
        public: p256::ecdsa::VerifyingKey,
    },
    EcP384 {
        private: Option<p384::ecdsa::SigningKey>,
        public: p384::ecdsa::VerifyingKey,
    },
}

impl KeyData {
    pub fn has_private(&self) -> bool {
        match self {
            Self::Rsa { private, .. } => private.is_some(),
            Self::EcP256 { private, .. } => private.is_some(),
            Self::EcP384 { private, .. } => private.is_some(),
        }
    }

    fn algorithm_name(&self) -> &'static str {
        match self {
            Self::Rsa { .. } => "RSA",
            Self::EcP256 { .. } => "EC P-256",
            Self::EcP384 { .. } => "EC P-384",
        }
    }
}

impl std::fmt::Debug for KeyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.has_private() {
            "private+public"
        } else {
            "public"
        };
        write!(f, "{} {kind} key", self.algorithm_name())
    }
}

/// A key, optionally with the certificate it was taken from.
#[derive(Debug)]
pub struct Key {
    /// Optional name, used in log output.
    pub name: Option<String>,
    pub data: KeyData,
    /// DER-encoded certificate the public key came from, if any.
    pub certificate: Option<Vec<u8>>,
}

impl Key {
    pub fn new(data: KeyData) -> Self {
        Self {
            name: None,
            data,
            certificate: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Public half only, as used when verifying.
    pub fn to_verifying_key(&self) -> SigningKey {
        match &self.data {
            KeyData::Rsa { public, .. } => SigningKey::RsaPublic(public.clone()),
            KeyData::EcP256 { public, .. } => SigningKey::EcP256Public(*public),
            KeyData::EcP384 { public, .. } => SigningKey::EcP384Public(*public),
        }
    }

    /// The private key for signing, if this key has one.
    pub fn to_signing_key(&self) -> Option<SigningKey> {
        match &self.data {
            KeyData::Rsa { private: Some(pk), .. } => Some(SigningKey::Rsa(pk.clone())),
            KeyData::EcP256 { private: Some(sk), .. } => Some(SigningKey::EcP256(sk.clone())),
            KeyData::EcP384 { private: Some(sk), .. } => Some(SigningKey::EcP384(sk.clone())),
            _ => None,
        }
    }
}
