//! Fixed RSA-2048 test keys with self-signed certificates.

pub const PRIMARY_CERT_PEM: &str = include_str!("../../../test-data/keys/primary-cert.pem");
pub const PRIMARY_KEY_PEM: &str = include_str!("../../../test-data/keys/primary-key.pem");
pub const SECONDARY_CERT_PEM: &str = include_str!("../../../test-data/keys/secondary-cert.pem");
pub const SECONDARY_KEY_PEM: &str = include_str!("../../../test-data/keys/secondary-key.pem");
