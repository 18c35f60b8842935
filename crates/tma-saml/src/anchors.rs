#![forbid(unsafe_code)]

//! Trust anchors: the certificates a token signature may verify against.

use std::fmt;

/// Environment variable holding the inline secondary certificate PEM.
pub const SECONDARY_CERTIFICATE_VAR: &str = "TMA_CERTIFICATE_SECONDARY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorRole {
    Primary,
    Secondary,
}

impl fmt::Display for AnchorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        })
    }
}

/// A PEM-encoded certificate and the role it plays.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    pub role: AnchorRole,
    pub pem: String,
}

impl fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustAnchor")
            .field("role", &self.role)
            .field("pem_len", &self.pem.len())
            .finish()
    }
}

/// `{primary, secondary?}`, snapshotted once per verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchorSet {
    pub primary: TrustAnchor,
    pub secondary: Option<TrustAnchor>,
}

impl TrustAnchorSet {
    /// Anchors in the order they are tried.
    pub fn iter(&self) -> impl Iterator<Item = &TrustAnchor> {
        std::iter::once(&self.primary).chain(self.secondary.as_ref())
    }
}

/// Where the secondary certificate comes from.
///
/// Asked on every [`TrustAnchorResolver::resolve`], so a rotated
/// certificate is picked up without a restart.
pub trait CertificateSource: Send + Sync + fmt::Debug {
    fn secondary_certificate(&self) -> Option<String>;
}

/// Reads the secondary certificate from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCertificateSource {
    var: String,
}

impl EnvCertificateSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCertificateSource {
    fn default() -> Self {
        Self::new(SECONDARY_CERTIFICATE_VAR)
    }
}

impl CertificateSource for EnvCertificateSource {
    fn secondary_certificate(&self) -> Option<String> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => {
                tracing::debug!(env_var = %self.var, "secondary certificate loaded from environment");
                Some(value)
            }
            // Empty value treated as not set
            _ => None,
        }
    }
}

/// A fixed secondary certificate, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticCertificateSource(pub Option<String>);

impl StaticCertificateSource {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn with(pem: impl Into<String>) -> Self {
        Self(Some(pem.into()))
    }
}

impl CertificateSource for StaticCertificateSource {
    fn secondary_certificate(&self) -> Option<String> {
        self.0.clone().filter(|pem| !pem.trim().is_empty())
    }
}

/// Builds the anchor set: a fixed primary plus whatever the source returns.
#[derive(Debug)]
pub struct TrustAnchorResolver {
    primary: String,
    source: Box<dyn CertificateSource>,
}

impl TrustAnchorResolver {
    pub fn new(primary_pem: impl Into<String>, source: impl CertificateSource + 'static) -> Self {
        Self {
            primary: primary_pem.into(),
            source: Box::new(source),
        }
    }

    /// Primary only; no secondary is ever consulted.
    pub fn primary_only(primary_pem: impl Into<String>) -> Self {
        Self::new(primary_pem, StaticCertificateSource::none())
    }

    pub fn resolve(&self) -> TrustAnchorSet {
        let secondary = self.source.secondary_certificate().map(|pem| TrustAnchor {
            role: AnchorRole::Secondary,
            pem,
        });
        tracing::debug!(secondary = secondary.is_some(), "trust anchors resolved");
        TrustAnchorSet {
            primary: TrustAnchor {
                role: AnchorRole::Primary,
                pem: self.primary.clone(),
            },
            secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct SwitchableSource(Mutex<Option<String>>);

    impl CertificateSource for SwitchableSource {
        fn secondary_certificate(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[test]
    fn primary_only() {
        let set = TrustAnchorResolver::primary_only("P").resolve();
        assert_eq!(set.primary.role, AnchorRole::Primary);
        assert_eq!(set.primary.pem, "P");
        assert!(set.secondary.is_none());
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn empty_secondary_counts_as_absent() {
        let set = TrustAnchorResolver::new("P", StaticCertificateSource::with("  \n")).resolve();
        assert!(set.secondary.is_none());
    }

    #[test]
    fn secondary_is_read_on_every_resolve() {
        let source = std::sync::Arc::new(SwitchableSource::default());

        #[derive(Debug)]
        struct Shared(std::sync::Arc<SwitchableSource>);
        impl CertificateSource for Shared {
            fn secondary_certificate(&self) -> Option<String> {
                self.0.secondary_certificate()
            }
        }

        let resolver = TrustAnchorResolver::new("P", Shared(source.clone()));
        assert!(resolver.resolve().secondary.is_none());

        *source.0.lock().unwrap() = Some("S".into());
        let set = resolver.resolve();
        let roles: Vec<_> = set.iter().map(|a| a.role).collect();
        assert_eq!(roles, [AnchorRole::Primary, AnchorRole::Secondary]);
        assert_eq!(set.secondary.unwrap().pem, "S");
    }
}
