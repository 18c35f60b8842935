use crate::keys;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use tma_saml_core::{algorithm, Error};

const CITIZEN_ID_KEY: &str = "uid";
const KVK_NUMBER_KEY: &str = "urn:etoegang:1.9:EntityConcernedID:KvKnr";
const BRANCH_NUMBER_KEY: &str = "urn:etoegang:1.9:ServiceRestriction:Vestigingsnr";

/// Which test key signs the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signer {
    #[default]
    Primary,
    Secondary,
}

impl Signer {
    fn private_key_pem(&self) -> &'static str {
        match self {
            Self::Primary => keys::PRIMARY_KEY_PEM,
            Self::Secondary => keys::SECONDARY_KEY_PEM,
        }
    }
}

/// Builds a signed assertion the way the broker sends it: enveloped
/// signature over the `Assertion` element, exclusive C14N, RSA-SHA256.
#[derive(Debug, Clone)]
pub struct TokenBuilder {
    attributes: Vec<(String, String)>,
    not_before: DateTime<Utc>,
    not_on_or_after: DateTime<Utc>,
    signer: Signer,
}

impl TokenBuilder {
    /// Valid from a minute ago for fifteen minutes.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            attributes: Vec::new(),
            not_before: now - Duration::minutes(1),
            not_on_or_after: now + Duration::minutes(15),
            signer: Signer::Primary,
        }
    }

    pub fn citizen(bsn: impl Into<String>) -> Self {
        Self::new().attribute(CITIZEN_ID_KEY, bsn)
    }

    pub fn business(kvk_number: impl Into<String>, branch_number: Option<&str>) -> Self {
        let builder = Self::new().attribute(KVK_NUMBER_KEY, kvk_number);
        match branch_number {
            Some(branch) => builder.attribute(BRANCH_NUMBER_KEY, branch),
            None => builder,
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn valid_between(mut self, not_before: DateTime<Utc>, not_on_or_after: DateTime<Utc>) -> Self {
        self.not_before = not_before;
        self.not_on_or_after = not_on_or_after;
        self
    }

    pub fn not_on_or_after(mut self, not_on_or_after: DateTime<Utc>) -> Self {
        self.not_on_or_after = not_on_or_after;
        self
    }

    pub fn signed_by(mut self, signer: Signer) -> Self {
        self.signer = signer;
        self
    }

    /// The unsigned template with empty digest and signature values.
    pub fn template(&self) -> String {
        let id = format!("_{:032x}", rand::random::<u128>());
        let attributes: String = self
            .attributes
            .iter()
            .map(|(name, value)| {
                format!(
                    r#"<saml:Attribute Name="{}" NameFormat="urn:oasis:names:tc:SAML:2.0:attrname-format:uri"><saml:AttributeValue xsi:type="xs:string">{}</saml:AttributeValue></saml:Attribute>"#,
                    escape(name),
                    escape(value)
                )
            })
            .collect();

        format!(
            r##"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" ID="{id}" IssueInstant="{issued}" Version="2.0"><saml:Issuer>https://tma.example.test/saml</saml:Issuer><ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><ds:SignedInfo><ds:CanonicalizationMethod Algorithm="{c14n}"/><ds:SignatureMethod Algorithm="{rsa}"/><ds:Reference URI="#{id}"><ds:Transforms><ds:Transform Algorithm="{enveloped}"/><ds:Transform Algorithm="{c14n}"><ec:InclusiveNamespaces xmlns:ec="{c14n}" PrefixList="xs"/></ds:Transform></ds:Transforms><ds:DigestMethod Algorithm="{sha256}"/><ds:DigestValue></ds:DigestValue></ds:Reference></ds:SignedInfo><ds:SignatureValue></ds:SignatureValue></ds:Signature><saml:Subject><saml:NameID Format="urn:oasis:names:tc:SAML:2.0:nameid-format:transient">{id}-subject</saml:NameID></saml:Subject><saml:Conditions NotBefore="{not_before}" NotOnOrAfter="{not_on_or_after}"/><saml:AttributeStatement>{attributes}</saml:AttributeStatement></saml:Assertion>"##,
            issued = timestamp(Utc::now()),
            c14n = algorithm::EXC_C14N,
            rsa = algorithm::RSA_SHA256,
            enveloped = algorithm::ENVELOPED_SIGNATURE,
            sha256 = algorithm::SHA256,
            not_before = timestamp(self.not_before),
            not_on_or_after = timestamp(self.not_on_or_after),
        )
    }

    /// Sign the template with the selected test key.
    pub fn build(&self) -> Result<String, Error> {
        let key = tma_saml_keys::load_private_key_pem(self.signer.private_key_pem().as_bytes())?;
        tma_saml_dsig::sign_template(&self.template(), &key)
    }
}

impl Default for TokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A citizen token signed for `signed_bsn` whose value was then changed
/// to `claimed_bsn` without re-signing.
pub fn tampered_token(signed_bsn: &str, claimed_bsn: &str) -> Result<String, Error> {
    let token = TokenBuilder::citizen(signed_bsn).build()?;
    Ok(token.replacen(
        &format!(">{signed_bsn}</saml:AttributeValue>"),
        &format!(">{claimed_bsn}</saml:AttributeValue>"),
        1,
    ))
}

/// Millisecond precision, as the broker writes it.
fn timestamp(t: DateTime<Utc>) -> String {
    t.trunc_subsecs(3).format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
