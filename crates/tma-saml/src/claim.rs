#![forbid(unsafe_code)]

//! Deciding who a token is about.

use crate::attributes::AttributeMap;
use crate::bsn::validate_bsn;
use crate::error::{Result, SamlError};
use std::fmt;

/// Attribute carrying the citizen's BSN.
pub const CITIZEN_ID_KEY: &str = "uid";
/// Attribute carrying the business's KvK registration number.
pub const KVK_NUMBER_KEY: &str = "urn:etoegang:1.9:EntityConcernedID:KvKnr";
/// Attribute carrying the business's branch number (optional).
pub const BRANCH_NUMBER_KEY: &str = "urn:etoegang:1.9:ServiceRestriction:Vestigingsnr";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserType {
    Citizen,
    Business,
}

impl UserType {
    /// Label used by the broker and downstream applications.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Citizen => "BURGER",
            Self::Business => "BEDRIJF",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitizenClaim {
    pub national_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessClaim {
    pub registration_number: String,
    pub branch_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    Citizen(CitizenClaim),
    Business(BusinessClaim),
}

impl Claim {
    pub fn user_type(&self) -> UserType {
        match self {
            Self::Citizen(_) => UserType::Citizen,
            Self::Business(_) => UserType::Business,
        }
    }
}

/// Classification rules, in priority order: the first key present decides.
const RULES: [(&str, UserType); 2] = [
    (CITIZEN_ID_KEY, UserType::Citizen),
    (KVK_NUMBER_KEY, UserType::Business),
];

/// Classify an attribute set. Citizen claims must pass the 11-test.
pub fn classify(attrs: &AttributeMap) -> Result<(UserType, Claim)> {
    let (value, user_type) = RULES
        .iter()
        .find_map(|(key, user_type)| attrs.get(*key).map(|v| (v, *user_type)))
        .ok_or(SamlError::UnknownUserType)?;

    let claim = match user_type {
        UserType::Citizen => {
            validate_bsn(value)?;
            Claim::Citizen(CitizenClaim {
                national_id: value.clone(),
            })
        }
        UserType::Business => Claim::Business(BusinessClaim {
            registration_number: value.clone(),
            branch_number: attrs.get(BRANCH_NUMBER_KEY).cloned(),
        }),
    };
    tracing::debug!(user_type = %user_type, "token classified");
    Ok((user_type, claim))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn citizen() {
        let (user_type, claim) = classify(&attrs(&[(CITIZEN_ID_KEY, "987654329")])).unwrap();
        assert_eq!(user_type, UserType::Citizen);
        assert_eq!(
            claim,
            Claim::Citizen(CitizenClaim {
                national_id: "987654329".into()
            })
        );
    }

    #[test]
    fn citizen_with_bad_bsn_is_rejected() {
        let result = classify(&attrs(&[(CITIZEN_ID_KEY, "987654321")]));
        assert!(matches!(result, Err(SamlError::InvalidIdentifier)));
    }

    #[test]
    fn business_with_and_without_branch() {
        let (_, claim) = classify(&attrs(&[(KVK_NUMBER_KEY, "1234")])).unwrap();
        assert_eq!(
            claim,
            Claim::Business(BusinessClaim {
                registration_number: "1234".into(),
                branch_number: None,
            })
        );

        let (user_type, claim) =
            classify(&attrs(&[(KVK_NUMBER_KEY, "1234"), (BRANCH_NUMBER_KEY, "321564")])).unwrap();
        assert_eq!(user_type, UserType::Business);
        assert_eq!(claim.user_type(), UserType::Business);
        let Claim::Business(business) = claim else {
            panic!("expected business claim");
        };
        assert_eq!(business.branch_number.as_deref(), Some("321564"));
    }

    #[test]
    fn citizen_key_wins_when_both_present() {
        let both = attrs(&[(CITIZEN_ID_KEY, "987654329"), (KVK_NUMBER_KEY, "1234")]);
        assert_eq!(classify(&both).unwrap().0, UserType::Citizen);
    }

    #[test]
    fn branch_alone_is_unknown() {
        let result = classify(&attrs(&[(BRANCH_NUMBER_KEY, "321564"), ("other", "x")]));
        assert!(matches!(result, Err(SamlError::UnknownUserType)));
    }

    #[test]
    fn labels() {
        assert_eq!(UserType::Citizen.to_string(), "BURGER");
        assert_eq!(UserType::Business.as_str(), "BEDRIJF");
    }
}
