#![forbid(unsafe_code)]

//! The assertion's validity window (`saml:Conditions`).

use crate::error::{Result, SamlError};
use crate::verifier::VerifiedAssertion;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use tma_saml_core::ns;
use tma_saml_xml::document::{find_child_element, require_attribute};

/// `[not_before, not_on_or_after)` as written in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub not_before: DateTime<FixedOffset>,
    pub not_on_or_after: DateTime<FixedOffset>,
}

impl ValidityWindow {
    /// Read the window from an `<saml:Assertion>` element.
    pub fn from_assertion(assertion: roxmltree::Node<'_, '_>) -> Result<Self> {
        let conditions = find_child_element(assertion, ns::SAML2_ASSERTION, ns::node::CONDITIONS)
            .ok_or_else(|| SamlError::malformed("assertion has no Conditions"))?;
        Ok(Self {
            not_before: timestamp(conditions, ns::attr::NOT_BEFORE)?,
            not_on_or_after: timestamp(conditions, ns::attr::NOT_ON_OR_AFTER)?,
        })
    }

    /// An inverted window contains nothing.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        now >= self.not_before && now < self.not_on_or_after
    }
}

/// Fail with [`SamlError::Expired`] unless `now` lies inside the window.
pub fn check_validity(assertion: &VerifiedAssertion, now: DateTime<Utc>) -> Result<ValidityWindow> {
    let window = assertion.with_assertion(ValidityWindow::from_assertion)?;
    if !window.contains(now) {
        tracing::debug!(%now, "token outside validity window");
        return Err(SamlError::Expired {
            not_before: window.not_before,
            not_on_or_after: window.not_on_or_after,
        });
    }
    Ok(window)
}

/// `NotOnOrAfter`, with the offset and precision the token uses.
pub fn session_valid_until(assertion: &VerifiedAssertion) -> Result<DateTime<FixedOffset>> {
    assertion
        .with_assertion(ValidityWindow::from_assertion)
        .map(|w| w.not_on_or_after)
}

fn timestamp(conditions: roxmltree::Node<'_, '_>, name: &str) -> Result<DateTime<FixedOffset>> {
    let raw = require_attribute(conditions, name).map_err(|e| SamlError::malformed(e.to_string()))?;
    parse_timestamp(raw).ok_or_else(|| SamlError::malformed(format!("{name} is not a timestamp: {raw}")))
}

/// xs:dateTime; a value without an offset is taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Timelike};

    fn window(xml: &str) -> Result<ValidityWindow> {
        let doc = tma_saml_xml::parse(xml).unwrap();
        ValidityWindow::from_assertion(doc.root_element())
    }

    const ASSERTION: &str = r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"><saml:Conditions NotBefore="2024-05-01T10:00:00.000Z" NotOnOrAfter="2024-05-01T10:15:00.123+02:00"/></saml:Assertion>"#;

    #[test]
    fn reads_offsets_and_fractions() {
        let w = window(ASSERTION).unwrap();
        assert_eq!(w.not_before, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        assert_eq!(w.not_on_or_after.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(w.not_on_or_after.nanosecond(), 123_000_000);
    }

    #[test]
    fn bounds() {
        let w = window(ASSERTION).unwrap();
        let start = w.not_before.with_timezone(&Utc);
        assert!(w.contains(start));
        assert!(!w.contains(start - Duration::milliseconds(1)));
        let end = w.not_on_or_after.with_timezone(&Utc);
        assert!(!w.contains(end));
        assert!(w.contains(end - Duration::milliseconds(1)));
    }

    #[test]
    fn inverted_window_contains_nothing() {
        let xml = ASSERTION.replace("2024-05-01T10:15:00.123+02:00", "2024-05-01T09:00:00Z");
        let w = window(&xml).unwrap();
        assert!(!w.contains(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()));
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let parsed = parse_timestamp("2024-05-01T10:00:00.5").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert_eq!(parsed.nanosecond(), 500_000_000);
    }

    #[test]
    fn missing_parts_are_malformed() {
        let no_conditions = r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"/>"#;
        assert!(matches!(window(no_conditions), Err(SamlError::MalformedToken(_))));

        let bad = ASSERTION.replace("2024-05-01T10:00:00.000Z", "yesterday");
        assert!(matches!(window(&bad), Err(SamlError::MalformedToken(_))));
    }
}
