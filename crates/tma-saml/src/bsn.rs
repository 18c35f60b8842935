#![forbid(unsafe_code)]

//! The 11-test for citizen service numbers (BSN).

use crate::error::{Result, SamlError};

/// Weights for the nine digits; the last one counts negatively.
const WEIGHTS: [i32; 9] = [9, 8, 7, 6, 5, 4, 3, 2, -1];

/// Check a BSN: 8 or 9 ASCII digits (8-digit values get a leading zero),
/// not all zeros, weighted sum divisible by 11.
pub fn validate_bsn(bsn: &str) -> Result<()> {
    if is_valid_bsn(bsn) {
        Ok(())
    } else {
        Err(SamlError::InvalidIdentifier)
    }
}

pub fn is_valid_bsn(bsn: &str) -> bool {
    if !(8..=9).contains(&bsn.len()) || !bsn.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let padded = format!("{bsn:0>9}");
    let digits: Vec<i32> = padded.bytes().map(|b| i32::from(b - b'0')).collect();
    if digits.iter().all(|&d| d == 0) {
        return false;
    }

    let sum: i32 = digits.iter().zip(WEIGHTS).map(|(d, w)| d * w).sum();
    sum % 11 == 0
}
