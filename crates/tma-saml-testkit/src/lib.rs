#![forbid(unsafe_code)]

//! Signed TMA SAML tokens for tests.
//!
//! The keys here are test material only; they sign tokens that the
//! matching certificates in [`keys`] verify.

pub mod keys;
mod token;

pub use token::{tampered_token, Signer, TokenBuilder};

use rand::Rng;

/// A random BSN that passes the 11-test.
pub fn random_bsn() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let digits: Vec<u32> = (0..8).map(|_| rng.gen_range(0..10)).collect();
        let sum: u32 = digits.iter().zip((2..=9).rev()).map(|(d, w)| d * w).sum();
        let check = sum % 11;
        if check == 10 || (check == 0 && digits.iter().all(|&d| d == 0)) {
            continue;
        }
        return digits
            .iter()
            .chain(std::iter::once(&check))
            .map(|d| char::from_digit(*d, 10).unwrap_or('0'))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eleven_test(bsn: &str) -> bool {
        let weights = [9, 8, 7, 6, 5, 4, 3, 2, -1];
        let sum: i32 = bsn
            .chars()
            .zip(weights)
            .map(|(c, w)| c.to_digit(10).unwrap() as i32 * w)
            .sum();
        sum % 11 == 0
    }

    #[test]
    fn random_bsns_pass_the_eleven_test() {
        for _ in 0..200 {
            let bsn = random_bsn();
            assert_eq!(bsn.len(), 9);
            assert!(eleven_test(&bsn), "{bsn}");
        }
    }
}
