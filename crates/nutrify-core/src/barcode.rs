//! Barcode identity for a product lookup.
//!
//! A [`Barcode`] is an opaque token. Payloads decoded from an image are
//! accepted as-is because a QR code can carry arbitrary text; barcodes typed
//! in by a user go through [`Barcode::parse_manual`], which only accepts
//! GS1 retail codes (EAN-8, UPC-A, EAN-13, GTIN-14) with a valid check digit.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lengths of the GS1 identifiers accepted for manual entry.
const MANUAL_LENGTHS: [usize; 4] = [8, 12, 13, 14];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Barcode(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarcodeError {
    #[error("barcode is empty")]
    Empty,

    #[error("barcode must contain only digits, found {0:?}")]
    NonDigit(char),

    #[error("barcode must be 8, 12, 13 or 14 digits long, got {0}")]
    InvalidLength(usize),

    #[error("invalid check digit: expected {expected}, got {actual}")]
    InvalidCheckDigit { expected: u8, actual: u8 },
}

impl Barcode {
    /// Wraps a payload produced by an image decoder.
    ///
    /// Returns `None` when the payload is blank after trimming.
    #[must_use]
    pub fn from_decoded(payload: &str) -> Option<Self> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Validates a barcode typed in by a user.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError`] when the input is blank, contains anything
    /// other than ASCII digits, has an unsupported length, or fails the GS1
    /// mod-10 check.
    pub fn parse_manual(input: &str) -> Result<Self, BarcodeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(BarcodeError::Empty);
        }
        if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_digit()) {
            return Err(BarcodeError::NonDigit(bad));
        }
        if !MANUAL_LENGTHS.contains(&trimmed.len()) {
            return Err(BarcodeError::InvalidLength(trimmed.len()));
        }

        let digits: Vec<u8> = trimmed.bytes().map(|b| b - b'0').collect();
        let (body, check) = digits.split_at(digits.len() - 1);
        let expected = gs1_check_digit(body);
        if expected != check[0] {
            return Err(BarcodeError::InvalidCheckDigit {
                expected,
                actual: check[0],
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Barcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// GS1 mod-10: weights alternate 3,1,3,… starting from the digit nearest
/// the check digit.
fn gs1_check_digit(body: &[u8]) -> u8 {
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    #[allow(clippy::cast_possible_truncation)] // result is always 0..=9
    let digit = ((10 - sum % 10) % 10) as u8;
    digit
}
