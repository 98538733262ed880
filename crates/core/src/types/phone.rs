//! Phone number normalization for the Russian numbering plan.
//!
//! Users type numbers as `8 (912) 345-67-89`, `+7 912 345 67 89` or just
//! the ten national digits. Everything is canonicalized to `+7XXXXXXXXXX`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Country calling code every accepted number is normalized to.
const COUNTRY_CODE: char = '7';

/// Trunk prefix used for domestic dialing, replaced by the country code.
const TRUNK_PREFIX: char = '8';

/// Digits in a full number including the country code.
const FULL_LENGTH: usize = 11;

/// Digits in a national number without the country code.
const NATIONAL_LENGTH: usize = 10;

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input contains no digits at all.
    #[error("phone number cannot be empty")]
    Empty,
    /// The digits do not form a `+7` number with ten national digits.
    #[error("phone number must look like 8XXXXXXXXXX or +7XXXXXXXXXX (got {digits} digits)")]
    InvalidFormat {
        /// Number of digits found in the input.
        digits: usize,
    },
}

/// Strip everything except ASCII digits.
fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Normalize a user-entered phone number.
///
/// Rules, applied in order to the digits of `s`:
/// 1. 11 digits starting with `8` - the `8` becomes `+7`
/// 2. 11 digits starting with `7` - prefixed with `+`
/// 3. exactly 10 digits - prefixed with `+7`
/// 4. anything else - the bare digit string, which [`is_valid_phone`] rejects
///
/// ```
/// use meatshop_core::normalize_phone;
///
/// assert_eq!(normalize_phone("8 (912) 345-67-89"), "+79123456789");
/// assert_eq!(normalize_phone("9123456789"), "+79123456789");
/// assert_eq!(normalize_phone("12-34"), "1234");
/// ```
#[must_use]
pub fn normalize_phone(s: &str) -> String {
    let digits = digits_only(s);

    if digits.len() == FULL_LENGTH {
        if let Some(national) = digits.strip_prefix(TRUNK_PREFIX) {
            return format!("+{COUNTRY_CODE}{national}");
        }
        if digits.starts_with(COUNTRY_CODE) {
            return format!("+{digits}");
        }
    }

    if digits.len() == NATIONAL_LENGTH {
        return format!("+{COUNTRY_CODE}{digits}");
    }

    digits
}

/// Returns `true` if the digits of `s` are exactly 11 and start with `7`.
///
/// Meant to be called on the output of [`normalize_phone`].
#[must_use]
pub fn is_valid_phone(s: &str) -> bool {
    let digits = digits_only(s);
    digits.len() == FULL_LENGTH && digits.starts_with(COUNTRY_CODE)
}

/// A normalized, validated phone number in `+7XXXXXXXXXX` form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize and validate a user-entered phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has no digits, or if the normalized
    /// form is not a valid `+7` number.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let normalized = normalize_phone(s);
        if normalized.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !is_valid_phone(&normalized) {
            return Err(PhoneError::InvalidFormat {
                digits: normalized.len(),
            });
        }
        Ok(Self(normalized))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
