//! Caller-id normalization.
//!
//! Phone numbers reach us in many shapes: `+1 (555) 123-4567`, `15551234567`,
//! `555.123.4567`.  To compare them we strip everything that is not an ASCII
//! digit and keep only the trailing [`SUFFIX_DIGITS`] digits, which drops
//! country codes and trunk prefixes.
//!
//! Short numbers can collide under this rule (two different 10-digit tails
//! from different countries compare equal).  That false-positive rate is
//! accepted in exchange for matching across formatting and region variance.

use std::fmt;

/// Number of trailing digits compared when matching phone numbers.
pub const SUFFIX_DIGITS: usize = 10;

/// The trailing digits of a normalized phone number.
///
/// Always non-empty and at most [`SUFFIX_DIGITS`] ASCII digits long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerSuffix(String);

impl CallerSuffix {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Removes every character that is not an ASCII digit.
pub fn normalize_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalizes `raw` and returns its trailing [`SUFFIX_DIGITS`] digits.
///
/// Returns `None` when `raw` contains no digits at all (empty, withheld, or
/// a placeholder such as `"Unknown"`), since such a caller cannot be
/// verified against the directory.
pub fn caller_suffix(raw: &str) -> Option<CallerSuffix> {
    let digits = normalize_digits(raw);
    if digits.is_empty() {
        return None;
    }
    // All bytes are ASCII digits, so any byte offset is a char boundary.
    let start = digits.len().saturating_sub(SUFFIX_DIGITS);
    Some(CallerSuffix(digits[start..].to_string()))
}
