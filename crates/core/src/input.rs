//! Input normalization
//!
//! Callers hand over whatever the user typed ("20-00-00", "5817 7632").
//! Separators are stripped, anything else that is not an ASCII digit is
//! rejected.

use crate::error::{FormatError, Result};

/// Sort code and account number reduced to 6 and 8 ASCII digits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput {
    /// Exactly 6 digits
    pub sort_code: String,

    /// Exactly 8 digits
    pub account_number: String,
}

impl NormalizedInput {
    /// Normalize both parts, sort code first
    pub fn parse(sort_code: &str, account_number: &str) -> Result<Self> {
        let sort_code = normalize_sort_code(sort_code)?;
        let account_number = normalize_account_number(account_number)?;
        Ok(Self {
            sort_code,
            account_number,
        })
    }

    /// Sort code as an integer, for range lookups
    pub fn sort_code_value(&self) -> u32 {
        digits_value(&self.sort_code)
    }
}

/// Strip separators and require exactly 6 digits
pub fn normalize_sort_code(raw: &str) -> Result<String> {
    let digits = strip_separators(raw).ok_or(FormatError::InvalidSortCodeFormat)?;
    if digits.len() != 6 {
        return Err(FormatError::InvalidSortCodeFormat);
    }
    Ok(digits)
}

/// Strip separators, require 6 to 8 digits and left-pad to 8
pub fn normalize_account_number(raw: &str) -> Result<String> {
    let digits = strip_separators(raw).ok_or(FormatError::InvalidAccountNumberFormat)?;
    match digits.len() {
        6..=8 => Ok(format!("{digits:0>8}")),
        _ => Err(FormatError::InvalidAccountNumberFormat),
    }
}

/// Remove whitespace and dashes; None on any other non-digit
fn strip_separators(raw: &str) -> Option<String> {
    let mut digits = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_whitespace() || c == '-' {
            continue;
        }
        if !c.is_ascii_digit() {
            return None;
        }
        digits.push(c);
    }
    Some(digits)
}

/// Numeric value of an all-digit string
pub(crate) fn digits_value(digits: &str) -> u32 {
    digits
        .bytes()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
}
