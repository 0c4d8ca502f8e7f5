//! Error types for modcheck
//!
//! Nothing in here is fatal: format errors go back to the caller of
//! `validate`, line errors are dropped by the table parsers.

use thiserror::Error;

/// Input format errors returned by validation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// Sort code is not exactly 6 digits after separator stripping
    #[error("invalid sort code format")]
    InvalidSortCodeFormat,

    /// Account number is not 6, 7 or 8 digits after separator stripping
    #[error("invalid account number format")]
    InvalidAccountNumberFormat,
}

/// Reason a single table line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Not enough whitespace-separated tokens
    #[error("expected at least {expected} tokens, found {found}")]
    TooFewTokens {
        /// Minimum token count for this table
        expected: usize,
        /// Tokens present on the line
        found: usize,
    },

    /// A token that should be an integer is not
    #[error("invalid integer token: {0:?}")]
    InvalidNumber(String),

    /// Range bound is not a 6-digit sort code
    #[error("invalid sort code token: {0:?}")]
    InvalidSortCode(String),

    /// Range bounds are reversed
    #[error("range start {start} is after range end {end}")]
    InvertedRange {
        /// Parsed range start
        start: u32,
        /// Parsed range end
        end: u32,
    },

    /// Substitution line is not exactly two 6-digit sort codes
    #[error("malformed substitution: {0:?}")]
    MalformedSubstitution(String),
}

/// Result type alias using FormatError
pub type Result<T> = std::result::Result<T, FormatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            FormatError::InvalidSortCodeFormat.to_string(),
            "invalid sort code format"
        );
        assert_eq!(
            LineError::TooFewTokens { expected: 17, found: 3 }.to_string(),
            "expected at least 17 tokens, found 3"
        );
    }
}
