//! Weight rules and the immutable rule snapshot

use std::collections::HashMap;
use std::fmt;

use crate::parser;

/// Number of weight positions (6 sort code digits + 8 account digits)
pub const WEIGHT_COUNT: usize = 14;

/// Checksum algorithm bound to a weight rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Weighted sum modulo 10
    Mod10,
    /// Weighted sum modulo 11
    Mod11,
    /// Double alternate: digit-summed products modulo 10
    DblAl,
}

impl Algorithm {
    /// Parse an algorithm code, case-insensitively.
    ///
    /// Unknown codes fall back to `Mod11`.
    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("MOD10") {
            Algorithm::Mod10
        } else if code.eq_ignore_ascii_case("DBLAL") {
            Algorithm::DblAl
        } else {
            Algorithm::Mod11
        }
    }

    /// Canonical upper-case code
    pub fn code(&self) -> &'static str {
        match self {
            Algorithm::Mod10 => "MOD10",
            Algorithm::Mod11 => "MOD11",
            Algorithm::DblAl => "DBLAL",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A sort code range bound to an algorithm, weights and optional exception
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightRule {
    /// First sort code covered (inclusive)
    pub range_start: u32,

    /// Last sort code covered (inclusive)
    pub range_end: u32,

    /// Checksum algorithm
    pub algorithm: Algorithm,

    /// One weight per digit of sort code followed by account number
    pub weights: [i32; WEIGHT_COUNT],

    /// Numbered exception to the standard procedure, if any
    pub exception: Option<u32>,
}

impl WeightRule {
    /// Create a rule without an exception
    pub fn new(
        range_start: u32,
        range_end: u32,
        algorithm: Algorithm,
        weights: [i32; WEIGHT_COUNT],
    ) -> Self {
        Self {
            range_start,
            range_end,
            algorithm,
            weights,
            exception: None,
        }
    }

    /// Set the exception code
    pub fn with_exception(mut self, exception: u32) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Check whether the sort code falls inside this rule's range
    #[inline]
    pub fn covers(&self, sort_code: u32) -> bool {
        self.range_start <= sort_code && sort_code <= self.range_end
    }

    /// Check the exception code by value
    #[inline]
    pub fn has_exception(&self, code: u32) -> bool {
        self.exception == Some(code)
    }
}

/// A single sort code substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionEntry {
    /// Sort code as found in input
    pub from_sort_code: String,

    /// Sort code to use for checksum evaluation
    pub to_sort_code: String,
}

/// Immutable set of weight rules and substitutions.
///
/// A refresh builds a new snapshot and swaps it in whole; nothing mutates
/// an installed one.
#[derive(Debug, Clone, Default)]
pub struct RuleSnapshot {
    /// Rules in table order
    rules: Vec<WeightRule>,

    /// from sort code -> to sort code
    substitutions: HashMap<String, String>,
}

impl RuleSnapshot {
    /// Build a snapshot from parsed records.
    ///
    /// The first entry for a given `from` sort code wins.
    pub fn new(rules: Vec<WeightRule>, substitutions: Vec<SubstitutionEntry>) -> Self {
        let mut map = HashMap::with_capacity(substitutions.len());
        for entry in substitutions {
            if map.contains_key(&entry.from_sort_code) {
                tracing::debug!(
                    from = %entry.from_sort_code,
                    "duplicate substitution ignored"
                );
                continue;
            }
            map.insert(entry.from_sort_code, entry.to_sort_code);
        }

        Self {
            rules,
            substitutions: map,
        }
    }

    /// Parse both tables into a snapshot
    pub fn from_tables(weights: &str, substitutions: &str) -> Self {
        Self::new(
            parser::parse_weight_table(weights),
            parser::parse_substitution_table(substitutions),
        )
    }

    /// Rules in table order
    pub fn rules(&self) -> &[WeightRule] {
        &self.rules
    }

    /// Rules whose range covers the sort code, in table order
    pub fn matching(&self, sort_code: u32) -> Vec<&WeightRule> {
        self.rules.iter().filter(|r| r.covers(sort_code)).collect()
    }

    /// Substituted sort code, or the input when no substitution exists
    pub fn substitute<'a>(&'a self, sort_code: &'a str) -> &'a str {
        self.substitutions
            .get(sort_code)
            .map(String::as_str)
            .unwrap_or(sort_code)
    }

    /// Number of weight rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of substitution entries
    pub fn substitution_count(&self) -> usize {
        self.substitutions.len()
    }

    /// True when the snapshot holds no weight rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
