//! Validation engine
//!
//! Pure computation over a resident snapshot: no I/O, no locks, no await.
//!
//! # Rule resolution
//!
//! 1. No rule covers the sort code: valid (left to downstream checks)
//! 2. One rule: its result
//! 3. Two rules: combined per their exception codes, first matching
//!    branch wins
//! 4. More: valid if any rule passes

use crate::error::Result;
use crate::input::{digits_value, NormalizedInput};
use crate::rules::{Algorithm, RuleSnapshot, WeightRule, WEIGHT_COUNT};

/// Exception 1 adds this to the weighted sum
const EXCEPTION_1_OFFSET: i64 = 27;

/// Validate a raw sort code / account number pair against a snapshot
pub fn validate(snapshot: &RuleSnapshot, sort_code: &str, account_number: &str) -> Result<bool> {
    let input = NormalizedInput::parse(sort_code, account_number)?;
    let rules = snapshot.matching(input.sort_code_value());

    let valid = match rules.as_slice() {
        [] => true,
        [rule] => evaluate_rule(snapshot, &input, rule),
        [a, b] => combine_pair(snapshot, &input, a, b),
        many => many.iter().any(|rule| evaluate_rule(snapshot, &input, rule)),
    };

    Ok(valid)
}

/// Combine two covering rules, `a` first in table order
fn combine_pair(
    snapshot: &RuleSnapshot,
    input: &NormalizedInput,
    a: &WeightRule,
    b: &WeightRule,
) -> bool {
    let a_passes = evaluate_rule(snapshot, input, a);

    match a.exception {
        Some(2 | 9) if a_passes => return true,
        Some(10 | 11) => return a_passes || evaluate_rule(snapshot, input, b),
        Some(12 | 13) => return a_passes && evaluate_rule(snapshot, input, b),
        _ => {}
    }

    if b.has_exception(14) && !a_passes {
        return evaluate_rule(snapshot, input, b);
    }

    a_passes || evaluate_rule(snapshot, input, b)
}

/// Run a single rule's checksum over normalized input
pub fn evaluate_rule(snapshot: &RuleSnapshot, input: &NormalizedInput, rule: &WeightRule) -> bool {
    let sort_code = if rule.has_exception(5) {
        snapshot.substitute(&input.sort_code)
    } else {
        input.sort_code.as_str()
    };

    let digits = match digit_sequence(sort_code, &input.account_number) {
        Some(digits) => digits,
        None => {
            // Substitution target was not six digits
            tracing::warn!(sort_code, "unusable substituted sort code");
            return false;
        }
    };

    match rule.algorithm {
        Algorithm::Mod10 => weighted_sum(&digits, rule).rem_euclid(10) == 0,
        Algorithm::DblAl => double_alternate_sum(&digits, rule).rem_euclid(10) == 0,
        Algorithm::Mod11 => modulus_11(&digits, rule),
    }
}

fn modulus_11(digits: &[i64; WEIGHT_COUNT], rule: &WeightRule) -> bool {
    let remainder = weighted_sum(digits, rule).rem_euclid(11);
    let g = digits[12];
    let h = digits[13];

    match rule.exception {
        Some(4) => remainder == g * 10 + h,
        Some(5) => match remainder {
            0 => g == 0,
            1 => false,
            r => 11 - r == g,
        },
        _ => remainder == 0,
    }
}

/// Sum of digit * weight, with exception 1 offset
fn weighted_sum(digits: &[i64; WEIGHT_COUNT], rule: &WeightRule) -> i64 {
    let sum: i64 = digits
        .iter()
        .zip(rule.weights.iter())
        .map(|(d, w)| d * i64::from(*w))
        .sum();

    if rule.has_exception(1) {
        sum + EXCEPTION_1_OFFSET
    } else {
        sum
    }
}

/// Sum of products, two-digit products replaced by their digit sum
fn double_alternate_sum(digits: &[i64; WEIGHT_COUNT], rule: &WeightRule) -> i64 {
    digits
        .iter()
        .zip(rule.weights.iter())
        .map(|(d, w)| {
            let product = d * i64::from(*w);
            if product >= 10 {
                product % 10 + product / 10
            } else {
                product
            }
        })
        .sum()
}

/// Sort code digits then account digits
fn digit_sequence(sort_code: &str, account_number: &str) -> Option<[i64; WEIGHT_COUNT]> {
    if sort_code.len() != 6 || !sort_code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut digits = [0i64; WEIGHT_COUNT];
    for (slot, b) in digits
        .iter_mut()
        .zip(sort_code.bytes().chain(account_number.bytes()))
    {
        *slot = i64::from(b - b'0');
    }
    Some(digits)
}

/// Numeric sort code for a digit string, if it is a valid sort code
pub fn sort_code_value(sort_code: &str) -> Option<u32> {
    crate::input::normalize_sort_code(sort_code)
        .ok()
        .map(|s| digits_value(&s))
}
