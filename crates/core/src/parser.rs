//! Plain-text table parsers
//!
//! Weight table: `<start> <end> <algo> <w0> .. <w13> [<exception>]`
//! Substitution table: `<from> <to>`
//!
//! A bad line is logged and skipped; it never fails the whole table.

use crate::error::LineError;
use crate::rules::{Algorithm, SubstitutionEntry, WeightRule, WEIGHT_COUNT};

/// Range start, range end and algorithm code precede the weights
const WEIGHT_LINE_MIN_TOKENS: usize = 3 + WEIGHT_COUNT;

/// Parse a weight table, dropping malformed lines
pub fn parse_weight_table(text: &str) -> Vec<WeightRule> {
    parse_lines(text, parse_weight_line)
}

/// Parse a substitution table, dropping malformed lines
pub fn parse_substitution_table(text: &str) -> Vec<SubstitutionEntry> {
    parse_lines(text, parse_substitution_line)
}

fn parse_lines<T>(text: &str, parse: fn(&str) -> Result<T, LineError>) -> Vec<T> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse(line) {
            Ok(item) => out.push(item),
            Err(err) => tracing::debug!(line = idx + 1, error = %err, "skipping table line"),
        }
    }
    out
}

/// Parse one weight table line
pub fn parse_weight_line(line: &str) -> Result<WeightRule, LineError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < WEIGHT_LINE_MIN_TOKENS {
        return Err(LineError::TooFewTokens {
            expected: WEIGHT_LINE_MIN_TOKENS,
            found: tokens.len(),
        });
    }

    let range_start = parse_range_bound(tokens[0])?;
    let range_end = parse_range_bound(tokens[1])?;
    if range_start > range_end {
        return Err(LineError::InvertedRange {
            start: range_start,
            end: range_end,
        });
    }

    let algorithm = Algorithm::from_code(tokens[2]);

    let mut weights = [0i32; WEIGHT_COUNT];
    for (slot, token) in weights.iter_mut().zip(&tokens[3..WEIGHT_LINE_MIN_TOKENS]) {
        *slot = parse_number(token)?;
    }

    // Trailing token is optional; garbage there just means no exception
    let exception = tokens
        .get(WEIGHT_LINE_MIN_TOKENS)
        .and_then(|t| t.parse::<u32>().ok());

    Ok(WeightRule {
        range_start,
        range_end,
        algorithm,
        weights,
        exception,
    })
}

/// Parse one substitution table line
pub fn parse_substitution_line(line: &str) -> Result<SubstitutionEntry, LineError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [from, to] if is_sort_code(from) && is_sort_code(to) => Ok(SubstitutionEntry {
            from_sort_code: (*from).to_string(),
            to_sort_code: (*to).to_string(),
        }),
        _ => Err(LineError::MalformedSubstitution(line.trim().to_string())),
    }
}

fn parse_number<T: std::str::FromStr>(token: &str) -> Result<T, LineError> {
    token
        .parse()
        .map_err(|_| LineError::InvalidNumber(token.to_string()))
}

fn parse_range_bound(token: &str) -> Result<u32, LineError> {
    if !is_sort_code(token) {
        return Err(LineError::InvalidSortCode(token.to_string()));
    }
    parse_number(token)
}

fn is_sort_code(token: &str) -> bool {
    token.len() == 6 && token.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
010004 016715 MOD11    0    0    0    0    0    0    8    7    6    5    4    3    2    1
040004 040004 DBLAL    0    0    0    0    0    0    2    1    2    1    2    1    2    1   1
070116 070116 mod10    0    0    0    0    0    0    7    1    3    7    1    3    7    1   5
";

    #[test]
    fn test_parse_weight_table() {
        let rules = parse_weight_table(TABLE);
        assert_eq!(rules.len(), 3);

        assert_eq!(rules[0].range_start, 10004);
        assert_eq!(rules[0].range_end, 16715);
        assert_eq!(rules[0].algorithm, Algorithm::Mod11);
        assert_eq!(rules[0].weights, [0, 0, 0, 0, 0, 0, 8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(rules[0].exception, None);

        assert_eq!(rules[1].algorithm, Algorithm::DblAl);
        assert_eq!(rules[1].exception, Some(1));

        assert_eq!(rules[2].algorithm, Algorithm::Mod10);
        assert_eq!(rules[2].exception, Some(5));
    }

    #[test]
    fn test_corrupt_line_skipped() {
        let text = format!(
            "{TABLE}\n080000 080010 MOD11 0 0 0 banana 0 0 8 7 6 5 4 3 2 1\n\n   \n"
        );
        assert_eq!(parse_weight_table(&text).len(), 3);
    }

    #[test]
    fn test_short_line_rejected() {
        let err = parse_weight_line("010004 016715 MOD11 0 0 0 0 0 0 8 7 6 5 4 3 2").unwrap_err();
        assert_eq!(err, LineError::TooFewTokens { expected: 17, found: 16 });
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = parse_weight_line("200000 100000 MOD11 0 0 0 0 0 0 8 7 6 5 4 3 2 1").unwrap_err();
        assert_eq!(err, LineError::InvertedRange { start: 200000, end: 100000 });
    }

    #[test]
    fn test_range_bounds_must_be_six_digits() {
        let err = parse_weight_line("1 999999 MOD11 0 0 0 0 0 0 8 7 6 5 4 3 2 1").unwrap_err();
        assert_eq!(err, LineError::InvalidSortCode("1".to_string()));

        let err =
            parse_weight_line("100000 9999999 MOD11 0 0 0 0 0 0 8 7 6 5 4 3 2 1").unwrap_err();
        assert_eq!(err, LineError::InvalidSortCode("9999999".to_string()));

        let text = "\
100000 9999999 MOD11 0 0 0 0 0 0 8 7 6 5 4 3 2 1
000000 099999 MOD11 0 0 0 0 0 0 8 7 6 5 4 3 2 1
";
        let rules = parse_weight_table(text);
        assert_eq!(rules.len(), 1);
        assert_eq!((rules[0].range_start, rules[0].range_end), (0, 99999));
    }

    #[test]
    fn test_unknown_algorithm_defaults_to_mod11() {
        let rule = parse_weight_line("100000 100000 MODX 0 0 0 0 0 0 8 7 6 5 4 3 2 1").unwrap();
        assert_eq!(rule.algorithm, Algorithm::Mod11);
    }

    #[test]
    fn test_non_numeric_exception_ignored() {
        let rule =
            parse_weight_line("100000 100000 MOD11 0 0 0 0 0 0 8 7 6 5 4 3 2 1 x 9").unwrap();
        assert_eq!(rule.exception, None);
    }

    #[test]
    fn test_parse_substitution_table() {
        let text = "938173 938017\n938289 938068\n\n\
                    938297 93815\n938600 938611 extra\nabcdef 938611\n";
        let entries = parse_substitution_table(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].from_sort_code, "938173");
        assert_eq!(entries[0].to_sort_code, "938017");
        assert_eq!(entries[1].from_sort_code, "938289");
    }
}
