//! Operator-supplied filters for address numbers and units.
//!
//! Accepted syntax:
//! - empty: no restriction
//! - `/regex/`: the value must match the regex in full
//! - `3,5-7,10`: print-dialog style inclusive ranges over the leading integer
//!   of the value (see [`crate::pseudonum`])

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RosterError;
use crate::pseudonum::sortable_key;

const MATCH_ALL_SOURCE: &str = ".*";

static MATCH_ALL: Lazy<PatternSpec> =
    Lazy::new(|| PatternSpec::regex(MATCH_ALL_SOURCE).expect("constant regex"));

/// Inclusive `(low, high)` bounds. `low > high` is allowed and matches nothing.
pub type NumberRange = (u64, u64);

#[derive(Debug, Clone)]
pub enum PatternSpec {
    /// Full-string regex. `source` is the text between the slashes.
    Regex { source: String, compiled: Regex },
    Ranges(Vec<NumberRange>),
}

impl PatternSpec {
    /// The "no restriction" pattern.
    pub fn match_all() -> Self {
        MATCH_ALL.clone()
    }

    /// Compile `source` anchored at both ends.
    pub fn regex(source: &str) -> Result<Self, regex::Error> {
        let compiled = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self::Regex { source: source.to_string(), compiled })
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::Regex { source, .. } if source == MATCH_ALL_SOURCE)
    }

    /// `Some(n)` when the pattern is exactly one degenerate range `n-n`.
    pub fn single_number(&self) -> Option<u64> {
        match self {
            Self::Ranges(ranges) => match ranges.as_slice() {
                [(low, high)] if low == high => Some(*low),
                _ => None,
            },
            Self::Regex { .. } => None,
        }
    }

    /// Range lists this long are abbreviated in report titles.
    pub fn is_long_range_list(&self) -> bool {
        matches!(self, Self::Ranges(ranges) if ranges.len() > 2)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Regex { compiled, .. } => compiled.is_match(value),
            Self::Ranges(ranges) => in_ranges(sortable_key(value).number(), ranges),
        }
    }
}

impl Default for PatternSpec {
    fn default() -> Self {
        Self::match_all()
    }
}

impl fmt::Display for PatternSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex { source, .. } => write!(f, "/{source}/"),
            Self::Ranges(ranges) => {
                for (i, (low, high)) in ranges.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if low == high {
                        write!(f, "{low}")?;
                    } else {
                        write!(f, "{low}\u{2013}{high}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

pub(crate) fn in_ranges(number: u64, ranges: &[NumberRange]) -> bool {
    ranges.iter().any(|&(low, high)| low <= number && number <= high)
}

/// Parse `"3,5-7,10"` into `[(3, 3), (5, 7), (10, 10)]`.
pub fn parse_ranges(text: &str) -> Result<Vec<NumberRange>, RosterError> {
    text.split(',').map(parse_range).collect()
}

fn parse_range(component: &str) -> Result<NumberRange, RosterError> {
    let bounds: Vec<&str> = component.split('-').collect();
    match bounds.as_slice() {
        [single] => {
            let n = parse_bound(single)?;
            Ok((n, n))
        }
        [low, high] => Ok((parse_bound(low)?, parse_bound(high)?)),
        _ => Err(RosterError::Format(format!("'{component}' has more than one hyphen"))),
    }
}

fn parse_bound(token: &str) -> Result<u64, RosterError> {
    token
        .trim()
        .parse()
        .map_err(|_| RosterError::Format(format!("'{token}' is not a whole number")))
}

/// Interpret operator input as a pattern. `None` means "invalid, ask again".
pub fn validate_pattern(text: &str) -> Option<PatternSpec> {
    if text.is_empty() {
        return Some(PatternSpec::match_all());
    }

    if text.len() > 2 && text.starts_with('/') && text.ends_with('/') {
        return match PatternSpec::regex(&text[1..text.len() - 1]) {
            Ok(spec) => Some(spec),
            Err(err) => {
                tracing::debug!(pattern = text, error = %err, "rejected regex");
                None
            }
        };
    }

    match parse_ranges(text) {
        Ok(ranges) => Some(PatternSpec::Ranges(ranges)),
        Err(err) => {
            tracing::debug!(pattern = text, error = %err, "rejected range list");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ranges(spec: &PatternSpec) -> &[NumberRange] {
        match spec {
            PatternSpec::Ranges(r) => r,
            other => panic!("expected ranges, got {other:?}"),
        }
    }

    #[test]
    fn parse_ranges_basic() {
        assert_eq!(parse_ranges("3,5-7,10").unwrap(), vec![(3, 3), (5, 7), (10, 10)]);
        assert_eq!(parse_ranges(" 3 , 5 - 7").unwrap(), vec![(3, 3), (5, 7)]);
    }

    #[test]
    fn parse_ranges_keeps_reversed_bounds() {
        assert_eq!(parse_ranges("9-2").unwrap(), vec![(9, 2)]);
    }

    #[test]
    fn parse_ranges_rejects_garbage() {
        assert!(matches!(parse_ranges("x"), Err(RosterError::Format(_))));
        assert!(matches!(parse_ranges("1-2-3"), Err(RosterError::Format(_))));
        assert!(matches!(parse_ranges("1,,2"), Err(RosterError::Format(_))));
        assert!(matches!(parse_ranges("-5"), Err(RosterError::Format(_))));
    }

    #[test]
    fn empty_input_matches_everything() {
        let spec = validate_pattern("").unwrap();
        assert!(spec.is_match_all());
        assert!(spec.matches(""));
        assert!(spec.matches("12B"));
        assert!(spec.matches("anything at all"));
    }

    #[test]
    fn slashed_input_is_full_match_regex() {
        let spec = validate_pattern("/^A.*/").unwrap();
        assert!(spec.matches("A"));
        assert!(spec.matches("APT 4"));
        assert!(!spec.matches("BA"));

        let spec = validate_pattern("/1[0-9]/").unwrap();
        assert!(spec.matches("12"));
        assert!(!spec.matches("120"));
        assert!(!spec.matches("312"));
    }

    #[test]
    fn invalid_regex_is_none() {
        assert!(validate_pattern("/[/").is_none());
    }

    #[test]
    fn bare_slashes_are_not_a_regex() {
        assert!(validate_pattern("/").is_none());
        assert!(validate_pattern("//").is_none());
    }

    #[test]
    fn range_input() {
        let spec = validate_pattern("3-5,9").unwrap();
        assert_eq!(ranges(&spec), &[(3, 5), (9, 9)]);
        assert!(spec.matches("4"));
        assert!(spec.matches("9C"));
        assert!(!spec.matches("6"));
        assert!(validate_pattern("3-").is_none());
    }

    #[test]
    fn single_number_detection() {
        assert_eq!(validate_pattern("1200").unwrap().single_number(), Some(1200));
        assert_eq!(validate_pattern("1200-1200").unwrap().single_number(), Some(1200));
        assert_eq!(validate_pattern("1200-1300").unwrap().single_number(), None);
        assert_eq!(validate_pattern("1,2").unwrap().single_number(), None);
        assert_eq!(validate_pattern("/1200/").unwrap().single_number(), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(validate_pattern("/4[AB]/").unwrap().to_string(), "/4[AB]/");
        assert_eq!(validate_pattern("3,5-7").unwrap().to_string(), "3, 5\u{2013}7");
        assert_eq!(PatternSpec::match_all().to_string(), "/.*/");
    }

    #[test]
    fn slashed_match_all_counts_as_no_restriction() {
        assert!(validate_pattern("/.*/").unwrap().is_match_all());
        assert!(!validate_pattern("/.+/").unwrap().is_match_all());
    }

    proptest! {
        #[test]
        fn range_lists_parse_back_to_their_bounds(parts in prop::collection::vec((0u64..5000, 0u64..5000), 1..6)) {
            let text = parts
                .iter()
                .map(|(a, b)| if a == b { a.to_string() } else { format!("{a}-{b}") })
                .collect::<Vec<_>>()
                .join(",");
            let parsed = parse_ranges(&text).unwrap();
            prop_assert_eq!(parsed, parts);
        }
    }
}
