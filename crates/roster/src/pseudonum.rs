//! Ordering for address tokens that are mostly, but not always, numeric
//! ("12", "12B", "APT4", "100-1").
//!
//! A [`PseudoNumber`] behaves like the tuple `(number, text...)`: the leading
//! integer always compares first, and the optional text components only break
//! ties, shorter tuples sorting first.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PseudoNumber {
    number: u64,
    /// Empty for pure numbers, `[text]` for all-text tokens,
    /// `[prefix, suffix]` otherwise.
    text: Vec<String>,
}

impl PseudoNumber {
    /// The leading integer. Range screening compares only this.
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl Ord for PseudoNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for PseudoNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Convert an address-number-like string into its sort key.
///
/// - `""` -> `(0,)`
/// - `"0042"` -> `(42,)`
/// - `"REAR"` -> `(0, "REAR")`
/// - `"APT4B"` -> `(4, "APT", "B")`
///
/// Digit runs too long for `u64` saturate at `u64::MAX`.
pub fn sortable_key(s: &str) -> PseudoNumber {
    if s.is_empty() {
        return PseudoNumber { number: 0, text: Vec::new() };
    }

    let Some(num_start) = s.find(|c: char| c.is_ascii_digit()) else {
        return PseudoNumber { number: 0, text: vec![s.to_string()] };
    };
    let num_end = s[num_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |offset| num_start + offset);

    let number = parse_digits(&s[num_start..num_end]);
    let (prefix, suffix) = (&s[..num_start], &s[num_end..]);

    if prefix.is_empty() && suffix.is_empty() {
        return PseudoNumber { number, text: Vec::new() };
    }
    PseudoNumber {
        number,
        text: vec![prefix.to_string(), suffix.to_string()],
    }
}

fn parse_digits(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}
