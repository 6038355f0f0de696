//! Relational-style screens over row sequences.
//!
//! Every screen is a stable, order-preserving filter that returns a new
//! `Vec<Row>` and leaves its input untouched.

use std::collections::HashSet;

use regex::Regex;

use crate::error::RosterError;
use crate::model::Row;
use crate::pattern::{in_ranges, NumberRange, PatternSpec};
use crate::pseudonum::sortable_key;

/// Output of [`screen_transform_report`].
#[derive(Debug, Default)]
pub struct ScreenReport {
    pub rows: Vec<Row>,
    /// Distinct tuples of the report columns, read from the raw rows.
    pub distinct: HashSet<Vec<String>>,
}

/// Keep rows whose columns equal every `(column, value)` in `screen`,
/// optionally projecting them through `transform` (`(old, new)` pairs) and
/// collecting distinct `report` tuples along the way.
///
/// A row lacking a screened column simply does not match. A matching row
/// lacking a transform or report column is a contract violation.
pub fn screen_transform_report<'a, I>(
    src: I,
    screen: &[(&str, &str)],
    transform: Option<&[(&str, &str)]>,
    report: Option<&[&str]>,
) -> Result<ScreenReport, RosterError>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut out = ScreenReport::default();

    for row in src {
        let matches = screen.iter().all(|(col, val)| row.get(col) == Some(*val));
        if !matches {
            continue;
        }

        match transform {
            Some(renames) => {
                let mut projected = Row::new();
                for (orig, dest) in renames {
                    projected.insert(*dest, row.field(orig)?);
                }
                out.rows.push(projected);
            }
            None => out.rows.push(row.clone()),
        }

        if let Some(cols) = report {
            out.distinct.insert(row.tuple(cols)?);
        }
    }

    tracing::debug!(
        kept = out.rows.len(),
        distinct = out.distinct.len(),
        "equality screen"
    );
    Ok(out)
}

/// Keep rows whose `cols` tuple is one of `possibilities`.
pub fn screen_collection(
    src: &[Row],
    cols: &[&str],
    possibilities: &HashSet<Vec<String>>,
) -> Result<Vec<Row>, RosterError> {
    let mut rows = Vec::new();
    for row in src {
        if possibilities.contains(&row.tuple(cols)?) {
            rows.push(row.clone());
        }
    }
    tracing::debug!(kept = rows.len(), of = src.len(), "membership screen");
    Ok(rows)
}

/// Keep rows whose `col` matches `re`. The regex must already be anchored at
/// both ends (as built by [`PatternSpec::regex`]) for full-string semantics.
pub fn screen_regex(src: &[Row], col: &str, re: &Regex) -> Result<Vec<Row>, RosterError> {
    let mut rows = Vec::new();
    for row in src {
        if re.is_match(row.field(col)?) {
            rows.push(row.clone());
        }
    }
    tracing::debug!(col, kept = rows.len(), of = src.len(), "regex screen");
    Ok(rows)
}

/// Keep rows whose `col`, read as a pseudonumber, has its leading integer in
/// at least one inclusive range.
pub fn screen_pseudorange(
    src: &[Row],
    col: &str,
    ranges: &[NumberRange],
) -> Result<Vec<Row>, RosterError> {
    let mut rows = Vec::new();
    for row in src {
        if in_ranges(sortable_key(row.field(col)?).number(), ranges) {
            rows.push(row.clone());
        }
    }
    tracing::debug!(col, kept = rows.len(), of = src.len(), "range screen");
    Ok(rows)
}

/// Route to the regex or range screen depending on the pattern kind.
pub fn screen_pattern(src: &[Row], col: &str, spec: &PatternSpec) -> Result<Vec<Row>, RosterError> {
    match spec {
        PatternSpec::Regex { compiled, .. } => screen_regex(src, col, compiled),
        PatternSpec::Ranges(ranges) => screen_pseudorange(src, col, ranges),
    }
}
