//! Presentation helpers over a finished roster: report title, console
//! listing lines, registration dates and the street/number/unit grouping
//! handed to renderers.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::RosterError;
use crate::model::{fields, Roster, Row, StreetKey};
use crate::pattern::PatternSpec;

const MONTHS: [&str; 12] = [
    "Jan.", "Feb.", "Mar.", "Apr.", "May", "June", "July", "Aug.", "Sept.", "Oct.", "Nov.", "Dec.",
];

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
/// Digits break runs, so "34TH" becomes "34Th".
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Summarize how much of the precinct a roster covers.
///
/// `streets` is the committed selection; `unit` only matters when `primary`
/// is a single number.
pub fn format_report_title(
    precinct: &str,
    streets: &[StreetKey],
    streets_total: usize,
    primary: &PatternSpec,
    unit: &PatternSpec,
) -> String {
    let street = match streets {
        [only] => only,
        _ if streets.len() == streets_total => {
            return format!("Precinct {precinct}, full report ({} streets)", streets.len());
        }
        _ => return format!("Precinct {precinct}, {} of {streets_total} streets", streets.len()),
    };

    if streets_total == 1 && primary.is_match_all() {
        return format!("Precinct {precinct}, full report (1 streets)");
    }
    if primary.is_match_all() {
        return format!("Precinct {precinct}, {street}");
    }
    if unit.is_match_all() {
        if primary.is_long_range_list() {
            return format!("Precinct {precinct}, portion of {street}");
        }
        return format!("Precinct {precinct}, {primary} {street}");
    }
    if unit.is_long_range_list() {
        return format!("Precinct {precinct}, {primary} {street} selected units");
    }
    format!("Precinct {precinct}, {primary} {street} #{unit}")
}

/// Fixed-width console line for one voter.
pub fn format_voter(row: &Row) -> Result<String, RosterError> {
    let street = StreetKey::new(
        row.field(fields::STREET_PREFIX)?,
        row.field(fields::STREET_NAME)?,
        row.field(fields::STREET_SUFFIX)?,
    );
    let name = format!(
        "{}, {} {}",
        row.field(fields::NAME_LAST)?,
        row.field(fields::NAME_FIRST)?,
        row.field(fields::NAME_MIDDLE)?
    );
    Ok(format!(
        "{:>6} {:40} #{:6} {:1}{:8} {:40}",
        row.field(fields::ADDRESS_NUMBER)?,
        street.to_string(),
        row.field(fields::ADDRESS_UNIT)?,
        row.field(fields::SUSPENSE)?,
        row.field(fields::EDR_DATE)?,
        title_case(name.trim()),
    ))
}

/// `"20160304"` -> `"2016 Mar.\u{a0}4"`.
pub fn prettify_edr(yyyymmdd: &str) -> Option<String> {
    if yyyymmdd.len() != 8 || !yyyymmdd.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = yyyymmdd[0..4].parse().ok()?;
    let month = yyyymmdd[4..6].parse().ok()?;
    let day = yyyymmdd[6..8].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(format!(
        "{} {}\u{a0}{}",
        &yyyymmdd[0..4],
        MONTHS[date.month0() as usize],
        date.day()
    ))
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoterEntry {
    pub vuid: String,
    pub edr: String,
    pub suspense: String,
    pub name_given: String,
    pub name_last: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitGroup {
    pub unit: String,
    pub voters: Vec<VoterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberGroup {
    pub number: String,
    pub units: Vec<UnitGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreetGroup {
    pub street: String,
    pub numbers: Vec<NumberGroup>,
}

/// Return the trailing group if it has `key`, else start a new one.
fn open_group<'a, T>(
    groups: &'a mut Vec<T>,
    key: &str,
    key_of: impl Fn(&T) -> &str,
    make: impl FnOnce() -> T,
) -> &'a mut T {
    let reuse = groups.last().is_some_and(|g| key_of(g) == key);
    if !reuse {
        groups.push(make());
    }
    let last = groups.len() - 1;
    &mut groups[last]
}

/// Nest an already-sorted roster as street -> number -> unit -> voters.
/// Consecutive rows sharing a key land in the same group.
pub fn group_roster(rows: &[Row]) -> Result<Vec<StreetGroup>, RosterError> {
    let mut streets: Vec<StreetGroup> = Vec::new();

    for row in rows {
        let street = StreetKey::new(
            row.field(fields::STREET_PREFIX)?,
            row.field(fields::STREET_NAME)?,
            row.field(fields::STREET_SUFFIX)?,
        )
        .to_string();
        let number = row.field(fields::ADDRESS_NUMBER)?;
        let unit = row.field(fields::ADDRESS_UNIT)?;
        let voter = voter_entry(row)?;

        let street_group = open_group(&mut streets, &street, |g| g.street.as_str(), || StreetGroup {
            street: street.clone(),
            numbers: Vec::new(),
        });
        let number_group = open_group(&mut street_group.numbers, number, |g| g.number.as_str(), || NumberGroup {
            number: number.to_string(),
            units: Vec::new(),
        });
        let unit_group = open_group(&mut number_group.units, unit, |g| g.unit.as_str(), || UnitGroup {
            unit: unit.to_string(),
            voters: Vec::new(),
        });
        unit_group.voters.push(voter);
    }

    Ok(streets)
}

fn voter_entry(row: &Row) -> Result<VoterEntry, RosterError> {
    let vuid = row.field(fields::VUID)?;
    let edr_date = row.field(fields::EDR_DATE)?;
    let edr = prettify_edr(edr_date).ok_or_else(|| RosterError::DateParse {
        vuid: vuid.to_string(),
        value: edr_date.to_string(),
    })?;
    let given = format!("{} {}", row.field(fields::NAME_FIRST)?, row.field(fields::NAME_MIDDLE)?);
    Ok(VoterEntry {
        vuid: vuid.to_string(),
        edr,
        suspense: row.field(fields::SUSPENSE)?.to_string(),
        name_given: title_case(given.trim()),
        name_last: title_case(row.field(fields::NAME_LAST)?),
    })
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Everything a renderer needs, in one serializable document.
#[derive(Debug, Clone, Serialize)]
pub struct RosterExport {
    pub title: String,
    pub precinct: String,
    pub voter_count: usize,
    pub streets: Vec<StreetGroup>,
}

impl RosterExport {
    pub fn from_roster(roster: &Roster) -> Result<Self, RosterError> {
        Ok(Self {
            title: roster.title.clone(),
            precinct: roster.precinct.clone(),
            voter_count: roster.rows.len(),
            streets: group_roster(&roster.rows)?,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::validate_pattern;

    fn voter(number: &str, unit: &str, last: &str, vuid: &str) -> Row {
        [
            (fields::VUID, vuid),
            (fields::EDR_DATE, "20160304"),
            (fields::NAME_LAST, last),
            (fields::NAME_PREFIX, ""),
            (fields::NAME_FIRST, "MARY"),
            (fields::NAME_MIDDLE, ""),
            (fields::ADDRESS_NUMBER, number),
            (fields::STREET_PREFIX, "W"),
            (fields::STREET_NAME, "OAK"),
            (fields::STREET_SUFFIX, "ST"),
            (fields::ADDRESS_UNIT, unit),
            (fields::SUSPENSE, ""),
        ]
        .into_iter()
        .collect()
    }

    fn streets(n: usize) -> Vec<StreetKey> {
        (0..n).map(|i| StreetKey::new("", format!("S{i}"), "ST")).collect()
    }

    #[test]
    fn title_case_runs() {
        assert_eq!(title_case("MC DONALD-SMITH"), "Mc Donald-Smith");
        assert_eq!(title_case("o'brien"), "O'Brien");
        assert_eq!(title_case("34TH"), "34Th");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn title_variants() {
        let all = PatternSpec::match_all();
        let oak = vec![StreetKey::new("W", "OAK", "ST")];

        assert_eq!(
            format_report_title("101", &streets(4), 4, &all, &all),
            "Precinct 101, full report (4 streets)"
        );
        assert_eq!(
            format_report_title("101", &streets(2), 4, &all, &all),
            "Precinct 101, 2 of 4 streets"
        );
        assert_eq!(format_report_title("101", &oak, 4, &all, &all), "Precinct 101, W Oak St");

        let range = validate_pattern("100-198").unwrap();
        assert_eq!(
            format_report_title("101", &oak, 4, &range, &all),
            "Precinct 101, 100\u{2013}198 W Oak St"
        );
        let long = validate_pattern("1,3,5-9").unwrap();
        assert_eq!(
            format_report_title("101", &oak, 4, &long, &all),
            "Precinct 101, portion of W Oak St"
        );

        let single = validate_pattern("1200").unwrap();
        let units = validate_pattern("/A.*/").unwrap();
        assert_eq!(
            format_report_title("101", &oak, 4, &single, &units),
            "Precinct 101, 1200 W Oak St #/A.*/"
        );
        let many_units = validate_pattern("1,2,3").unwrap();
        assert_eq!(
            format_report_title("101", &oak, 4, &single, &many_units),
            "Precinct 101, 1200 W Oak St selected units"
        );
    }

    #[test]
    fn single_street_precinct_with_range_is_not_full_report() {
        let oak = vec![StreetKey::new("W", "OAK", "ST")];
        let all = PatternSpec::match_all();
        let range = validate_pattern("1-9").unwrap();
        assert_eq!(
            format_report_title("7", &oak, 1, &all, &all),
            "Precinct 7, full report (1 streets)"
        );
        assert_eq!(format_report_title("7", &oak, 1, &range, &all), "Precinct 7, 1\u{2013}9 W Oak St");
    }

    #[test]
    fn voter_line_is_fixed_width() {
        let mut row = voter("1200", "4B", "SMITH", "1");
        row.insert(fields::NAME_MIDDLE, "ANN");
        let line = format_voter(&row).unwrap();
        assert!(line.starts_with("  1200 W Oak St"));
        assert!(line.contains("#4B      20160304 Smith, Mary Ann"));
        assert_eq!(line.len(), 6 + 1 + 40 + 2 + 6 + 1 + 1 + 8 + 1 + 40);
    }

    #[test]
    fn edr_dates() {
        assert_eq!(prettify_edr("20160304").as_deref(), Some("2016 Mar.\u{a0}4"));
        assert_eq!(prettify_edr("19991225").as_deref(), Some("1999 Dec.\u{a0}25"));
        assert_eq!(prettify_edr("20160931"), None);
        assert_eq!(prettify_edr("2016034"), None);
        assert_eq!(prettify_edr("2016-3-4"), None);
    }

    #[test]
    fn grouping_follows_sorted_runs() {
        let rows = vec![
            voter("10", "", "ADAMS", "1"),
            voter("10", "", "BAKER", "2"),
            voter("10", "A", "COLE", "3"),
            voter("12", "", "DAVIS", "4"),
        ];
        let groups = group_roster(&rows).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].street, "W Oak St");
        assert_eq!(groups[0].numbers.len(), 2);
        assert_eq!(groups[0].numbers[0].units.len(), 2);
        assert_eq!(groups[0].numbers[0].units[0].voters.len(), 2);
        assert_eq!(groups[0].numbers[1].units[0].voters[0].name_last, "Davis");
        assert_eq!(groups[0].numbers[0].units[0].voters[0].edr, "2016 Mar.\u{a0}4");
    }

    #[test]
    fn grouping_rejects_bad_dates() {
        let mut row = voter("10", "", "ADAMS", "77");
        row.insert(fields::EDR_DATE, "N/A");
        assert_eq!(
            group_roster(&[row]),
            Err(RosterError::DateParse { vuid: "77".into(), value: "N/A".into() })
        );
    }

    #[test]
    fn export_serializes_nested_groups() {
        let roster = Roster {
            precinct: "101".into(),
            title: "Precinct 101, W Oak St".into(),
            rows: vec![voter("10", "", "ADAMS", "1")],
            precinct_voters: 3,
            streets_selected: 1,
            streets_total: 2,
        };
        let json = RosterExport::from_roster(&roster).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["voter_count"], 1);
        assert_eq!(value["streets"][0]["numbers"][0]["units"][0]["voters"][0]["vuid"], "1");
    }
}
