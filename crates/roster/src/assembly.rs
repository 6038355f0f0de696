//! Precinct screening, selection and final ordering.
//!
//! [`assemble`] is the interactive path used by the binary. The pieces it
//! strings together ([`extract_precinct`], [`build_roster`]) are public so a
//! caller that already knows its streets and patterns can skip the console.

use std::collections::{BTreeMap, HashSet};
use std::io::{BufRead, Write};

use crate::console::Console;
use crate::error::RosterError;
use crate::model::{columns, fields, Roster, RosterOutcome, Row, StreetKey, FIELD_RENAMES};
use crate::pattern::PatternSpec;
use crate::pseudonum::{sortable_key, PseudoNumber};
use crate::report::{format_report_title, group_thousands};
use crate::screen::{screen_collection, screen_pattern, screen_transform_report};
use crate::select::select_streets;

/// One precinct's voters in canonical fields, plus its streets.
#[derive(Debug, Clone)]
pub struct PrecinctExtract {
    pub precinct: String,
    pub voters: Vec<Row>,
    /// Sorted by name, then suffix, then prefix.
    pub streets: Vec<StreetKey>,
}

/// Screen raw rows down to `precinct` and project them to canonical fields.
/// `None` when no row carries that precinct code.
pub fn extract_precinct(rows: &[Row], precinct: &str) -> Result<Option<PrecinctExtract>, RosterError> {
    let report = screen_transform_report(
        rows,
        &[(columns::PRECINCT, precinct)],
        Some(&FIELD_RENAMES[..]),
        Some(&columns::STREET[..]),
    )?;

    if report.distinct.is_empty() {
        tracing::info!(precinct, "no voters in precinct");
        return Ok(None);
    }

    let mut streets: Vec<StreetKey> = report
        .distinct
        .iter()
        .filter_map(|tuple| StreetKey::from_tuple(tuple))
        .collect();
    streets.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    tracing::info!(
        precinct,
        voters = report.rows.len(),
        streets = streets.len(),
        "precinct extracted"
    );
    Ok(Some(PrecinctExtract {
        precinct: precinct.to_string(),
        voters: report.rows,
        streets,
    }))
}

/// Registered voters per raw precinct code.
pub fn precinct_counts(rows: &[Row]) -> Result<BTreeMap<String, usize>, RosterError> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.field(columns::PRECINCT)?.to_string()).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Apply the street, address-number and unit screens and order the result.
pub fn build_roster(
    extract: &PrecinctExtract,
    streets: &[StreetKey],
    primary: &PatternSpec,
    unit: &PatternSpec,
) -> Result<Roster, RosterError> {
    let allowed: HashSet<Vec<String>> = streets.iter().map(StreetKey::to_tuple).collect();
    let on_streets = screen_collection(&extract.voters, &fields::STREET, &allowed)?;
    let on_numbers = screen_pattern(&on_streets, fields::ADDRESS_NUMBER, primary)?;
    let voters = screen_pattern(&on_numbers, fields::ADDRESS_UNIT, unit)?;
    let rows = sort_roster(voters)?;

    let title = format_report_title(&extract.precinct, streets, extract.streets.len(), primary, unit);
    tracing::info!(voters = rows.len(), %title, "roster built");

    Ok(Roster {
        precinct: extract.precinct.clone(),
        title,
        rows,
        precinct_voters: extract.voters.len(),
        streets_selected: streets.len(),
        streets_total: extract.streets.len(),
    })
}

/// Full interactive flow: screen, pick streets, ask for patterns, build.
pub fn assemble<R: BufRead, W: Write>(
    rows: &[Row],
    precinct: &str,
    console: &mut Console<R, W>,
) -> Result<RosterOutcome, RosterError> {
    let Some(extract) = extract_precinct(rows, precinct)? else {
        console.say("Whoops... looks like nobody lives in that precinct.")?;
        console.say("Or maybe the list is malformed.")?;
        return Ok(RosterOutcome::NoSuchPrecinct { precinct: precinct.to_string() });
    };

    console.say(format_args!(
        "There are {} registered voters in Precinct {}.",
        group_thousands(extract.voters.len()),
        precinct
    ))?;
    console.say("")?;

    let streets = select_streets(extract.streets.clone(), console)?;

    let mut primary = PatternSpec::match_all();
    let mut unit = PatternSpec::match_all();
    if let [street] = streets.as_slice() {
        console.say(format_args!("Do you want to use only certain primary numbers on {street}?"))?;
        primary = console.obtain_pattern()?;

        if let Some(number) = primary.single_number() {
            console.say(format_args!("Do you want to use only certain units at {number} {street}?"))?;
            unit = console.obtain_pattern()?;
        }
    }

    console.say("Preparing your list.")?;
    build_roster(&extract, &streets, &primary, &unit).map(RosterOutcome::Ready)
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Final roster order. Field order is comparison order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RosterKey {
    street_name: String,
    street_suffix: String,
    street_prefix: String,
    number: PseudoNumber,
    unit: PseudoNumber,
    edr_date: String,
    vuid: String,
}

impl RosterKey {
    fn of(row: &Row) -> Result<Self, RosterError> {
        Ok(Self {
            street_name: row.field(fields::STREET_NAME)?.to_string(),
            street_suffix: row.field(fields::STREET_SUFFIX)?.to_string(),
            street_prefix: row.field(fields::STREET_PREFIX)?.to_string(),
            number: sortable_key(row.field(fields::ADDRESS_NUMBER)?),
            unit: sortable_key(row.field(fields::ADDRESS_UNIT)?),
            edr_date: row.field(fields::EDR_DATE)?.to_string(),
            vuid: row.field(fields::VUID)?.to_string(),
        })
    }
}

/// Stable sort by street, number, unit, registration date and VUID.
pub fn sort_roster(rows: Vec<Row>) -> Result<Vec<Row>, RosterError> {
    let mut keyed = rows
        .into_iter()
        .map(|row| RosterKey::of(&row).map(|key| (key, row)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}
