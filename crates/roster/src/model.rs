use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::RosterError;
use crate::report::title_case;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Raw column names in the county voter extract.
pub mod columns {
    pub const PRECINCT: &str = "PCTCOD";
    pub const VUID: &str = "VUIDNO";
    pub const EDR_DATE: &str = "EDRDAT";
    pub const NAME_LAST: &str = "LSTNAM";
    pub const NAME_PREFIX: &str = "NAMPFX";
    pub const NAME_FIRST: &str = "FSTNAM";
    pub const NAME_MIDDLE: &str = "MIDNAM";
    pub const ADDRESS_NUMBER: &str = "BLKNUM";
    pub const STREET_PREFIX: &str = "STRDIR";
    pub const STREET_NAME: &str = "STRNAM";
    pub const STREET_SUFFIX: &str = "STRTYP";
    pub const ADDRESS_UNIT: &str = "UNITNO";
    pub const SUSPENSE: &str = "SUSIND";

    /// Every column the roster engine reads.
    pub const REQUIRED: [&str; 13] = [
        PRECINCT,
        VUID,
        EDR_DATE,
        NAME_LAST,
        NAME_PREFIX,
        NAME_FIRST,
        NAME_MIDDLE,
        ADDRESS_NUMBER,
        STREET_PREFIX,
        STREET_NAME,
        STREET_SUFFIX,
        ADDRESS_UNIT,
        SUSPENSE,
    ];

    /// Street identity, in (prefix, name, suffix) order.
    pub const STREET: [&str; 3] = [STREET_PREFIX, STREET_NAME, STREET_SUFFIX];
}

/// Canonical field names after projection.
pub mod fields {
    pub const VUID: &str = "vuid";
    pub const EDR_DATE: &str = "edr_date";
    pub const NAME_LAST: &str = "name_last";
    pub const NAME_PREFIX: &str = "name_prefix";
    pub const NAME_FIRST: &str = "name_first";
    pub const NAME_MIDDLE: &str = "name_middle";
    pub const ADDRESS_NUMBER: &str = "address_number";
    pub const STREET_PREFIX: &str = "address_street_prefix";
    pub const STREET_NAME: &str = "address_street_name";
    pub const STREET_SUFFIX: &str = "address_street_suffix";
    pub const ADDRESS_UNIT: &str = "address_unit";
    pub const SUSPENSE: &str = "suspense";

    pub const STREET: [&str; 3] = [STREET_PREFIX, STREET_NAME, STREET_SUFFIX];
}

/// Raw column -> canonical field projection applied once per precinct screen.
pub const FIELD_RENAMES: [(&str, &str); 12] = [
    (columns::VUID, fields::VUID),
    (columns::EDR_DATE, fields::EDR_DATE),
    (columns::NAME_LAST, fields::NAME_LAST),
    (columns::NAME_PREFIX, fields::NAME_PREFIX),
    (columns::NAME_FIRST, fields::NAME_FIRST),
    (columns::NAME_MIDDLE, fields::NAME_MIDDLE),
    (columns::ADDRESS_NUMBER, fields::ADDRESS_NUMBER),
    (columns::STREET_PREFIX, fields::STREET_PREFIX),
    (columns::STREET_NAME, fields::STREET_NAME),
    (columns::STREET_SUFFIX, fields::STREET_SUFFIX),
    (columns::ADDRESS_UNIT, fields::ADDRESS_UNIT),
    (columns::SUSPENSE, fields::SUSPENSE),
];

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One registration record: field name -> string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    fields: BTreeMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Like `get`, but a missing field is a contract violation.
    pub fn field(&self, field: &str) -> Result<&str, RosterError> {
        self.get(field).ok_or_else(|| RosterError::MissingField { field: field.into() })
    }

    /// Values of `cols`, in order, as an owned tuple.
    pub fn tuple(&self, cols: &[&str]) -> Result<Vec<String>, RosterError> {
        cols.iter().map(|c| self.field(c).map(str::to_string)).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Street key
// ---------------------------------------------------------------------------

/// (direction prefix, name, type suffix) identifying one street.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StreetKey {
    pub prefix: String,
    pub name: String,
    pub suffix: String,
}

impl StreetKey {
    pub fn new(prefix: impl Into<String>, name: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            suffix: suffix.into(),
        }
    }

    /// Build from a `(prefix, name, suffix)` tuple as collected by a screen report.
    pub fn from_tuple(values: &[String]) -> Option<Self> {
        match values {
            [prefix, name, suffix] => Some(Self::new(prefix.as_str(), name.as_str(), suffix.as_str())),
            _ => None,
        }
    }

    pub fn to_tuple(&self) -> Vec<String> {
        vec![self.prefix.clone(), self.name.clone(), self.suffix.clone()]
    }

    /// Candidate ordering: name, then suffix, then prefix.
    pub fn sort_key(&self) -> (&str, &str, &str) {
        (&self.name, &self.suffix, &self.prefix)
    }
}

impl fmt::Display for StreetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = format!("{} {} {}", self.prefix, title_case(&self.name), title_case(&self.suffix));
        f.write_str(joined.trim())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Final ordered roster plus the metadata the report title is built from.
#[derive(Debug, Clone)]
pub struct Roster {
    pub precinct: String,
    pub title: String,
    pub rows: Vec<Row>,
    /// Voters registered anywhere in the precinct.
    pub precinct_voters: usize,
    pub streets_selected: usize,
    pub streets_total: usize,
}

#[derive(Debug, Clone)]
pub enum RosterOutcome {
    /// No row carried the requested precinct code.
    NoSuchPrecinct { precinct: String },
    Ready(Roster),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_contract_violation() {
        let row: Row = [("vuid", "1")].into_iter().collect();
        assert_eq!(row.field("vuid").unwrap(), "1");
        assert_eq!(
            row.field("edr_date"),
            Err(RosterError::MissingField { field: "edr_date".into() })
        );
    }

    #[test]
    fn street_display_title_cases_name_and_suffix() {
        assert_eq!(StreetKey::new("N", "LAMAR", "BLVD").to_string(), "N Lamar Blvd");
        assert_eq!(StreetKey::new("", "MAIN", "ST").to_string(), "Main St");
        assert_eq!(StreetKey::new("W", "34TH", "").to_string(), "W 34Th");
    }

    #[test]
    fn street_tuple_roundtrip() {
        let key = StreetKey::new("E", "OAK", "DR");
        assert_eq!(StreetKey::from_tuple(&key.to_tuple()), Some(key));
        assert_eq!(StreetKey::from_tuple(&["A".to_string()]), None);
    }
}
