use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Range/pattern text is malformed. Recovered by re-prompting.
    Format(String),
    /// A field the engine relies on is absent from a row.
    MissingField { field: String },
    /// EDR date is not a valid YYYYMMDD string.
    DateParse { vuid: String, value: String },
    /// Console read/write failure.
    Io(String),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(msg) => write!(f, "invalid range specification: {msg}"),
            Self::MissingField { field } => {
                write!(f, "row is missing required field '{field}' (is the voter file malformed?)")
            }
            Self::DateParse { vuid, value } => {
                write!(f, "voter '{vuid}': cannot parse registration date '{value}'")
            }
            Self::Io(msg) => write!(f, "console error: {msg}"),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<std::io::Error> for RosterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
