//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                     |
//! |------|-------------------------------------------------------------|
//! | 0    | Success, including "nobody lives in that precinct"          |
//! | 1    | General error (unspecified, export write failure)           |
//! | 2    | CLI usage error (bad args, no source, no precinct)          |
//! | 3    | Voter file unreadable or archive cannot be unpacked         |
//! | 4    | Voter file malformed (CSV syntax, missing column, bad date) |
//! | 5    | Settings file unreadable or invalid                         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant error mapping below

use vrlist_io::LoadError;
use vrlist_roster::RosterError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Voter file (3-4)
// =============================================================================

/// Voter file missing, unreadable, or a broken ZIP.
pub const EXIT_SOURCE_UNREADABLE: u8 = 3;

/// Voter file read but its contents cannot be used.
pub const EXIT_SOURCE_MALFORMED: u8 = 4;

// =============================================================================
// Settings (5)
// =============================================================================

/// settings.toml exists but cannot be read or parsed.
pub const EXIT_CONFIG: u8 = 5;

// =============================================================================
// Error mapping
// =============================================================================

pub fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::Io { .. } | LoadError::Archive(_) => EXIT_SOURCE_UNREADABLE,
        LoadError::Csv { .. } | LoadError::MissingColumns(_) => EXIT_SOURCE_MALFORMED,
    }
}

pub fn roster_exit_code(err: &RosterError) -> u8 {
    match err {
        RosterError::MissingField { .. } | RosterError::DateParse { .. } => EXIT_SOURCE_MALFORMED,
        RosterError::Format(_) => EXIT_USAGE,
        RosterError::Io(_) => EXIT_ERROR,
    }
}
