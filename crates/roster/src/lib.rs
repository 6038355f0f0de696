//! `vrlist-roster`: precinct walk-list engine.
//!
//! Pure engine crate: receives pre-loaded voter rows, returns an ordered
//! roster. The only IO is the injected line [`Console`] used by street
//! selection and pattern prompts.

pub mod assembly;
pub mod console;
pub mod error;
pub mod model;
pub mod pattern;
pub mod pseudonum;
pub mod report;
pub mod screen;
pub mod select;

pub use assembly::{assemble, build_roster, extract_precinct, precinct_counts, PrecinctExtract};
pub use console::Console;
pub use error::RosterError;
pub use model::{Roster, RosterOutcome, Row, StreetKey};
pub use pattern::{validate_pattern, PatternSpec};
pub use report::RosterExport;
