// Voter file loading

pub mod voter_file;

pub use voter_file::{load_voter_file, parse_voter_bytes, LoadError, VoterFile};
