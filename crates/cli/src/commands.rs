//! `vrlist run`, `vrlist precincts`, `vrlist streets`.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use vrlist_config::Settings;
use vrlist_io::{load_voter_file, VoterFile};
use vrlist_roster::report::{format_voter, group_thousands};
use vrlist_roster::select::listing_line;
use vrlist_roster::{
    assemble, extract_precinct, precinct_counts, Console, Roster, RosterError, RosterExport,
    RosterOutcome,
};

use crate::CliError;

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(
    settings: &Settings,
    source: Option<PathBuf>,
    precinct: Option<String>,
    export: Option<PathBuf>,
    no_listing: bool,
) -> Result<(), CliError> {
    let mut console = Console::new(io::stdin().lock(), io::stdout().lock());
    console
        .say("Welcome to the voter-registration-list generator!")
        .map_err(CliError::roster)?;

    let source = match source {
        Some(path) => path,
        None => prompt_source(&mut console, settings)?,
    };
    let file = load(&source)?;
    run_session(&mut console, settings, &file, precinct, export, no_listing)
        .map_err(|e| e.with_source(&source))
}

fn prompt_source<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    settings: &Settings,
) -> Result<PathBuf, CliError> {
    console
        .say("Where should I obtain the voter file? (local file path)")
        .map_err(CliError::roster)?;
    if let Some(default) = &settings.source {
        console
            .say(format_args!("Or, press Enter to use {}.", default.display()))
            .map_err(CliError::roster)?;
    }

    let answer = console.read_line().map_err(CliError::roster)?.unwrap_or_default();
    let answer = answer.trim();
    if !answer.is_empty() {
        return Ok(PathBuf::from(answer));
    }
    settings.source.clone().ok_or_else(|| {
        CliError::args("no voter file given")
            .with_hint(format!("pass --source or set `source` in {}", Settings::config_path_display()))
    })
}

fn run_session<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    settings: &Settings,
    file: &VoterFile,
    precinct: Option<String>,
    export: Option<PathBuf>,
    no_listing: bool,
) -> Result<(), SessionError> {
    if let Some(notice) = &file.notice {
        console.say("The file came with the following legal warning:")?;
        console.say(notice.trim_end())?;
    }
    console.say("")?;
    console.say("Got the voter file.")?;

    let precinct = match precinct {
        Some(p) => p.trim().to_string(),
        None => {
            console.say("What precinct are you working in?")?;
            console.read_line()?.unwrap_or_default().trim().to_string()
        }
    };
    if precinct.is_empty() {
        return Err(SessionError::Cli(CliError::args("no precinct given")));
    }
    console.say("Filtering the list. This will take a while.")?;

    let roster = match assemble(&file.rows, &precinct, console)? {
        RosterOutcome::NoSuchPrecinct { precinct } => {
            tracing::info!(%precinct, "nothing to list");
            return Ok(());
        }
        RosterOutcome::Ready(roster) => roster,
    };

    console.say("")?;
    console.say(format_args!(
        "{} voter(s): Precinct {} (selected)",
        group_thousands(roster.rows.len()),
        roster.precinct
    ))?;
    if settings.output.print_roster && !no_listing {
        for row in &roster.rows {
            console.say(format_voter(row)?)?;
        }
    }
    console.say("")?;

    match export {
        Some(requested) => {
            let path = settings.export_path(&requested);
            write_export(&roster, &path)?;
            console.say(format_args!("Saved {}.", path.display()))?;
        }
        None => console.say("All right. Goodbye!")?,
    }
    Ok(())
}

fn write_export(roster: &Roster, path: &Path) -> Result<(), SessionError> {
    let export = RosterExport::from_roster(roster)?;
    let json = export
        .to_json()
        .map_err(|e| CliError::general(format!("cannot serialize roster: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| CliError::general(format!("cannot write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), voters = export.voter_count, "roster exported");
    Ok(())
}

/// Errors inside a session; data errors get the source path as a hint.
enum SessionError {
    Roster(RosterError),
    Cli(CliError),
}

impl From<RosterError> for SessionError {
    fn from(err: RosterError) -> Self {
        Self::Roster(err)
    }
}

impl From<CliError> for SessionError {
    fn from(err: CliError) -> Self {
        Self::Cli(err)
    }
}

impl SessionError {
    fn with_source(self, source: &Path) -> CliError {
        match self {
            Self::Roster(err @ (RosterError::MissingField { .. } | RosterError::DateParse { .. })) => {
                let hint = format!("check the voter file {}", source.display());
                CliError::roster(err).with_hint(hint)
            }
            Self::Roster(err) => CliError::roster(err),
            Self::Cli(err) => err,
        }
    }
}

// ============================================================================
// precincts / streets
// ============================================================================

pub fn cmd_precincts(settings: &Settings, source: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let file = load(&resolve_source(settings, source)?)?;
    let counts = precinct_counts(&file.rows).map_err(CliError::roster)?;

    if json {
        let out = serde_json::to_string_pretty(&counts)
            .map_err(|e| CliError::general(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    for (precinct, voters) in &counts {
        println!("{:>8}  {:>8}", precinct, group_thousands(*voters));
    }
    println!("{} precinct(s), {} voter(s)", counts.len(), group_thousands(file.rows.len()));
    Ok(())
}

pub fn cmd_streets(
    settings: &Settings,
    source: Option<PathBuf>,
    precinct: &str,
    json: bool,
) -> Result<(), CliError> {
    let file = load(&resolve_source(settings, source)?)?;
    let precinct = precinct.trim();
    let Some(extract) = extract_precinct(&file.rows, precinct).map_err(CliError::roster)? else {
        eprintln!("Nobody lives in Precinct {precinct}.");
        return Ok(());
    };

    if json {
        let out = serde_json::to_string_pretty(&extract.streets)
            .map_err(|e| CliError::general(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    for (i, street) in extract.streets.iter().enumerate() {
        println!("{}", listing_line(i + 1, street));
    }
    Ok(())
}

// ============================================================================
// helpers
// ============================================================================

fn resolve_source(settings: &Settings, source: Option<PathBuf>) -> Result<PathBuf, CliError> {
    source.or_else(|| settings.source.clone()).ok_or_else(|| {
        CliError::args("no voter file given")
            .with_hint(format!("pass --source or set `source` in {}", Settings::config_path_display()))
    })
}

fn load(path: &Path) -> Result<VoterFile, CliError> {
    let started = Instant::now();
    let file = load_voter_file(path).map_err(CliError::load)?;
    tracing::info!(
        path = %path.display(),
        rows = file.rows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "voter file loaded"
    );
    Ok(file)
}
