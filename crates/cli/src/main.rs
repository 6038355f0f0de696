// vrlist - precinct walk lists from the county voter registration file

mod commands;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{
    load_exit_code, roster_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE,
};
use vrlist_config::{Settings, SettingsError};
use vrlist_io::LoadError;
use vrlist_roster::RosterError;

#[derive(Parser)]
#[command(name = "vrlist")]
#[command(about = "Build precinct walk lists from the county voter registration file")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (default: <config dir>/vrlist/settings.toml)
    #[arg(long, global = true, env = "VRLIST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: pick a precinct, streets and addresses, print the roster
    #[command(after_help = "\
Examples:
  vrlist run
  vrlist run --source voters.zip --precinct 101
  vrlist run -s voters.csv -p 101 --export precinct-101.json --no-listing")]
    Run {
        /// Voter file (CSV, optionally ZIP-wrapped)
        #[arg(long, short = 's')]
        source: Option<PathBuf>,

        /// Precinct code; prompted for when absent
        #[arg(long, short = 'p')]
        precinct: Option<String>,

        /// Write the grouped roster as JSON to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Skip the plain-text roster listing
        #[arg(long)]
        no_listing: bool,
    },

    /// List precinct codes with their registered-voter counts
    #[command(after_help = "\
Examples:
  vrlist precincts --source voters.zip
  vrlist precincts -s voters.csv --json")]
    Precincts {
        /// Voter file (CSV, optionally ZIP-wrapped)
        #[arg(long, short = 's')]
        source: Option<PathBuf>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the streets of one precinct, numbered as in `run`
    #[command(after_help = "\
Examples:
  vrlist streets --source voters.zip --precinct 101
  vrlist streets -s voters.csv -p 101 --json")]
    Streets {
        /// Voter file (CSV, optionally ZIP-wrapped)
        #[arg(long, short = 's')]
        source: Option<PathBuf>,

        /// Precinct code
        #[arg(long, short = 'p')]
        precinct: String,

        /// Output JSON instead of the numbered listing
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  vrlist-roster ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

/// Filter precedence: RUST_LOG, then the `log_filter` setting, then `-v`.
fn init_logging(verbose: u8, settings_filter: Option<&str>) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| settings_filter.and_then(|f| EnvFilter::try_new(f).ok()))
        .unwrap_or_else(|| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let result = Settings::load_from(&settings_path)
        .map_err(CliError::settings)
        .and_then(|settings| {
            init_logging(cli.verbose, settings.log_filter.as_deref());
            tracing::debug!(path = %settings_path.display(), "settings loaded");
            dispatch(cli.command, &settings)
        });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn dispatch(command: Option<Commands>, settings: &Settings) -> Result<(), CliError> {
    match command {
        None => commands::cmd_run(settings, None, None, None, false),
        Some(Commands::Run { source, precinct, export, no_listing }) => {
            commands::cmd_run(settings, source, precinct, export, no_listing)
        }
        Some(Commands::Precincts { source, json }) => commands::cmd_precincts(settings, source, json),
        Some(Commands::Streets { source, precinct, json }) => {
            commands::cmd_streets(settings, source, &precinct, json)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn load(err: LoadError) -> Self {
        let hint = match &err {
            LoadError::MissingColumns(_) => {
                Some("is this the county voter registration extract?".to_string())
            }
            LoadError::Archive(_) => Some("the ZIP should contain the CSV extract as its only member".to_string()),
            _ => None,
        };
        Self { code: load_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn roster(err: RosterError) -> Self {
        Self { code: roster_exit_code(&err), message: err.to_string(), hint: None }
    }

    pub fn settings(err: SettingsError) -> Self {
        Self {
            code: EXIT_CONFIG,
            message: err.to_string(),
            hint: Some("fix or remove the settings file, or point --config elsewhere".to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
