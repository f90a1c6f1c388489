//! mtcheck CLI
//!
//! Compares machine-type compatibility data between emulator builds.

use clap::{Parser, Subcommand};
use mtcheck_core::logging_facility::{init, Profile};
use std::process::ExitCode;

mod commands;

/// Exit status for a run that could not complete
const EXIT_FATAL: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "mtcheck")]
#[command(
    about = "Check machine-type compatibility across emulator builds",
    long_about = None
)]
struct Cli {
    /// Only print diagnostics (warnings and errors still go to stderr)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    debug: bool,

    /// Log as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn profile(&self) -> Profile {
        if self.log_json {
            Profile::Production
        } else if self.debug {
            Profile::Development
        } else if self.quiet {
            Profile::Quiet
        } else {
            Profile::Standard
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare every earlier snapshot with every later one
    Check(commands::check::CheckArgs),
    /// Write one source's raw records to a JSON file
    Dump(commands::dump::DumpArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init(cli.profile());

    let result = match cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Dump(args) => commands::dump::execute(args).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
