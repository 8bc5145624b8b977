//! Command line interface for swab.
//!
//! Parses arguments, builds the service from the global flags and runs one
//! subcommand. Commands return the process exit code.

mod args;
pub mod commands;

pub use args::{Args, BuildArgs, Command, OpenArgs, SaveArgs};

use crate::{error::Result, service::SwabService};

/// Exit code for a project file that does not open on this host.
pub const EXIT_WRONG_KEY: i32 = 3;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let service = SwabService::new(args.settings()?);

    match args.command {
        Command::Build(build) => commands::build::execute(&service, &build).await,
        Command::Save(save) => commands::project::save(&service, &save).await,
        Command::Open(open) => commands::project::open(&service, &open).await,
        Command::Doctor => Ok(commands::doctor::execute(&service)),
    }
}
