// src/bin/add_entry.rs - insert one np_users row
use clap::Parser;
use parkgate::cli::{finish, CliError, CommonArgs};
use parkgate::db::{DbSession, NpUserEntry};
use parkgate::logging;
use parkgate::plate::verify_plate;
use std::process::ExitCode;

/// Record which employee a plate number belongs to.
///
/// Both values are sent as query parameters and stored exactly as given.
#[derive(Parser)]
#[command(name = "add-entry", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Vehicle plate number
    plate_number: String,

    /// Employee the vehicle belongs to
    employee_name: String,

    /// Reject plate numbers that are not valid Romanian plates
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.common.verbose);
    finish(run(cli).await)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let entry = NpUserEntry::new(cli.plate_number, cli.employee_name)?;
    if cli.strict {
        verify_plate(entry.plate_number())?;
    }
    let config = cli.common.load_database_config()?;

    let mut session = DbSession::connect(&config.database).await?;
    let result = session.insert_np_user(&entry).await;
    session.close().await;
    result?;

    Ok(())
}
