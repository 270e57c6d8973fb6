// src/bin/create_schema.rs - create the parking schema
use clap::Parser;
use parkgate::cli::{finish, CliError, CommonArgs};
use parkgate::db::schema::quote_identifier;
use parkgate::db::{CreateMode, DbSession};
use parkgate::logging;
use std::process::ExitCode;

/// Create the parking database schema on the configured MySQL server.
///
/// Re-running succeeds unless --fail-if-exists is given.
#[derive(Parser)]
#[command(name = "create-schema", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Schema to create [default: schema.name from the configuration]
    name: Option<String>,

    /// Fail when the schema already exists
    #[arg(long)]
    fail_if_exists: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.common.verbose);
    finish(run(cli).await)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.common.load_database_config()?;
    let name = cli.name.unwrap_or(config.schema.name);
    quote_identifier(&name)?;
    let mode = if cli.fail_if_exists {
        CreateMode::FailIfExists
    } else {
        CreateMode::IfNotExists
    };

    let mut session = DbSession::connect_server(&config.database).await?;
    let result = session.create_database(&name, mode).await;
    session.close().await;
    result?;

    println!("Schema {} ready", name);
    Ok(())
}
