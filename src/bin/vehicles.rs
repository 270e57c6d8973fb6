// src/bin/vehicles.rs - parking vehicle registry
use clap::{Parser, Subcommand};
use parkgate::cli::{finish, CliError, CommonArgs};
use parkgate::db::{DbError, DbSession, NewVehicle};
use parkgate::logging;
use parkgate::plate::{normalize, verify_plate};
use std::process::ExitCode;

/// Manage the vehicles allowed into the parking lot.
#[derive(Parser)]
#[command(name = "vehicles", version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a vehicle; the plate must be a valid Romanian plate
    Add {
        plate: String,
        /// Register the vehicle as not authorized
        #[arg(long)]
        unauthorized: bool,
    },
    /// Remove a vehicle
    Remove { plate: String },
    /// Show a registered vehicle
    Verify {
        plate: String,
        /// Print the vehicle as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a plate's format without touching the database
    Check { plate: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.common.verbose);
    finish(run(cli).await)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Check { plate } => {
            let entry = verify_plate(&plate)?;
            println!("{}", entry);
            Ok(())
        }
        Commands::Add { plate, unauthorized } => {
            let entry = verify_plate(&plate)?;
            let vehicle = NewVehicle {
                plate_number: entry.normalized(),
                is_authorized: !unauthorized,
            };
            let config = cli.common.load_database_config()?;
            let mut session = DbSession::connect(&config.database).await?;
            let result = session.append_vehicle(&vehicle).await;
            session.close().await;
            let vehicle_id = result?;
            println!(
                "Added vehicle {} (id {}, {})",
                vehicle.plate_number,
                vehicle_id,
                if vehicle.is_authorized { "authorized" } else { "not authorized" }
            );
            Ok(())
        }
        Commands::Remove { plate } => {
            let key = normalize(&plate);
            let config = cli.common.load_database_config()?;
            let mut session = DbSession::connect(&config.database).await?;
            let result = session.delete_vehicle(&key).await;
            session.close().await;
            if !result? {
                return Err(DbError::VehicleNotFound(key).into());
            }
            println!("Removed vehicle {}", key);
            Ok(())
        }
        Commands::Verify { plate, json } => {
            let key = normalize(&plate);
            let config = cli.common.load_database_config()?;
            let mut session = DbSession::connect(&config.database).await?;
            let result = session.find_vehicle(&key).await;
            session.close().await;
            let vehicle = result?.ok_or(DbError::VehicleNotFound(key))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&vehicle)?);
            } else {
                println!(
                    "Vehicle {}: id {}, added {}, {}",
                    vehicle.plate_number,
                    vehicle.vehicle_id,
                    vehicle.added_at.format("%Y-%m-%d %H:%M:%S"),
                    if vehicle.is_authorized { "authorized" } else { "not authorized" }
                );
            }
            Ok(())
        }
    }
}
