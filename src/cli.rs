// src/cli.rs - argument and exit-code plumbing shared by the binaries
use crate::db::DbError;
use crate::hardware::BridgeError;
use clap::Args;
use parkgate_shared::config::{resolve_config, Config, ConfigError, Section};
use parkgate_shared::plate::PlateError;
use std::process::ExitCode;
use thiserror::Error;

/// Exit status for connection, query and runtime failures.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status for bad arguments, matching clap's own usage errors.
pub const EXIT_USAGE: u8 = 2;

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Path to the TOML configuration file [default: parkgate.toml when present]
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Configuration for the database utilities, with `[database]` validated.
    pub fn load_database_config(&self) -> Result<Config, CliError> {
        let config = resolve_config(self.config.as_deref(), Section::Database)?;
        config.database.validate()?;
        Ok(config)
    }

    /// Configuration for the serial bridge. The caller validates `[serial]`
    /// once its command-line overrides are in.
    pub fn load_serial_config(&self) -> Result<Config, CliError> {
        Ok(resolve_config(self.config.as_deref(), Section::Serial)?)
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid plate number: {0}")]
    Plate(#[from] PlateError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Plate(_) => EXIT_USAGE,
            CliError::Db(e) if e.is_input_error() => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

/// Report `result` on stderr and turn it into the process exit code.
pub fn finish(result: Result<(), CliError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_exit_with_usage_status() {
        let err = CliError::from(DbError::InvalidEntry("plate number must not be empty".to_string()));
        assert_eq!(err.exit_code(), EXIT_USAGE);
        let err = CliError::from(PlateError::Lowercase);
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn runtime_errors_exit_with_failure_status() {
        let err = CliError::from(DbError::DuplicatePlate("B767NTT".to_string()));
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        let err = CliError::from(ConfigError::Invalid("serial.baud must be > 0".to_string()));
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn plate_errors_explain_themselves() {
        let err = CliError::from(PlateError::NumberLength);
        assert_eq!(err.to_string(), "invalid plate number: number part is too short or too long");
    }
}
