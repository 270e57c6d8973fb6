// parkgate_shared: configuration and plate validation shared by the parkgate binaries

pub mod config;
pub mod plate;

pub use config::{Config, ConfigError, DatabaseConfig, SchemaConfig, Section, SerialConfig};
pub use plate::{normalize, verify_plate, PlateEntry, PlateError, PlateKind};
