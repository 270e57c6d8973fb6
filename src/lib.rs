// parkgate: serial bridge and parking database utilities

pub mod cli;
pub mod db;
pub mod hardware;
pub mod logging;
pub mod shutdown;

pub use parkgate_shared::{config, plate};
