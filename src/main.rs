// src/main.rs - serial-bridge: greet a serial device and echo what it sends
use clap::Parser;
use parkgate::cli::{finish, CliError, CommonArgs};
use parkgate::hardware::{available_ports, open_device, BridgeSettings, SerialBridge};
use parkgate::{logging, shutdown};
use std::process::ExitCode;

/// Write a greeting to a serial device periodically and copy every byte it
/// sends to stdout. Stops on Ctrl+C or SIGTERM.
#[derive(Parser)]
#[command(name = "serial-bridge", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Serial device path (overrides serial.device)
    #[arg(short, long)]
    device: Option<String>,

    /// Baud rate (overrides serial.baud)
    #[arg(short, long)]
    baud: Option<u32>,

    /// List available serial ports and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.common.verbose);
    finish(run(cli).await)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.list {
        for port in available_ports() {
            println!("{}", port);
        }
        return Ok(());
    }

    let mut config = cli.common.load_serial_config()?;
    if let Some(device) = cli.device {
        config.serial.device = device;
    }
    if let Some(baud) = cli.baud {
        config.serial.baud = baud;
    }
    config.serial.validate()?;

    tracing::info!("Starting serial bridge v{}", env!("CARGO_PKG_VERSION"));
    let port = open_device(&config.serial)?;
    tracing::info!(
        "Serial bridge on {} @ {} baud, greeting every {} ms",
        config.serial.device,
        config.serial.baud,
        config.serial.interval_ms
    );

    let cancel = shutdown::install_signal_handler();
    let bridge = SerialBridge::new(port, BridgeSettings::from(&config.serial));
    let mut stdout = tokio::io::stdout();
    let stats = bridge.run(&mut stdout, cancel).await;

    tracing::info!(
        greetings = stats.greetings_sent,
        bytes_echoed = stats.bytes_echoed,
        write_errors = stats.write_errors,
        read_errors = stats.read_errors,
        "Serial bridge stopped, device released"
    );
    Ok(())
}
