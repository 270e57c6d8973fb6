// src/logging.rs - tracing setup shared by all binaries

/// Install the global fmt subscriber.
///
/// Logs go to stderr; stdout is reserved for program output (echoed device
/// bytes, query results).
pub fn init(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
