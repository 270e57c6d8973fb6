// src/hardware/mod.rs
pub mod serial;

pub use serial::{available_ports, open_device, SerialDevice};

use parkgate_shared::config::SerialConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Largest chunk moved from the device to stdout in one step.
const READ_CHUNK: usize = 256;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("unable to open serial device {path} at {baud} baud: {source}")]
    Open {
        path: String,
        baud: u32,
        #[source]
        source: std::io::Error,
    },
}

/// Timing and payload of the bridge loop.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub greeting: Vec<u8>,
    pub interval: Duration,
    pub write_timeout: Duration,
    pub queue_depth: usize,
}

impl From<&SerialConfig> for BridgeSettings {
    fn from(config: &SerialConfig) -> Self {
        Self {
            greeting: config.greeting.as_bytes().to_vec(),
            interval: Duration::from_millis(config.interval_ms),
            write_timeout: Duration::from_millis(config.write_timeout_ms),
            queue_depth: config.queue_depth.max(1),
        }
    }
}

/// Counters reported when the bridge stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub greetings_sent: u64,
    pub bytes_read: u64,
    pub bytes_echoed: u64,
    pub write_errors: u64,
    pub read_errors: u64,
    pub console_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    greetings_sent: AtomicU64,
    bytes_read: AtomicU64,
    bytes_echoed: AtomicU64,
    write_errors: AtomicU64,
    read_errors: AtomicU64,
    console_errors: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn snapshot(&self) -> BridgeStats {
        BridgeStats {
            greetings_sent: self.greetings_sent.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_echoed: self.bytes_echoed.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            console_errors: self.console_errors.load(Ordering::Relaxed),
        }
    }
}

/// Echo loop between a serial device and a console.
///
/// A greeter task writes the greeting every `interval`, a reader task pushes
/// whatever the device produces into a bounded queue, and [`SerialBridge::run`]
/// drains that queue to the console. Steady-state I/O errors are logged and
/// counted, never fatal. The device is released once both tasks have stopped.
pub struct SerialBridge<D: SerialDevice + 'static> {
    device: Arc<D>,
    settings: BridgeSettings,
}

impl<D: SerialDevice + 'static> SerialBridge<D> {
    pub fn new(device: D, settings: BridgeSettings) -> Self {
        Self {
            device: Arc::new(device),
            settings,
        }
    }

    /// Run until `cancel` fires, echoing device bytes to `out`.
    pub async fn run<W>(self, out: &mut W, cancel: CancellationToken) -> BridgeStats
    where
        W: AsyncWrite + Unpin,
    {
        let Self { device, settings } = self;
        let counters = Arc::new(Counters::default());
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(settings.queue_depth);

        let greeter = tokio::spawn(greet(
            device.clone(),
            settings.clone(),
            counters.clone(),
            cancel.clone(),
        ));
        let reader = tokio::spawn(read_device(
            device,
            settings.interval,
            tx,
            counters.clone(),
            cancel.clone(),
        ));

        // Ends once the reader has stopped and dropped its sender.
        while let Some(chunk) = rx.recv().await {
            match echo(out, &chunk).await {
                Ok(()) => Counters::bump(&counters.bytes_echoed, chunk.len() as u64),
                Err(e) => {
                    Counters::bump(&counters.console_errors, 1);
                    tracing::warn!("Console write error: {}", e);
                }
            }
        }

        if let Err(e) = greeter.await {
            tracing::error!("Serial greeter task failed: {}", e);
        }
        if let Err(e) = reader.await {
            tracing::error!("Serial reader task failed: {}", e);
        }

        let stats = counters.snapshot();
        tracing::debug!(?stats, "Serial bridge stopped");
        stats
    }
}

async fn echo<W: AsyncWrite + Unpin>(out: &mut W, chunk: &[u8]) -> std::io::Result<()> {
    out.write_all(chunk).await?;
    out.flush().await
}

/// Sleep for `period` unless cancelled first. Returns `false` on cancellation.
async fn pause(period: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(period) => true,
    }
}

async fn greet<D: SerialDevice>(
    device: Arc<D>,
    settings: BridgeSettings,
    counters: Arc<Counters>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let write = tokio::time::timeout(settings.write_timeout, device.write_all(&settings.greeting));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = write => match result {
                Ok(Ok(())) => {
                    Counters::bump(&counters.greetings_sent, 1);
                    tracing::trace!("Serial TX: {} bytes", settings.greeting.len());
                }
                Ok(Err(e)) => {
                    Counters::bump(&counters.write_errors, 1);
                    tracing::warn!("Serial write error: {}", e);
                }
                Err(_) => {
                    Counters::bump(&counters.write_errors, 1);
                    tracing::warn!("Serial write timed out after {:?}", settings.write_timeout);
                }
            }
        }
    }

    tracing::debug!("Serial greeter stopped");
}

async fn read_device<D: SerialDevice>(
    device: Arc<D>,
    backoff: Duration,
    tx: mpsc::Sender<Vec<u8>>,
    counters: Arc<Counters>,
    cancel: CancellationToken,
) {
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = device.read(&mut buf) => result,
        };

        match result {
            Ok(0) => {
                if !pause(backoff, &cancel).await {
                    break;
                }
            }
            Ok(n) => {
                Counters::bump(&counters.bytes_read, n as u64);
                tracing::trace!("Serial RX: {} bytes", n);
                // Bytes already read are queued even when shutdown has begun,
                // as long as the queue has room.
                let chunk = match tx.try_send(buf[..n].to_vec()) {
                    Ok(()) => continue,
                    Err(TrySendError::Closed(_)) => break,
                    Err(TrySendError::Full(chunk)) => chunk,
                };
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    sent = tx.send(chunk) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                Counters::bump(&counters.read_errors, 1);
                tracing::warn!("Serial read error: {}", e);
                if !pause(backoff, &cancel).await {
                    break;
                }
            }
        }
    }

    tracing::debug!("Serial reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_serial_config() {
        let config = SerialConfig {
            greeting: "ping".to_string(),
            interval_ms: 250,
            write_timeout_ms: 500,
            queue_depth: 8,
            ..SerialConfig::default()
        };
        let settings = BridgeSettings::from(&config);
        assert_eq!(settings.greeting, b"ping");
        assert_eq!(settings.interval, Duration::from_millis(250));
        assert_eq!(settings.write_timeout, Duration::from_millis(500));
        assert_eq!(settings.queue_depth, 8);
    }

    #[test]
    fn zero_queue_depth_is_clamped() {
        let config = SerialConfig { queue_depth: 0, ..SerialConfig::default() };
        assert_eq!(BridgeSettings::from(&config).queue_depth, 1);
    }

    #[tokio::test]
    async fn pause_returns_false_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!pause(Duration::from_secs(60), &cancel).await);
    }

    #[tokio::test]
    async fn pause_returns_true_after_sleeping() {
        let cancel = CancellationToken::new();
        assert!(pause(Duration::from_millis(1), &cancel).await);
    }
}
