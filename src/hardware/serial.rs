// src/hardware/serial.rs - serial device access
use async_trait::async_trait;
use parkgate_shared::config::SerialConfig;
use serial2_tokio::SerialPort;
use std::io;

use super::BridgeError;

/// Byte-level access to an open serial device.
///
/// Both methods take `&self` so one handle can be shared between the greeter
/// and the reader.
#[async_trait]
pub trait SerialDevice: Send + Sync {
    async fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    async fn write(&self, buf: &[u8]) -> io::Result<usize>;

    async fn write_all(&self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf).await {
                Ok(0) => {
                    return Err(io::Error::new(io::ErrorKind::WriteZero, "serial device accepted no bytes"));
                }
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SerialDevice for SerialPort {
    async fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        SerialPort::read(self, buf).await
    }

    async fn write(&self, buf: &[u8]) -> io::Result<usize> {
        SerialPort::write(self, buf).await
    }
}

/// Open the configured device. A plain baud rate gives 8N1 with no flow control.
pub fn open_device(config: &SerialConfig) -> Result<SerialPort, BridgeError> {
    tracing::info!("Opening serial device: {} at {} baud", config.device, config.baud);
    SerialPort::open(&config.device, config.baud).map_err(|source| BridgeError::Open {
        path: config.device.clone(),
        baud: config.baud,
        source,
    })
}

pub fn available_ports() -> Vec<String> {
    match SerialPort::available_ports() {
        Ok(paths) => paths.iter().map(|p| p.display().to_string()).collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate serial ports: {}", e);
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Accepts at most `chunk` bytes per write.
    struct Trickle {
        chunk: usize,
        written: Mutex<Vec<u8>>,
    }

    #[async_trait]
    impl SerialDevice for Trickle {
        async fn read(&self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }

        async fn write(&self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.chunk);
            self.written.lock().unwrap().extend_from_slice(&buf[..n]);
            Ok(n)
        }
    }

    #[tokio::test]
    async fn write_all_retries_partial_writes() {
        let device = Trickle { chunk: 2, written: Mutex::new(Vec::new()) };
        tokio_test::assert_ok!(device.write_all(b"Hello").await);
        assert_eq!(device.written.lock().unwrap().as_slice(), b"Hello");
    }

    #[tokio::test]
    async fn write_all_fails_on_zero_length_write() {
        let device = Trickle { chunk: 0, written: Mutex::new(Vec::new()) };
        let err = tokio_test::assert_err!(device.write_all(b"Hello").await);
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn open_missing_device_names_the_path() {
        let config = SerialConfig {
            device: "/dev/parkgate-missing-tty".to_string(),
            ..SerialConfig::default()
        };
        let err = open_device(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/dev/parkgate-missing-tty"));
        assert!(message.contains("9600"));
    }
}
