//! The byte stream behind a live session and how it gets opened.

use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

use log::{debug, info};
use serialport::SerialPort;

use crate::settings::Settings;

// =============================================================================
// Public Interface
// =============================================================================

/// A bidirectional byte stream to the board's REPL.
pub trait Link: Read + Write + Send {
    /// Number of bytes that can be read without blocking.
    fn bytes_to_read(&self) -> io::Result<u32>;
}

/// Opens the serial endpoint found by the locator.
pub trait Connector {
    fn connect(&self, port: &str) -> io::Result<Box<dyn Link>>;
}

/// Opens real serial ports with the line settings from [`Settings`].
///
/// Opening is retried a few times, one second apart: the port node often shows
/// up slightly before the board is ready to accept connections.
#[derive(Debug, Clone)]
pub struct SerialConnector {
    settings: Settings,
}
impl SerialConnector {
    pub fn new(settings: Settings) -> Self {
        SerialConnector { settings }
    }
}
impl Connector for SerialConnector {
    fn connect(&self, port: &str) -> io::Result<Box<dyn Link>> {
        use retry::{delay, retry_with_index};

        let settings = &self.settings;
        let result = retry_with_index(
            delay::Fixed::from_millis(1000).take(3),
            |index| -> Result<Box<dyn SerialPort>, serialport::Error> {
                debug!("Trying to connect {}", index);
                serialport::new(port, settings.baud_rate)
                    .data_bits(settings.data_bits)
                    .stop_bits(settings.stop_bits)
                    .parity(settings.parity)
                    .flow_control(settings.flow_control)
                    .timeout(Duration::from_millis(100))
                    .open()
            },
        );
        match result {
            Ok(port) => {
                info!(
                    "Connected to {} at {} baud",
                    port.name().unwrap_or_default(),
                    settings.baud_rate
                );
                Ok(Box::new(SerialLink { port }))
            }
            Err(retry::Error::Operation {
                error,
                total_delay,
                tries,
            }) => {
                info!(
                    "Failed to open the port after {:?} and {} tries: {}",
                    total_delay, tries, error,
                );
                Err(error.into())
            }
            Err(retry::Error::Internal(message)) => {
                info!("Internal retry error while opening port: {}", message);
                Err(io::Error::new(io::ErrorKind::Other, message))
            }
        }
    }
}

/// A [`Link`] over an open serial port.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}
impl Read for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}
impl Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}
impl Link for SerialLink {
    fn bytes_to_read(&self) -> io::Result<u32> {
        Ok(self.port.bytes_to_read()?)
    }
}
impl fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialLink")
            .field("name", &self.port.name())
            .field("baud_rate", &self.port.baud_rate())
            .field("timeout", &self.port.timeout())
            .finish()
    }
}
