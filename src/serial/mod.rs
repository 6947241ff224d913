//! Serial transport for the send console
//!
//! Only compiled with the `serial` feature (needs libudev on Linux).
//! Provides port discovery and a transmit sink that writes payloads to a
//! USB-to-serial adapter attached to the TNC.

pub mod port;

pub use port::{PortConfig, SerialConnection};

use crate::codec::Payload;
use crate::config::LineEnding;
use crate::console::TransmitSink;
use std::io;

/// Transmit sink writing payloads to an open serial port
pub struct SerialTransmit {
    connection: SerialConnection,
    line_ending: LineEnding,
}

impl SerialTransmit {
    pub fn new(connection: SerialConnection, line_ending: LineEnding) -> Self {
        Self {
            connection,
            line_ending,
        }
    }
}

impl TransmitSink for SerialTransmit {
    fn transmit(&mut self, payload: &Payload) -> io::Result<()> {
        self.connection.write_all(payload.as_bytes())?;
        self.connection.write_all(self.line_ending.as_bytes())?;
        self.connection.flush()?;

        log::info!(
            "Data sent to {}: [{}]",
            self.connection.config().port_path,
            payload.to_hex_string()
        );
        Ok(())
    }
}
