//! Send console core
//!
//! The console reads a command and a mode from an input source, decodes it,
//! hands the payload to a transmit sink and echoes a timestamped line to an
//! output sink. Every collaborator is injected so the pipeline can run
//! against a terminal, a serial port or plain in-memory buffers.

pub mod pipeline;
pub mod record;
pub mod terminal;

pub use pipeline::{SendOutcome, SendPipeline};
pub use terminal::{run_console, CommandLine, ConsoleOutput, SimulatedTransmit};

use crate::codec::{Mode, Payload};
use std::io;

/// Where the command being typed lives
pub trait InputSource {
    /// Current raw value of the command field
    fn value(&self) -> String;
    fn set_value(&mut self, value: String);
    /// Mode currently selected for the command field
    fn mode(&self) -> Mode;
}

/// Append-only console display
pub trait OutputSink {
    fn append_line(&mut self, text: &str);
}

/// Destination for decoded payloads
pub trait TransmitSink {
    fn transmit(&mut self, payload: &Payload) -> io::Result<()>;
}

impl<T: TransmitSink + ?Sized> TransmitSink for Box<T> {
    fn transmit(&mut self, payload: &Payload) -> io::Result<()> {
        (**self).transmit(payload)
    }
}
