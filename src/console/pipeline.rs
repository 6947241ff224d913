//! The send pipeline
//!
//! One invocation runs to completion: trim, decode, transmit, log, clear.
//! Both triggers (the explicit send action and the Enter key) go through
//! [`SendPipeline::send`].

use super::record::{Clock, LocalClock, TransmissionRecord};
use super::{InputSource, OutputSink, TransmitSink};
use crate::codec::{self, InvalidHexInput};
use std::io;
use thiserror::Error;

/// Key name that triggers a send
pub const ENTER_KEY: &str = "Enter";

/// Why a send did not go out
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    InvalidHex(#[from] InvalidHexInput),

    #[error("transmit failed: {0}")]
    Transmit(#[from] io::Error),
}

/// Result of a send that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The command was empty after trimming; nothing happened
    Skipped,
    /// The payload was transmitted and echoed
    Sent(TransmissionRecord),
}

/// Result of a key press on the command field
#[derive(Debug)]
pub enum KeyOutcome {
    /// Not a trigger key; the key keeps its default behaviour
    Ignored,
    /// The key's default behaviour is suppressed and a send was run
    Handled(Result<SendOutcome, SendError>),
}

/// Orchestrates a send against injected input, output and transmit sinks
pub struct SendPipeline<I, O, T, C = LocalClock> {
    input: I,
    output: O,
    transmit: T,
    clock: C,
}

impl<I, O, T> SendPipeline<I, O, T, LocalClock>
where
    I: InputSource,
    O: OutputSink,
    T: TransmitSink,
{
    pub fn new(input: I, output: O, transmit: T) -> Self {
        Self {
            input,
            output,
            transmit,
            clock: LocalClock,
        }
    }
}

impl<I, O, T, C> SendPipeline<I, O, T, C>
where
    I: InputSource,
    O: OutputSink,
    T: TransmitSink,
    C: Clock,
{
    /// Replace the clock used for timestamps
    #[cfg(test)]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> SendPipeline<I, O, T, C2> {
        SendPipeline {
            input: self.input,
            output: self.output,
            transmit: self.transmit,
            clock,
        }
    }

    /// Run one send with whatever the input source holds right now
    ///
    /// On error nothing is transmitted, logged or cleared.
    pub fn send(&mut self) -> Result<SendOutcome, SendError> {
        let mode = self.input.mode();
        let raw = self.input.value();
        let command = raw.trim();

        if command.is_empty() {
            log::trace!("Empty command, nothing to send");
            return Ok(SendOutcome::Skipped);
        }

        let payload = codec::decode(command, mode)?;
        self.transmit.transmit(&payload)?;

        let record = TransmissionRecord::new(self.clock.now(), command);
        self.output.append_line(&record.to_line());
        self.input.set_value(String::new());

        log::debug!("Sent {} byte(s) in {} mode", payload.len(), mode);
        Ok(SendOutcome::Sent(record))
    }

    /// Handle a key press on the command field
    pub fn key_pressed(&mut self, key: &str) -> KeyOutcome {
        if key == ENTER_KEY {
            KeyOutcome::Handled(self.send())
        } else {
            KeyOutcome::Ignored
        }
    }

    #[cfg(test)]
    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    #[cfg(test)]
    pub fn output(&self) -> &O {
        &self.output
    }

    #[cfg(test)]
    pub fn transmitter(&self) -> &T {
        &self.transmit
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (I, O, T) {
        (self.input, self.output, self.transmit)
    }
}
