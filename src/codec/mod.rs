//! Command codecs
//!
//! Turns a typed command into the payload handed to the transmit sink.
//! Commands are interpreted either verbatim (`text`) or as a string of
//! hex byte pairs (`hex`).

pub mod hex;
pub mod mode;

pub use hex::{decode, InvalidHexInput, Payload};
pub use mode::Mode;
