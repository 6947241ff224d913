//! Input mode selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How a command string is interpreted before transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Send the command verbatim
    #[default]
    Text,
    /// Decode the command as hex byte pairs
    Hex,
}

/// Returned when a mode name is neither `text` nor `hex`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode '{0}' (expected 'text' or 'hex')")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Mode::Text),
            "hex" => Ok(Mode::Hex),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Text => write!(f, "text"),
            Mode::Hex => write!(f, "hex"),
        }
    }
}
