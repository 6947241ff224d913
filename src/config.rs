//! Console configuration file (tnc-console.toml)
//!
//! Every key is optional; command line flags override what the file says.
//!
//! ```toml
//! mode = "hex"
//!
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 9600
//! line_ending = "none"
//! timeout_ms = 100
//! ```

use crate::codec::Mode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "tnc-console.toml";

/// Default TNC serial speed
pub const DEFAULT_BAUD_RATE: u32 = 9600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Bytes appended after every transmitted payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    None,
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineEnding::None => b"",
            LineEnding::Lf => b"\n",
            LineEnding::Crlf => b"\r\n",
        }
    }
}

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial port path; the simulated transport is used when unset
    pub port: Option<String>,
    pub baud_rate: u32,
    pub line_ending: LineEnding,
    /// Write timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            line_ending: LineEnding::None,
            timeout_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Mode the command field starts in
    pub mode: Mode,
    pub serial: SerialConfig,
}

impl ConsoleConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_content(&content, path)
    }

    /// Parse config file content; `path` is only used in errors
    pub fn parse_content(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, else `tnc-console.toml` from `dir` if present,
    /// else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("Using config file {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.mode, Mode::Text);
        assert_eq!(config.serial.port, None);
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.line_ending, LineEnding::None);
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
mode = "hex"

[serial]
port = "/dev/ttyUSB1"
baud_rate = 115200
line_ending = "crlf"
timeout_ms = 250
"#;
        let config = ConsoleConfig::parse_content(content, Path::new("test.toml")).unwrap();

        assert_eq!(config.mode, Mode::Hex);
        assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.line_ending, LineEnding::Crlf);
        assert_eq!(config.serial.timeout_ms, 250);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let content = r#"
[serial]
line_ending = "lf"
"#;
        let config = ConsoleConfig::parse_content(content, Path::new("test.toml")).unwrap();

        assert_eq!(config.mode, Mode::Text);
        assert_eq!(config.serial.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.serial.line_ending.as_bytes(), b"\n");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result = ConsoleConfig::parse_content("mode = \"octal\"", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            ConsoleConfig::discover(None, dir.path()).unwrap(),
            ConsoleConfig::default()
        );

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "mode = \"hex\"\n").unwrap();
        assert_eq!(ConsoleConfig::discover(None, dir.path()).unwrap().mode, Mode::Hex);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            ConsoleConfig::discover(Some(&missing), dir.path()),
            Err(ConfigError::Read { .. })
        ));
    }
}
