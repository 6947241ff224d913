//! Transmission records and the clock that stamps them

use chrono::{Local, NaiveTime};
use std::fmt;

/// Source of the wall-clock time used for console timestamps
pub trait Clock {
    fn now(&self) -> NaiveTime;
}

/// Local time of day, as shown on the user's machine
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Format a time of day as `HH:MM:SS` (24-hour, zero-padded)
pub fn format_timestamp(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// One successful send, as echoed to the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionRecord {
    pub timestamp: String,
    /// The trimmed command as typed, before any decoding
    pub command: String,
}

impl TransmissionRecord {
    pub fn new(time: NaiveTime, command: &str) -> Self {
        Self {
            timestamp: format_timestamp(time),
            command: command.to_string(),
        }
    }

    /// Console line including the trailing newline
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for TransmissionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] TX: {}", self.timestamp, self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_zero_padded() {
        let time = NaiveTime::from_hms_opt(7, 5, 3).unwrap();
        assert_eq!(format_timestamp(time), "07:05:03");
    }

    #[test]
    fn test_timestamp_is_24_hour() {
        let time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap();
        assert_eq!(format_timestamp(time), "23:59:59");
    }

    #[test]
    fn test_record_line() {
        let time = NaiveTime::from_hms_opt(13, 0, 42).unwrap();
        let record = TransmissionRecord::new(time, "41 42");
        assert_eq!(record.to_line(), "[13:00:42] TX: 41 42\n");
    }
}
