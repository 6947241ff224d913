//! Serial port configuration and connection management

use anyhow::{Context, Result};
use colored::Colorize;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Write};
use std::time::Duration;

use crate::config::{SerialConfig, DEFAULT_BAUD_RATE};

/// Configuration for a serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., /dev/ttyUSB0, /dev/ttyACM0)
    pub port_path: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    pub timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_path: String::from("/dev/ttyUSB0"),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: Duration::from_millis(100),
        }
    }
}

impl PortConfig {
    /// 8N1 settings at the default TNC baud rate
    pub fn new(port_path: &str) -> Self {
        Self {
            port_path: port_path.to_string(),
            ..Default::default()
        }
    }

    /// Build from the `[serial]` config section, if it names a port
    pub fn from_serial_config(config: &SerialConfig) -> Option<Self> {
        config.port.as_deref().map(|path| {
            Self::new(path)
                .with_baud_rate(config.baud_rate)
                .with_timeout(Duration::from_millis(config.timeout_ms))
        })
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An open serial port
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
    config: PortConfig,
}

impl SerialConnection {
    pub fn open(config: PortConfig) -> Result<Self> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .with_context(|| format!("Failed to open serial port: {}", config.port_path))?;

        log::debug!("Opened {} at {} baud", config.port_path, config.baud_rate);
        Ok(Self { port, config })
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

/// USB-to-UART bridge chips found on ESP32 TNC boards and cables
const BRIDGE_CHIPS: &[(u16, &[u16], &str)] = &[
    (0x10c4, &[0xea60, 0xea70], "Silicon Labs CP210x"),
    (0x1a86, &[0x7523, 0x55d4], "WCH CH340/CH9102"),
    (0x0403, &[], "FTDI"),
    (0x067b, &[0x2303], "Prolific PL2303"),
    (0x303a, &[], "Espressif native USB"),
];

/// A serial port that could host a TNC
#[derive(Debug, Clone)]
pub struct TncPort {
    pub path: String,
    /// USB vendor and product IDs; `None` for non-USB ports
    pub usb_id: Option<(u16, u16)>,
    pub product: Option<String>,
}

impl TncPort {
    /// Name of the bridge chip, if the USB IDs are a known one
    ///
    /// An empty product list matches every product of that vendor.
    pub fn bridge_chip(&self) -> Option<&'static str> {
        let (vid, pid) = self.usb_id?;
        BRIDGE_CHIPS
            .iter()
            .find(|(v, pids, _)| *v == vid && (pids.is_empty() || pids.contains(&pid)))
            .map(|(_, _, name)| *name)
    }
}

/// List serial ports, known TNC bridge chips first
pub fn list_ports() -> Result<Vec<TncPort>> {
    let ports = serialport::available_ports().with_context(|| "Failed to enumerate serial ports")?;

    let mut found: Vec<TncPort> = ports
        .into_iter()
        .map(|p| match p.port_type {
            serialport::SerialPortType::UsbPort(info) => TncPort {
                path: p.port_name,
                usb_id: Some((info.vid, info.pid)),
                product: info.product,
            },
            _ => TncPort {
                path: p.port_name,
                usb_id: None,
                product: None,
            },
        })
        .collect();

    found.sort_by_key(|port| port.bridge_chip().is_none());
    Ok(found)
}

/// Print formatted list of available serial ports
pub fn print_ports() -> Result<()> {
    let ports = list_ports()?;

    if ports.is_empty() {
        println!("{}", "No serial ports found".yellow());
        println!("  Connect the TNC and check that your user is in the 'dialout' group");
        return Ok(());
    }

    println!("{}", "Serial Ports:".green().bold());
    for port in &ports {
        let chip = match port.bridge_chip() {
            Some(chip) => chip.green().to_string(),
            None => "unknown adapter".dimmed().to_string(),
        };
        print!("  {} {}", port.path.white().bold(), chip);
        if let Some((vid, pid)) = port.usb_id {
            print!(" [{:04x}:{:04x}]", vid, pid);
        }
        match port.product {
            Some(ref product) => println!(" {}", product),
            None => println!(),
        }
    }

    println!(
        "\n{}",
        format!("Use: tnc-console console -p {} to start sending", ports[0].path).yellow()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineEnding;

    #[test]
    fn test_default_config() {
        let config = PortConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.port_path, "/dev/ttyUSB0");
    }

    #[test]
    fn test_config_builder() {
        let config = PortConfig::new("/dev/ttyACM0")
            .with_baud_rate(115200)
            .with_timeout(Duration::from_secs(1));

        assert_eq!(config.port_path, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    fn usb_port(vid: u16, pid: u16) -> TncPort {
        TncPort {
            path: "/dev/ttyUSB0".to_string(),
            usb_id: Some((vid, pid)),
            product: None,
        }
    }

    #[test]
    fn test_bridge_chip_detection() {
        assert_eq!(usb_port(0x10c4, 0xea60).bridge_chip(), Some("Silicon Labs CP210x"));
        assert_eq!(usb_port(0x0403, 0x6001).bridge_chip(), Some("FTDI"));
        assert_eq!(usb_port(0x1a86, 0x1234).bridge_chip(), None);
        assert_eq!(usb_port(0x1d6b, 0x0002).bridge_chip(), None);

        let onboard = TncPort {
            path: "/dev/ttyS0".to_string(),
            usb_id: None,
            product: None,
        };
        assert_eq!(onboard.bridge_chip(), None);
    }

    #[test]
    fn test_from_serial_config() {
        assert!(PortConfig::from_serial_config(&SerialConfig::default()).is_none());

        let serial = SerialConfig {
            port: Some("/dev/ttyUSB2".to_string()),
            baud_rate: 1200,
            line_ending: LineEnding::Crlf,
            timeout_ms: 500,
        };
        let config = PortConfig::from_serial_config(&serial).unwrap();
        assert_eq!(config.port_path, "/dev/ttyUSB2");
        assert_eq!(config.baud_rate, 1200);
        assert_eq!(config.timeout, Duration::from_millis(500));
    }
}
