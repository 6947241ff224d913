//! TNC Console
//!
//! Type commands for a TNC (terminal node controller) as plain text or as
//! hex byte pairs, transmit them, and keep a timestamped console log of
//! what was sent.
//!
//! # Usage
//!
//! ```bash
//! # Send one command through the simulated transport
//! tnc-console send "KISS ON"
//!
//! # Send raw bytes (spaces and 0x prefixes are ignored)
//! tnc-console send --mode hex "0xC0 0x00 0x41 0xC0"
//!
//! # Preview what a hex command decodes to
//! tnc-console decode "c0 00 41 c0"
//!
//! # Interactive console; ':mode hex', ':mode text' and ':quit' are directives
//! tnc-console console --log session.log
//!
//! # Real serial port (requires the serial feature)
//! tnc-console serial list
//! tnc-console console -p /dev/ttyUSB0 --baud 9600
//! ```

mod codec;
mod config;
mod console;
#[cfg(feature = "serial")]
mod serial;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use codec::Mode;
use config::ConsoleConfig;
use console::{
    run_console, CommandLine, ConsoleOutput, InputSource, SendOutcome, SendPipeline,
    SimulatedTransmit, TransmitSink,
};

/// TNC Console
///
/// Send text or hex commands to a terminal node controller
#[derive(Parser)]
#[command(name = "tnc-console")]
#[command(version = "0.1.0")]
#[command(about = "Send text or hex commands to a TNC and log what was sent")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Transmit a single command
    Send {
        /// Command to send
        command: String,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Interactive console: every line typed is sent on Enter
    Console {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Show the payload a command decodes to without sending it
    Decode {
        /// Command to decode
        command: String,

        /// Input mode (text or hex)
        #[arg(short, long, default_value = "hex")]
        mode: Mode,
    },

    /// Serial port operations (requires --features serial)
    #[cfg(feature = "serial")]
    #[command(subcommand)]
    Serial(SerialCommands),
}

#[cfg(feature = "serial")]
#[derive(Subcommand)]
enum SerialCommands {
    /// List available serial ports
    List,
}

#[derive(Args)]
struct SessionArgs {
    /// Input mode (text or hex), overrides the config file
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Config file (default: ./tnc-console.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port path; the simulated transport is used when absent
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Mirror the console log to a file
    #[arg(short, long)]
    log: Option<PathBuf>,
}

impl SessionArgs {
    /// Config file values with command line overrides applied
    fn resolve(&self) -> Result<ConsoleConfig> {
        let cwd = std::env::current_dir()?;
        let mut config = ConsoleConfig::discover(self.config.as_deref(), &cwd)?;

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(ref port) = self.port {
            config.serial.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        Ok(config)
    }

    fn output(&self) -> Result<ConsoleOutput<io::Stdout>> {
        let output = ConsoleOutput::stdout(io::stdout().is_terminal());
        match self.log {
            Some(ref path) => output.with_log_file(path),
            None => Ok(output),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Send { command, session } => handle_send(command, session),
        Commands::Console { session } => handle_console(session),
        Commands::Decode { command, mode } => handle_decode(&command, mode),
        #[cfg(feature = "serial")]
        Commands::Serial(cmd) => handle_serial(cmd),
    }
}

/// Pick the transport: a real port when one is configured, else the simulation
fn open_transmit(config: &ConsoleConfig) -> Result<Box<dyn TransmitSink>> {
    #[cfg(feature = "serial")]
    if let Some(port_config) = serial::PortConfig::from_serial_config(&config.serial) {
        let connection = serial::SerialConnection::open(port_config)?;
        println!(
            "{} Connected to {} at {} baud",
            "[OK]".green().bold(),
            connection.config().port_path.white().bold(),
            connection.config().baud_rate
        );
        return Ok(Box::new(serial::SerialTransmit::new(
            connection,
            config.serial.line_ending,
        )));
    }

    #[cfg(not(feature = "serial"))]
    if let Some(ref port) = config.serial.port {
        anyhow::bail!(
            "Cannot open {}: serial port support not compiled in (rebuild with --features serial)",
            port
        );
    }

    log::debug!("No serial port configured, using simulated transport");
    Ok(Box::new(SimulatedTransmit::new(config.serial.line_ending)))
}

fn handle_send(command: String, session: SessionArgs) -> Result<()> {
    let config = session.resolve()?;
    let transmit = open_transmit(&config)?;

    let mut input = CommandLine::new(config.mode);
    input.set_value(command);

    let mut pipeline = SendPipeline::new(input, session.output()?, transmit);
    match pipeline.send() {
        Ok(SendOutcome::Sent(record)) => log::debug!("Sent at {}", record.timestamp),
        Ok(SendOutcome::Skipped) => log::debug!("Nothing to send"),
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn handle_console(session: SessionArgs) -> Result<()> {
    let config = session.resolve()?;
    let transmit = open_transmit(&config)?;
    let mut pipeline = SendPipeline::new(CommandLine::new(config.mode), session.output()?, transmit);

    println!("{}", "--- TNC Console ---".cyan().bold());
    println!(
        "Mode: {} (':mode text', ':mode hex', ':quit'; Ctrl+D to exit)\n",
        config.mode.to_string().white().bold()
    );

    let summary = run_console(io::stdin().lock(), &mut pipeline)?;

    println!("\n{}", "=".repeat(40).dimmed());
    println!("Commands sent: {}", summary.sent);
    println!(
        "Errors: {}",
        if summary.errors > 0 {
            summary.errors.to_string().red().bold().to_string()
        } else {
            summary.errors.to_string().green().to_string()
        }
    );
    if let Some(ref log) = session.log {
        println!("Log saved to: {}", log.display().to_string().white());
    }

    Ok(())
}

fn handle_decode(command: &str, mode: Mode) -> Result<()> {
    let command = command.trim();
    if command.is_empty() {
        println!("{}", "Nothing to decode".yellow());
        return Ok(());
    }

    match codec::decode(command, mode) {
        Ok(payload) => {
            println!("{} {} byte(s)", "[OK]".green().bold(), payload.len());
            println!("  Hex:   {}", payload.to_hex_string());
            println!("  Chars: {:?}", payload.to_char_string());
        }
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(feature = "serial")]
fn handle_serial(cmd: SerialCommands) -> Result<()> {
    match cmd {
        SerialCommands::List => serial::port::print_ports(),
    }
}
