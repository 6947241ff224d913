//! Terminal-hosted sinks and the interactive console loop

use super::pipeline::{KeyOutcome, SendOutcome, SendPipeline, ENTER_KEY};
use super::record::Clock;
use super::{InputSource, OutputSink, TransmitSink};
use crate::codec::{Mode, Payload};
use crate::config::LineEnding;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

/// Command field backed by the command line
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    value: String,
    mode: Mode,
}

impl CommandLine {
    pub fn new(mode: Mode) -> Self {
        Self {
            value: String::new(),
            mode,
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }
}

impl InputSource for CommandLine {
    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, value: String) {
        self.value = value;
    }

    fn mode(&self) -> Mode {
        self.mode
    }
}

/// Console display writing to a terminal, optionally mirrored to a log file
pub struct ConsoleOutput<W: Write> {
    writer: W,
    color: bool,
    log_writer: Option<BufWriter<File>>,
}

impl ConsoleOutput<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> ConsoleOutput<W> {
    pub fn new(writer: W, color: bool) -> Self {
        Self {
            writer,
            color,
            log_writer: None,
        }
    }

    /// Also append every console line to `path` (truncated on open)
    pub fn with_log_file(mut self, path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        self.log_writer = Some(BufWriter::new(file));
        Ok(self)
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn styled(&self, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        match text.split_once(" TX: ") {
            Some((stamp, rest)) => format!("{} {} {}", stamp.dimmed(), "TX:".cyan().bold(), rest),
            None => text.to_string(),
        }
    }

    fn write_console(&mut self, text: &str) -> io::Result<()> {
        let styled = self.styled(text);
        self.writer.write_all(styled.as_bytes())?;
        self.writer.flush()
    }

    fn write_log(&mut self, text: &str) -> io::Result<()> {
        match self.log_writer {
            Some(ref mut log) => {
                log.write_all(text.as_bytes())?;
                log.flush()
            }
            None => Ok(()),
        }
    }
}

impl<W: Write> OutputSink for ConsoleOutput<W> {
    fn append_line(&mut self, text: &str) {
        if let Err(e) = self.write_console(text) {
            log::warn!("Failed to write console line: {}", e);
        }
        if let Err(e) = self.write_log(text) {
            log::warn!("Failed to write log file line: {}", e);
        }
    }
}

/// Stand-in transport that only logs what would go out on the wire
#[derive(Debug, Default)]
pub struct SimulatedTransmit {
    line_ending: LineEnding,
    frames: usize,
}

impl SimulatedTransmit {
    pub fn new(line_ending: LineEnding) -> Self {
        Self {
            line_ending,
            frames: 0,
        }
    }

    /// Number of payloads transmitted so far
    #[cfg(test)]
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl TransmitSink for SimulatedTransmit {
    fn transmit(&mut self, payload: &Payload) -> io::Result<()> {
        let mut frame = payload.as_bytes().to_vec();
        frame.extend_from_slice(self.line_ending.as_bytes());
        let frame = Payload::new(frame);

        self.frames += 1;
        log::info!(
            "Data sent to serial: {:?} [{}]",
            frame.to_char_string(),
            frame.to_hex_string()
        );
        Ok(())
    }
}

/// A line typed at the console that is not a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Mode(Mode),
    Quit,
    Unknown(String),
}

/// Parse `:mode hex`, `:quit` and friends; `None` for ordinary commands
pub fn parse_directive(line: &str) -> Option<Directive> {
    let rest = line.trim_start().strip_prefix(':')?;
    let mut words = rest.split_whitespace();

    let directive = match (words.next(), words.next(), words.next()) {
        (Some("quit") | Some("q"), None, _) => Directive::Quit,
        (Some("mode"), Some(mode), None) => match mode.parse() {
            Ok(mode) => Directive::Mode(mode),
            Err(_) => Directive::Unknown(rest.trim().to_string()),
        },
        _ => Directive::Unknown(rest.trim().to_string()),
    };
    Some(directive)
}

/// Counters reported when the console exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleSummary {
    pub sent: usize,
    pub errors: usize,
}

fn trim_line_end(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

/// Read lines until EOF or `:quit`, pressing Enter on each one
pub fn run_console<R, O, T, C>(
    mut reader: R,
    pipeline: &mut SendPipeline<CommandLine, O, T, C>,
) -> Result<ConsoleSummary>
where
    R: BufRead,
    O: OutputSink,
    T: TransmitSink,
    C: Clock,
{
    let mut summary = ConsoleSummary::default();
    let mut raw = Vec::new();

    loop {
        raw.clear();
        let read = reader
            .read_until(b'\n', &mut raw)
            .context("Failed to read console input")?;
        if read == 0 {
            break;
        }

        let line = match String::from_utf8(trim_line_end(&raw).to_vec()) {
            Ok(line) => line,
            Err(e) => {
                summary.errors += 1;
                eprintln!(
                    "{} Skipping line that is not valid UTF-8: {}",
                    "[ERROR]".red().bold(),
                    e.utf8_error()
                );
                continue;
            }
        };

        match parse_directive(&line) {
            Some(Directive::Quit) => break,
            Some(Directive::Mode(mode)) => {
                pipeline.input_mut().set_mode(mode);
                println!("{} Mode: {}", "[*]".cyan().bold(), mode.to_string().white());
                continue;
            }
            Some(Directive::Unknown(directive)) => {
                eprintln!(
                    "{} Unknown directive ':{}' (try ':mode text', ':mode hex', ':quit')",
                    "[ERROR]".red().bold(),
                    directive
                );
                continue;
            }
            None => {}
        }

        pipeline.input_mut().set_value(line);
        if let KeyOutcome::Handled(result) = pipeline.key_pressed(ENTER_KEY) {
            match result {
                Ok(SendOutcome::Sent(_)) => summary.sent += 1,
                Ok(SendOutcome::Skipped) => {}
                Err(e) => {
                    summary.errors += 1;
                    eprintln!("{} {}", "[ERROR]".red().bold(), e);
                }
            }
        }
    }

    Ok(summary)
}
