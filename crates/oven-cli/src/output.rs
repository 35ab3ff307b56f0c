//! Output management and formatting.
//!
//! Results go to stdout through [`OutputManager`]; diagnostics go to stderr
//! through tracing. In `plain` and `json` formats only [`OutputManager::emit`]
//! writes, so scripts can capture stdout directly.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let resolved_format = match args.output_format {
            OutputFormat::Auto if config.output.format == "json" => OutputFormat::Json,
            OutputFormat::Auto if io::stdout().is_terminal() => OutputFormat::Human,
            OutputFormat::Auto => OutputFormat::Plain,
            explicit => explicit,
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    fn chatty(&self) -> bool {
        !self.quiet && self.resolved_format == OutputFormat::Human
    }

    fn decorated(&self, symbol: &str, msg: &str, style: fn(&str) -> String) -> String {
        if self.no_color {
            format!("{symbol} {msg}")
        } else {
            style(&format!("{symbol} {msg}"))
        }
    }

    /// Generic message; human format only, suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// `✓ <msg>`
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        let line = self.decorated("\u{2713}", msg, |s| s.green().bold().to_string());
        self.term.write_line(&line)
    }

    /// `⚠ <msg>`
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        let line = self.decorated("\u{26a0}", msg, |s| s.yellow().to_string());
        self.term.write_line(&line)
    }

    /// `ℹ <msg>`
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        let line = self.decorated("\u{2139}", msg, |s| s.blue().to_string());
        self.term.write_line(&line)
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if !self.chatty() {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Dimmed secondary text such as paths and defaults.
    pub fn dim(&self, text: &str) -> String {
        if self.no_color {
            text.to_owned()
        } else {
            text.dimmed().to_string()
        }
    }

    /// Machine-facing result line. Written in every format, even when quiet.
    pub fn emit(&self, line: &str) -> io::Result<()> {
        self.term.write_line(line)
    }

    /// Like [`Self::emit`], but only in `plain` format.
    pub fn emit_plain(&self, line: &str) -> io::Result<()> {
        if self.resolved_format != OutputFormat::Plain {
            return Ok(());
        }
        self.emit(line)
    }

    /// Pretty JSON document on stdout.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        let rendered = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.emit(&rendered)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}
