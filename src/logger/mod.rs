// src/logger/mod.rs
// =============================================================================
// Loggers render finished results into an output format.
//
// Every logger goes through the same lifecycle:
//
//   Idle --start_output()--> Started --log_url()*--> --end_output()--> Ended
//
// start_output() opens the output stream and writes a header, end_output()
// writes the footer and closes the stream. Anything called out of order
// finds a closed stream and does nothing.
//
// Which fields show up is decided by the `[output] parts` allow-list,
// queried through has_part(). Each logger keeps its own statistics, so any
// number of loggers can consume the same results without interfering.
//
// Renderers:
// - colored: ANSI colored terminal text, grouped by parent URL
// - sql: one INSERT statement per URL
// - html: one table per URL plus a statistics footer
// =============================================================================

mod colored;
mod format;
mod html;
mod output;
mod sql;
mod stats;

pub use colored::ColoredRenderer;
pub use html::HtmlRenderer;
pub use output::{OutputStream, OutputTarget};
pub use sql::SqlRenderer;
pub use stats::Stats;

use crate::config::{Config, OutputConfig};
use crate::result::{UrlResult, Warning};
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

pub const APP_NAME: &str = "linkcheck";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The contract shared by all renderers.
pub trait Logger: Send {
    fn start_output(&mut self);
    fn log_url(&mut self, result: &UrlResult);
    fn end_output(&mut self);
}

/// Output formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LoggerKind {
    Colored,
    Sql,
    Html,
}

impl LoggerKind {
    fn configured_filename(self, config: &Config) -> Option<&PathBuf> {
        match self {
            LoggerKind::Colored => config.colored.filename.as_ref(),
            LoggerKind::Sql => config.sql.filename.as_ref(),
            LoggerKind::Html => config.html.filename.as_ref(),
        }
    }

    /// File the report goes to when it has to leave stdout to another one.
    fn default_filename(self) -> Option<&'static str> {
        match self {
            LoggerKind::Colored => None,
            LoggerKind::Sql => Some("linkcheck-out.sql"),
            LoggerKind::Html => Some("linkcheck-out.html"),
        }
    }
}

/// Where a report is written; None means stdout.
///
/// A configured filename always wins. With several outputs in one run the
/// SQL and HTML reports fall back to their default files, so at most the
/// colored report is left on stdout.
pub fn output_path(kind: LoggerKind, config: &Config, several: bool) -> Option<PathBuf> {
    if let Some(path) = kind.configured_filename(config) {
        return Some(path.clone());
    }
    if several {
        return kind.default_filename().map(PathBuf::from);
    }
    None
}

/// Builds one logger per selected output, in the order given. A kind
/// selected twice gets one logger.
pub fn create_loggers(kinds: &[LoggerKind], config: &Config) -> Vec<Box<dyn Logger>> {
    let mut unique: Vec<LoggerKind> = Vec::new();
    for kind in kinds {
        if !unique.contains(kind) {
            unique.push(*kind);
        }
    }
    let several = unique.len() > 1;

    unique
        .into_iter()
        .map(|kind| {
            let path = output_path(kind, config, several);
            match &path {
                Some(path) => tracing::info!(?kind, "writing report to {}", path.display()),
                None => tracing::debug!(?kind, "writing report to stdout"),
            }
            create_logger(kind, config, OutputTarget::from_filename(path.as_ref()))
        })
        .collect()
}

fn create_logger(kind: LoggerKind, config: &Config, target: OutputTarget) -> Box<dyn Logger> {
    match kind {
        LoggerKind::Colored => Box::new(ColoredRenderer::new(&config.output, &config.colored, target)),
        LoggerKind::Sql => Box::new(SqlRenderer::new(&config.output, &config.sql, target)),
        LoggerKind::Html => Box::new(HtmlRenderer::new(&config.output, &config.html, target)),
    }
}

/// Field name and display label, in rendering order.
const PART_LABELS: &[(&str, &str)] = &[
    ("parenturl", "Parent URL"),
    ("url", "URL"),
    ("name", "Name"),
    ("base", "Base"),
    ("realurl", "Real URL"),
    ("dltime", "D/L time"),
    ("dlsize", "Size"),
    ("checktime", "Check time"),
    ("modified", "Modified"),
    ("info", "Info"),
    ("warning", "Warning"),
    ("result", "Result"),
];

/// Display label of a field.
pub fn part_label(name: &str) -> &'static str {
    PART_LABELS
        .iter()
        .find(|(part, _)| *part == name)
        .map(|(_, label)| *label)
        .unwrap_or("")
}

/// Column all field values line up at: the longest label plus one space.
pub fn label_width() -> usize {
    PART_LABELS
        .iter()
        .map(|(_, label)| label.len())
        .max()
        .unwrap_or(0)
        + 1
}

/// Padding that aligns the value after a field's label.
pub fn spaces(name: &str) -> String {
    " ".repeat(label_width() - part_label(name).len())
}

/// Field allow-list from `[output] parts`.
#[derive(Debug, Clone, Default)]
pub struct Parts {
    all: bool,
    names: BTreeSet<String>,
}

impl Parts {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let names: BTreeSet<String> = names
            .iter()
            .map(|name| name.as_ref().trim().to_ascii_lowercase())
            .collect();
        Self {
            all: names.contains("all"),
            names,
        }
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.all || self.names.contains(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoggerState {
    Idle,
    Started,
    Ended,
}

/// State every renderer carries: the stream, the part filter, statistics
/// and the start time.
pub struct LoggerCore {
    parts: Parts,
    ignore_warnings: Vec<String>,
    target: Option<OutputTarget>,
    state: LoggerState,
    pub out: OutputStream,
    pub stats: Stats,
    started_at: Instant,
    start_time: DateTime<Local>,
}

impl LoggerCore {
    pub fn new(output: &OutputConfig, target: OutputTarget) -> Self {
        Self {
            parts: Parts::new(&output.parts),
            ignore_warnings: output.ignorewarnings.clone(),
            target: Some(target),
            state: LoggerState::Idle,
            out: OutputStream::default(),
            stats: Stats::default(),
            started_at: Instant::now(),
            start_time: Local::now(),
        }
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.has_part(name)
    }

    /// Opens the output. Returns false if the logger was started before or
    /// the output could not be opened.
    pub fn start(&mut self) -> bool {
        if self.state != LoggerState::Idle {
            return false;
        }
        self.state = LoggerState::Started;
        self.started_at = Instant::now();
        self.start_time = Local::now();
        if let Some(target) = self.target.take() {
            self.out = OutputStream::open(target);
        }
        self.out.is_open()
    }

    pub fn is_open(&self) -> bool {
        self.state == LoggerState::Started && self.out.is_open()
    }

    pub fn finish(&mut self) {
        self.out.close();
        self.state = LoggerState::Ended;
    }

    pub fn start_time(&self) -> &DateTime<Local> {
        &self.start_time
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Warnings that should be rendered for a result: none for duplicates,
    /// and never those with an ignored code.
    pub fn printable_warnings<'a>(&self, result: &'a UrlResult) -> Vec<&'a Warning> {
        if result.cached {
            return Vec::new();
        }
        result
            .warnings
            .iter()
            .filter(|warning| !self.ignore_warnings.contains(&warning.code))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    pub use super::output::testing::SharedBuffer;
    use super::OutputTarget;

    pub fn buffer_target() -> (SharedBuffer, OutputTarget) {
        let buffer = SharedBuffer::default();
        (buffer.clone(), OutputTarget::Writer(Box::new(buffer)))
    }
}
