// src/logger/colored.rs
// =============================================================================
// ANSI colored terminal output, grouped by parent URL.
//
// Consecutive results that share a parent are drawn as a small tree:
//
//   Parent URL http://example.com/index.html
//   |
//   +- URL        http://example.com/a.html
//   |  Result     Valid: 200 OK
//   |
//   +- URL        http://example.com/b.html
//   |  Result     Error: 404 Not Found
//   o
//
// "o" closes a block. A result without a parent always starts a fresh top
// level entry. Output is flushed after every URL so a partial run can be
// inspected while it is still going.
// =============================================================================

use super::format::{duration_long, strsize, strtime};
use super::{label_width, part_label, spaces, Logger, LoggerCore, OutputTarget, APP_NAME, APP_VERSION};
use crate::config::{ColoredConfig, OutputConfig};
use crate::result::UrlResult;
use chrono::Local;

/// Escape sequences, built from the configured SGR codes.
struct Colors {
    parent: String,
    url: String,
    name: String,
    real: String,
    base: String,
    valid: String,
    invalid: String,
    info: String,
    warning: String,
    dltime: String,
    reset: String,
}

fn esc(code: &str) -> String {
    format!("\x1b[{}m", code)
}

impl Colors {
    fn new(config: &ColoredConfig) -> Self {
        Self {
            parent: esc(&config.colorparent),
            url: esc(&config.colorurl),
            name: esc(&config.colorname),
            real: esc(&config.colorreal),
            base: esc(&config.colorbase),
            valid: esc(&config.colorvalid),
            invalid: esc(&config.colorinvalid),
            info: esc(&config.colorinfo),
            warning: esc(&config.colorwarning),
            dltime: esc(&config.colordltime),
            reset: esc(&config.colorreset),
        }
    }
}

pub struct ColoredRenderer {
    core: LoggerCore,
    colors: Colors,
    /// Parent whose block is currently open, if any
    current_parent: Option<String>,
    /// Whether lines belong to an open parent block
    in_block: bool,
}

impl ColoredRenderer {
    pub fn new(output: &OutputConfig, config: &ColoredConfig, target: OutputTarget) -> Self {
        Self {
            core: LoggerCore::new(output, target),
            colors: Colors::new(config),
            current_parent: None,
            in_block: false,
        }
    }

    fn close_block(&mut self) {
        if self.in_block {
            self.core.out.write("o\n");
            self.in_block = false;
        }
    }

    fn write_parent(&mut self, result: &UrlResult) {
        if result.parent_url.is_empty() {
            self.close_block();
            self.current_parent = None;
            return;
        }
        if self.current_parent.as_deref() == Some(result.parent_url.as_str()) {
            return;
        }
        self.close_block();
        let line = format!(
            "\n{}{}{}{}{}\n",
            part_label("parenturl"),
            spaces("parenturl"),
            self.colors.parent,
            result.parent_url,
            self.colors.reset
        );
        self.core.out.write(&line);
        self.current_parent = Some(result.parent_url.clone());
        self.in_block = true;
    }

    fn write_url(&mut self, result: &UrlResult) {
        if self.in_block {
            self.core.out.write("|\n+- ");
        } else {
            self.core.out.write("\n");
        }
        let mut line = format!(
            "{}{}{}{}{}",
            part_label("url"),
            spaces("url"),
            self.colors.url,
            result.base_url,
            self.colors.reset
        );
        if let Some(number) = result.line {
            line.push_str(&format!(", line {}", number));
        }
        if let Some(column) = result.column {
            line.push_str(&format!(", col {}", column));
        }
        if result.cached {
            line.push_str(" (cached)");
        }
        line.push('\n');
        self.core.out.write(&line);
    }

    /// One `label value` line, continuing the block marker if needed.
    fn write_field(&mut self, part: &str, color: &str, value: &str) {
        let prefix = if self.in_block { "|  " } else { "" };
        let line = format!(
            "{}{}{}{}{}{}\n",
            prefix,
            part_label(part),
            spaces(part),
            color,
            value,
            self.colors.reset
        );
        self.core.out.write(&line);
    }

    /// Several values under one label, later ones aligned under the first.
    fn write_lines(&mut self, part: &str, color: &str, values: &[String]) {
        let Some((first, rest)) = values.split_first() else {
            return;
        };
        let color = color.to_string();
        self.write_field(part, &color, first);
        let prefix = if self.in_block { "|  " } else { "" };
        let indent = " ".repeat(label_width());
        for value in rest {
            let line = format!("{}{}{}{}{}\n", prefix, indent, color, value, self.colors.reset);
            self.core.out.write(&line);
        }
    }

    fn write_result(&mut self, result: &UrlResult) {
        let (color, verdict) = if result.valid {
            (self.colors.valid.clone(), "Valid")
        } else {
            (self.colors.invalid.clone(), "Error")
        };
        let text = if result.result_text.trim().is_empty() {
            verdict.to_string()
        } else {
            format!("{}: {}", verdict, result.result_text)
        };
        self.write_field("result", &color, &text);
    }

    fn write_outro(&mut self) {
        let stop_time = Local::now();
        let summary = self.core.stats.summary();
        let footer = format!(
            "\n{}\nStopped checking at {} ({})\n",
            summary,
            strtime(&stop_time),
            duration_long(self.core.elapsed_secs())
        );
        self.core.out.write(&footer);
    }
}

impl Logger for ColoredRenderer {
    fn start_output(&mut self) {
        if !self.core.start() {
            return;
        }
        if self.core.has_part("intro") {
            let header = format!(
                "{} {}\nStart checking at {}\n",
                APP_NAME,
                APP_VERSION,
                strtime(self.core.start_time())
            );
            self.core.out.write(&header);
        }
        self.core.out.flush();
    }

    fn log_url(&mut self, result: &UrlResult) {
        if !self.core.is_open() {
            return;
        }
        let warnings: Vec<String> = self
            .core
            .printable_warnings(result)
            .iter()
            .map(|warning| format!("[{}] {}", warning.code, warning.message))
            .collect();
        self.core.stats.log_url(result, warnings.len());

        if self.core.has_part("parenturl") {
            self.write_parent(result);
        }
        if self.core.has_part("url") {
            self.write_url(result);
        }
        if !result.name.is_empty() && self.core.has_part("name") {
            let color = self.colors.name.clone();
            self.write_field("name", &color, &result.name);
        }
        if !result.base_ref.is_empty() && self.core.has_part("base") {
            let color = self.colors.base.clone();
            self.write_field("base", &color, &result.base_ref);
        }
        if !result.real_url.is_empty() && self.core.has_part("realurl") {
            let color = self.colors.real.clone();
            self.write_field("realurl", &color, &result.real_url);
        }
        if let Some(dltime) = result.dltime.filter(|_| self.core.has_part("dltime")) {
            let color = self.colors.dltime.clone();
            self.write_field("dltime", &color, &format!("{:.3} seconds", dltime));
        }
        if let Some(size) = result.size.filter(|_| self.core.has_part("dlsize")) {
            let color = self.colors.dltime.clone();
            self.write_field("dlsize", &color, &strsize(size));
        }
        if let Some(checktime) = result.checktime.filter(|_| self.core.has_part("checktime")) {
            let color = self.colors.dltime.clone();
            self.write_field("checktime", &color, &format!("{:.3} seconds", checktime));
        }
        if let Some(modified) = result.modified.filter(|_| self.core.has_part("modified")) {
            let color = self.colors.reset.clone();
            self.write_field("modified", &color, &modified.format("%Y-%m-%d %H:%M:%S%z").to_string());
        }
        if !result.info.is_empty() && self.core.has_part("info") {
            let color = self.colors.info.clone();
            self.write_lines("info", &color, &result.info);
        }
        if !warnings.is_empty() && self.core.has_part("warning") {
            let color = self.colors.warning.clone();
            self.write_lines("warning", &color, &warnings);
        }
        if self.core.has_part("result") {
            self.write_result(result);
        }
        self.core.out.flush();
    }

    fn end_output(&mut self) {
        if !self.core.is_open() {
            return;
        }
        if self.core.has_part("outro") {
            self.close_block();
            self.write_outro();
        }
        self.core.finish();
    }
}
