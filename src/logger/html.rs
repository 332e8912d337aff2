// src/logger/html.rs
// =============================================================================
// HTML output: a standalone document with one table per checked URL.
//
// Rows carry CSS classes (url, valid, error, warning) that the header's
// stylesheet colors from the `[html]` config section. Everything that comes
// from a checked page (URLs, names, info and warning text, result text) is
// HTML escaped before it is written. Invalid results get links to the W3C
// HTML and CSS validators for their parent page.
// =============================================================================

use super::format::{duration_long, strsize, strtime};
use super::{part_label, Logger, LoggerCore, OutputTarget, APP_NAME, APP_VERSION};
use crate::config::{HtmlConfig, OutputConfig};
use crate::result::UrlResult;
use chrono::Local;
use url::form_urlencoded;

const VALIDATE_HTML: &str = "https://validator.w3.org/check?ss=1&amp;uri=";
const VALIDATE_CSS: &str = "https://jigsaw.w3.org/css-validator/validator?uri=";
const VALIDATE_CSS_OPTIONS: &str = "&amp;warning=1&amp;profile=css3&amp;usermedium=all";

/// Escapes text for use in element content and attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn header(config: &HtmlConfig) -> String {
    format!(
        r#"<!DOCTYPE HTML>
<html>
<head>
<meta http-equiv="Content-Type" content="text/html; charset=utf-8"/>
<title>{title}</title>
<style type="text/css">
<!--
 h2 {{ font-family: Verdana,sans-serif; font-size: 22pt; font-weight: bold; }}
 body {{ font-family: Arial,sans-serif; font-size: 11pt; background-color: {body}; }}
 td {{ font-family: Arial,sans-serif; font-size: 11pt; }}
 code {{ font-family: Courier; }}
 a:link {{color: {link};}}
 a:visited {{color: {link};}}
 a:active {{color: {link};}}
 a:hover {{ color: #34a4ef; }}
 table {{ border-collapse:collapse; }}
 table, th, td {{ border: 1px solid {border}; padding: 2px; }}
 td.url {{ background-color: {url} }}
 td.valid {{ background-color: {valid} }}
 td.error {{ background-color: {error} }}
 td.warning {{ background-color: {warning} }}
-->
</style>
</head>
<body>
"#,
        title = APP_NAME,
        body = config.colorbackground,
        link = config.colorlink,
        border = config.colorborder,
        url = config.colorurl,
        valid = config.colorok,
        error = config.colorerror,
        warning = config.colorwarning,
    )
}

/// Label that never wraps inside a table cell.
fn part(name: &str) -> String {
    part_label(name).replace(' ', "&nbsp;")
}

fn encode_query(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub struct HtmlRenderer {
    core: LoggerCore,
    config: HtmlConfig,
}

impl HtmlRenderer {
    pub fn new(output: &OutputConfig, config: &HtmlConfig, target: OutputTarget) -> Self {
        Self {
            core: LoggerCore::new(output, target),
            config: config.clone(),
        }
    }

    fn row(&mut self, name: &str, value: &str) {
        let line = format!("<tr><td>{}</td><td>{}</td></tr>\n", part(name), value);
        self.core.out.write(&line);
    }

    fn write_url(&mut self, result: &UrlResult) {
        let html = format!(
            "<tr>\n<td class=\"url\">{}</td>\n<td class=\"url\">`{}'</td></tr>\n",
            part("url"),
            escape_html(&result.base_url)
        );
        self.core.out.write(&html);
    }

    fn write_parent(&mut self, result: &UrlResult) {
        let mut html = format!(
            "<tr><td>{}</td><td><a target=\"top\" href=\"{}\">{}</a>",
            part("parenturl"),
            escape_html(&result.parent_url),
            escape_html(&result.parent_url)
        );
        if let Some(line) = result.line {
            html.push_str(&format!(", line {}", line));
        }
        if let Some(column) = result.column {
            html.push_str(&format!(", col {}", column));
        }
        if let Some(page) = result.page.filter(|page| *page > 0) {
            html.push_str(&format!(", page {}", page));
        }
        if !result.valid {
            let uri = encode_query(&result.parent_url);
            html.push_str(&format!(
                "\n(<a href=\"{}{}\">HTML</a>)\n(<a href=\"{}{}{}\">CSS</a>)",
                VALIDATE_HTML, uri, VALIDATE_CSS, uri, VALIDATE_CSS_OPTIONS
            ));
        }
        html.push_str("</td></tr>\n");
        self.core.out.write(&html);
    }

    fn write_real(&mut self, result: &UrlResult) {
        let value = format!(
            "<a target=\"top\" href=\"{}\">{}</a>",
            escape_html(&result.real_url),
            escape_html(&result.real_url)
        );
        self.row("realurl", &value);
    }

    fn write_multiline(&mut self, name: &str, class: Option<&str>, values: &[String]) {
        let text = values
            .iter()
            .map(|value| escape_html(value))
            .collect::<Vec<_>>()
            .join("<br/>\n");
        let class = class
            .map(|class| format!(" class=\"{}\"", class))
            .unwrap_or_default();
        let html = format!(
            "<tr><td{} valign=\"top\">{}</td><td{}>{}</td></tr>\n",
            class,
            part(name),
            class,
            text
        );
        self.core.out.write(&html);
    }

    fn write_result(&mut self, result: &UrlResult) {
        let (class, verdict) = if result.valid {
            ("valid", "Valid")
        } else {
            ("error", "Error")
        };
        let mut html = format!(
            "<tr><td class=\"{}\">{}</td><td class=\"{}\">{}",
            class,
            part("result"),
            class,
            verdict
        );
        if !result.result_text.trim().is_empty() {
            html.push_str(": ");
            html.push_str(&escape_html(&result.result_text));
        }
        html.push_str("</td></tr>\n");
        self.core.out.write(&html);
    }

    fn write_stats(&mut self) {
        let stats = &self.core.stats;
        let mut html = String::from("<br/><i>Statistics</i><br/>\n");
        if stats.number > 0 {
            let types = &stats.link_types;
            html.push_str(&format!(
                "Content types: {} image, {} text, {} video, {} audio, {} application, \
                 {} mail and {} other.\n<br/>\n",
                types.image,
                types.text,
                types.video,
                types.audio,
                types.application,
                types.mail,
                types.other
            ));
            html.push_str(&format!(
                "URL lengths: min={}, max={}, avg={}.\n",
                stats.min_url_length,
                stats.max_url_length,
                stats.avg_url_length()
            ));
        } else {
            html.push_str("No statistics available since no URLs were checked.\n");
        }
        html.push_str("<br/>\n");
        self.core.out.write(&html);
    }

    fn write_outro(&mut self) {
        let html = format!(
            "<br/>\n{}\n<br/>\nStopped checking at {} ({})\n\
             </blockquote><br/><hr><small>Generated by {} {}<br/>\n</small>\n",
            self.core.stats.summary(),
            strtime(&Local::now()),
            duration_long(self.core.elapsed_secs()),
            APP_NAME,
            APP_VERSION
        );
        self.core.out.write(&html);
    }
}

impl Logger for HtmlRenderer {
    fn start_output(&mut self) {
        if !self.core.start() {
            return;
        }
        let head = header(&self.config);
        self.core.out.write(&head);
        self.core
            .out
            .write(&format!("<!-- Generated by {} {} -->", APP_NAME, APP_VERSION));
        if self.core.has_part("intro") {
            let intro = format!(
                "<h2>{}</h2><br/><blockquote>Start checking at {}\n<br/>",
                APP_NAME,
                strtime(self.core.start_time())
            );
            self.core.out.write(&intro);
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
            .map(|warning| warning.message.clone())
            .collect();
        self.core.stats.log_url(result, warnings.len());

        self.core.out.write("<br/><br/><table>\n");
        if self.core.has_part("url") {
            self.write_url(result);
        }
        if !result.name.is_empty() && self.core.has_part("name") {
            let value = format!("`{}'", escape_html(&result.name));
            self.row("name", &value);
        }
        if !result.parent_url.is_empty() && self.core.has_part("parenturl") {
            self.write_parent(result);
        }
        if !result.base_ref.is_empty() && self.core.has_part("base") {
            let value = escape_html(&result.base_ref);
            self.row("base", &value);
        }
        if !result.real_url.is_empty() && self.core.has_part("realurl") {
            self.write_real(result);
        }
        if let Some(dltime) = result.dltime.filter(|_| self.core.has_part("dltime")) {
            self.row("dltime", &format!("{:.3} seconds", dltime));
        }
        if let Some(size) = result.size.filter(|_| self.core.has_part("dlsize")) {
            self.row("dlsize", &strsize(size));
        }
        if let Some(checktime) = result.checktime.filter(|_| self.core.has_part("checktime")) {
            self.row("checktime", &format!("{:.3} seconds", checktime));
        }
        if !result.info.is_empty() && self.core.has_part("info") {
            self.write_multiline("info", None, &result.info);
        }
        if let Some(modified) = result.modified.filter(|_| self.core.has_part("modified")) {
            let value = escape_html(&modified.format("%Y-%m-%d %H:%M:%S%z").to_string());
            self.row("modified", &value);
        }
        if !warnings.is_empty() && self.core.has_part("warning") {
            self.write_multiline("warning", Some("warning"), &warnings);
        }
        if self.core.has_part("result") {
            self.write_result(result);
        }
        self.core.out.write("</table><br/>");
        self.core.out.flush();
    }

    fn end_output(&mut self) {
        if !self.core.is_open() {
            return;
        }
        if self.core.has_part("stats") {
            self.write_stats();
        }
        if self.core.has_part("outro") {
            self.write_outro();
        }
        self.core.out.write("</body></html>\n");
        self.core.finish();
    }
}
