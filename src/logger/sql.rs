// src/logger/sql.rs
// =============================================================================
// SQL output: one INSERT statement per checked URL.
//
// Column order is fixed:
//   urlname, recursionlevel, parentname, baseref, errorstring, validstring,
//   warningstring, infoString, valid, url, line, name, checktime,
//   downloadtime, cached
//
// Text columns go through sqlify() (quoted, quotes and backslashes
// escaped, NULL when absent); numbers and flags are written as is. Header
// and footer are SQL comments, so the whole output can be piped into a
// database client.
// =============================================================================

use super::format::{duration_bucketed, strtime};
use super::{Logger, LoggerCore, OutputTarget, APP_NAME, APP_VERSION};
use crate::config::{OutputConfig, SqlConfig};
use crate::result::UrlResult;
use chrono::Local;

const COLUMNS: &str = "urlname,recursionlevel,parentname,baseref,errorstring,validstring,\
                       warningstring,infoString,valid,url,line,name,checktime,downloadtime,cached";

/// Quotes a string for SQL. Single quotes are doubled, backslashes doubled.
pub fn sqlify(value: Option<&str>) -> String {
    match value {
        None => "NULL".to_string(),
        Some(text) => format!("'{}'", text.replace('\\', "\\\\").replace('\'', "''")),
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn int_or_null<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "NULL".to_string(), |value| value.to_string())
}

pub struct SqlRenderer {
    core: LoggerCore,
    dbname: String,
    separator: String,
}

impl SqlRenderer {
    pub fn new(output: &OutputConfig, config: &SqlConfig, target: OutputTarget) -> Self {
        Self {
            core: LoggerCore::new(output, target),
            dbname: config.dbname.clone(),
            separator: config.separator.clone(),
        }
    }

    fn insert_statement(&self, result: &UrlResult, warnings: &[String]) -> String {
        let warning_text = warnings.join("\n");
        let info_text = result.info.join("\n");
        let (error_text, valid_text) = if result.valid {
            (None, Some(result.result_text.as_str()))
        } else {
            (Some(result.result_text.as_str()), None)
        };
        let values = [
            sqlify(Some(&result.base_url)),
            result.recursion_level.to_string(),
            sqlify(non_empty(&result.parent_url)),
            sqlify(non_empty(&result.base_ref)),
            sqlify(error_text),
            sqlify(valid_text),
            sqlify(non_empty(&warning_text)),
            sqlify(non_empty(&info_text)),
            u8::from(result.valid).to_string(),
            sqlify(non_empty(&result.real_url)),
            int_or_null(result.line),
            sqlify(non_empty(&result.name)),
            int_or_null(result.checktime.map(|secs| secs.trunc() as i64)),
            int_or_null(result.dltime.map(|secs| secs.trunc() as i64)),
            u8::from(result.cached).to_string(),
        ];
        format!(
            "insert into {}({}) values ({}){}\n",
            self.dbname,
            COLUMNS,
            values.join(","),
            self.separator
        )
    }
}

impl Logger for SqlRenderer {
    fn start_output(&mut self) {
        if !self.core.start() {
            return;
        }
        if self.core.has_part("intro") {
            let header = format!(
                "-- created by {} {} at {}\n\n",
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
        let printed = self.core.printable_warnings(result).len();
        self.core.stats.log_url(result, printed);
        // The table keeps every warning; ignorewarnings only filters display
        let warnings: Vec<String> = result
            .warnings
            .iter()
            .map(|warning| warning.message.clone())
            .collect();
        let statement = self.insert_statement(result, &warnings);
        self.core.out.write(&statement);
        self.core.out.flush();
    }

    fn end_output(&mut self) {
        if !self.core.is_open() {
            return;
        }
        if self.core.has_part("outro") {
            let (duration, unit) = duration_bucketed(self.core.elapsed_secs());
            let footer = format!(
                "-- Stopped checking at {}\t({:.3} {})\n",
                strtime(&Local::now()),
                duration,
                unit
            );
            self.core.out.write(&footer);
        }
        self.core.finish();
    }
}
