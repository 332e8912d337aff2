// src/config.rs
// =============================================================================
// Run configuration, loaded once from an optional TOML file.
//
// Two views of the same file:
// - Typed sections (checking, output, colored, sql, html) deserialized with
//   serde, every field defaulted so a missing file or section is fine
// - The raw table behind the ConfigSource trait, which is what plugins read
//   their own section from (a section is keyed by the plugin's type name)
//
// Example:
//
//   [checking]
//   enabledplugins = ["PrivateGithub"]
//
//   [output]
//   parts = ["url", "parenturl", "result"]
//
//   [PrivateGithub]
//   prefixes = "github.com/my-org github.com/other-org"
//   ratelimitskip = true
// =============================================================================

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing option '{key}' in section [{section}]")]
    MissingOption { section: String, key: String },
}

/// Read access to named options, grouped by section.
///
/// Plugins only ever see their configuration through this trait.
pub trait ConfigSource {
    fn has_option(&self, section: &str, key: &str) -> bool;
    fn get(&self, section: &str, key: &str) -> Result<String, ConfigError>;
}

/// `[checking]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckingConfig {
    /// Plugin names, run in this order
    pub enabledplugins: Vec<String>,
}

/// `[output]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Fields to render; "all" enables everything
    pub parts: Vec<String>,
    /// Warning codes that are counted but never printed
    pub ignorewarnings: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            parts: vec!["all".to_string()],
            ignorewarnings: Vec::new(),
        }
    }
}

/// `[colored]`, values are ANSI SGR parameters ("1;34" etc.)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColoredConfig {
    pub filename: Option<PathBuf>,
    pub colorparent: String,
    pub colorurl: String,
    pub colorname: String,
    pub colorreal: String,
    pub colorbase: String,
    pub colorvalid: String,
    pub colorinvalid: String,
    pub colorinfo: String,
    pub colorwarning: String,
    pub colordltime: String,
    pub colorreset: String,
}

impl Default for ColoredConfig {
    fn default() -> Self {
        Self {
            filename: None,
            colorparent: "37".into(),
            colorurl: "1".into(),
            colorname: "0".into(),
            colorreal: "36".into(),
            colorbase: "35".into(),
            colorvalid: "1;32".into(),
            colorinvalid: "1;31".into(),
            colorinfo: "0".into(),
            colorwarning: "1;33".into(),
            colordltime: "0".into(),
            colorreset: "0".into(),
        }
    }
}

/// `[sql]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    pub filename: Option<PathBuf>,
    pub dbname: String,
    pub separator: String,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            filename: None,
            dbname: "linksdb".into(),
            separator: ";".into(),
        }
    }
}

/// `[html]`, values are CSS colors
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    pub filename: Option<PathBuf>,
    pub colorbackground: String,
    pub colorurl: String,
    pub colorborder: String,
    pub colorlink: String,
    pub colorwarning: String,
    pub colorerror: String,
    pub colorok: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            filename: None,
            colorbackground: "#fff7e5".into(),
            colorurl: "#dcd5cf".into(),
            colorborder: "#000000".into(),
            colorlink: "#191c83".into(),
            colorwarning: "#e0954e".into(),
            colorerror: "#db4930".into(),
            colorok: "#3ba557".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Sections {
    checking: CheckingConfig,
    output: OutputConfig,
    colored: ColoredConfig,
    sql: SqlConfig,
    html: HtmlConfig,
}

/// The whole configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub checking: CheckingConfig,
    pub output: OutputConfig,
    pub colored: ColoredConfig,
    pub sql: SqlConfig,
    pub html: HtmlConfig,
    raw: toml::Table,
}

impl Config {
    /// Loads the config file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let raw: toml::Table = toml::from_str(content)?;
        let sections: Sections = toml::from_str(content)?;
        tracing::debug!(sections = raw.len(), "configuration parsed");
        Ok(Self {
            checking: sections.checking,
            output: sections.output,
            colored: sections.colored,
            sql: sections.sql,
            html: sections.html,
            raw,
        })
    }

    fn lookup(&self, section: &str, key: &str) -> Option<&toml::Value> {
        self.raw.get(section)?.as_table()?.get(key)
    }
}

impl ConfigSource for Config {
    fn has_option(&self, section: &str, key: &str) -> bool {
        self.lookup(section, key).is_some()
    }

    fn get(&self, section: &str, key: &str) -> Result<String, ConfigError> {
        let value = self
            .lookup(section, key)
            .ok_or_else(|| ConfigError::MissingOption {
                section: section.to_string(),
                key: key.to_string(),
            })?;
        Ok(value_to_string(value))
    }
}

// Scalars become their plain text, arrays one entry per line.
fn value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Lenient boolean reading for option values: anything but an explicit
/// "off" spelling counts as enabled.
pub fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.checking.enabledplugins.is_empty());
        assert_eq!(config.output.parts, vec!["all"]);
        assert_eq!(config.sql.dbname, "linksdb");
        assert_eq!(config.sql.separator, ";");
        assert_eq!(config.html.colorok, "#3ba557");
        assert_eq!(config.colored.colorreset, "0");
    }

    #[test]
    fn test_missing_path_is_default() {
        let config = Config::load(None).unwrap();
        assert!(config.colored.filename.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
[checking]
enabledplugins = ["PrivateGithub"]

[sql]
dbname = "links"

[output]
parts = ["url", "result"]
"#,
        )
        .unwrap();
        assert_eq!(config.checking.enabledplugins, vec!["PrivateGithub"]);
        assert_eq!(config.sql.dbname, "links");
        assert_eq!(config.sql.separator, ";");
        assert_eq!(config.output.parts, vec!["url", "result"]);
    }

    #[test]
    fn test_config_source_reads_plugin_section() {
        let config = Config::from_toml_str(
            r#"
[PrivateGithub]
prefixes = "github.com/test github.com/other"
ratelimitskip = true
"#,
        )
        .unwrap();
        assert!(config.has_option("PrivateGithub", "prefixes"));
        assert!(!config.has_option("PrivateGithub", "missing"));
        assert!(!config.has_option("Other", "prefixes"));
        assert_eq!(
            config.get("PrivateGithub", "prefixes").unwrap(),
            "github.com/test github.com/other"
        );
        assert_eq!(config.get("PrivateGithub", "ratelimitskip").unwrap(), "true");
    }

    #[test]
    fn test_array_values_are_joined_by_newline() {
        let config =
            Config::from_toml_str("[PrivateGithub]\nprefixes = [\"a.com/x\", \"b.com/y\"]\n")
                .unwrap();
        assert_eq!(config.get("PrivateGithub", "prefixes").unwrap(), "a.com/x\nb.com/y");
    }

    #[test]
    fn test_get_missing_option_errors() {
        let config = Config::default();
        let err = config.get("PrivateGithub", "prefixes").unwrap_err();
        assert!(matches!(err, ConfigError::MissingOption { .. }));
    }

    #[test]
    fn test_load_reports_parse_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linkcheck.toml");
        fs::write(&path, "[checking\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("linkcheck.toml"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("notempty"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("Off"));
        assert!(!parse_flag(""));
    }
}
