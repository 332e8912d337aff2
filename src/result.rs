// src/result.rs
// =============================================================================
// The per-URL record that flows through the whole tool.
//
// Lifecycle:
// 1. The fetch stage (src/checker/) creates one UrlResult per checked link
// 2. Enabled check plugins (src/plugins/) may overwrite valid/result_text
// 3. Every active logger (src/logger/) reads it and renders it
//
// Once a result reaches the logger stage nobody mutates it anymore; loggers
// only ever receive a shared reference.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A warning attached to a result: a machine readable code plus a message.
///
/// The code is what `[output] ignorewarnings` matches against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
}

/// Everything known about one checked URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlResult {
    /// The URL exactly as it appeared in the source document
    pub base_url: String,
    /// Final URL after normalization/redirects (may be empty)
    pub real_url: String,
    /// Link text or other human name for the link
    pub name: String,
    /// Document the link was found in (empty for top-level URLs)
    pub parent_url: String,
    /// Base reference used to resolve the link, if any
    pub base_ref: String,
    pub recursion_level: u32,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub page: Option<u32>,
    pub valid: bool,
    pub result_text: String,
    pub info: Vec<String>,
    pub warnings: Vec<Warning>,
    /// Download time in seconds
    pub dltime: Option<f64>,
    /// Total check time in seconds
    pub checktime: Option<f64>,
    /// Content size in bytes
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
    pub content_type: String,
    /// True when this URL was already checked earlier in the run
    pub cached: bool,

    /// Set once any stage called set_result
    #[serde(skip)]
    has_result: bool,

    /// Network session owned by the fetch stage. Plugins borrow it for
    /// auxiliary requests and never replace it.
    #[serde(skip)]
    pub session: Option<reqwest::Client>,
}

impl Default for UrlResult {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            real_url: String::new(),
            name: String::new(),
            parent_url: String::new(),
            base_ref: String::new(),
            recursion_level: 0,
            line: None,
            column: None,
            page: None,
            valid: true,
            result_text: String::new(),
            info: Vec::new(),
            warnings: Vec::new(),
            dltime: None,
            checktime: None,
            size: None,
            modified: None,
            content_type: String::new(),
            cached: false,
            has_result: false,
            session: None,
        }
    }
}

impl UrlResult {
    /// Creates a fresh result for a URL. Validity starts out as `true`
    /// until some stage says otherwise.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Records the verdict for this URL.
    ///
    /// If a verdict was already recorded and `overwrite` is false the call
    /// is ignored. Plugins pass `overwrite = true`, so the last plugin in
    /// the chain wins.
    pub fn set_result(&mut self, text: impl Into<String>, valid: bool, overwrite: bool) {
        let text = text.into();
        if self.has_result && !overwrite {
            tracing::warn!(
                url = %self.base_url,
                "result already set to {:?}, ignoring {:?}",
                self.result_text,
                text
            );
            return;
        }
        self.has_result = true;
        self.valid = valid;
        self.result_text = text;
    }

    pub fn add_info(&mut self, info: impl Into<String>) {
        self.info.push(info.into());
    }

    pub fn add_warning(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Warning {
            code: code.into(),
            message: message.into(),
        });
    }

    /// Whether the literal URL uses the http or https scheme.
    pub fn is_http(&self) -> bool {
        Url::parse(&self.base_url)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }
}
