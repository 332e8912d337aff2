// src/checker/mod.rs
// =============================================================================
// The fetch stage that feeds the plugin and logger stages.
//
// Submodules:
// - markdown: Extracts links from markdown text
// - html: Extracts links from HTML pages
// - http: Fetches links and produces one UrlResult per link
// =============================================================================

mod html;
mod http;
mod markdown;

pub use html::extract_html_links;
pub use http::{build_client, check_links};
pub use markdown::extract_markdown_links;

/// A link found in a document (or given on the command line), before it is
/// fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// Link text
    pub name: String,
    /// Document the link was found in
    pub parent_url: String,
    /// `<base href>` that was used to resolve the link
    pub base_ref: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Link {
    /// A link given directly, without a containing document.
    pub fn top_level(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[derive(Default)] give us?
//    - Link::default() with empty strings and None everywhere
//    - Combined with struct update syntax: Link { url, ..Link::default() }
//      sets a few fields and leaves the rest at their defaults
//
// 2. What is impl Into<String>?
//    - Accepts anything convertible to a String (&str, String, ...)
//    - Callers can write Link::top_level("https://...") without .to_string()
// -----------------------------------------------------------------------------
