// src/checker/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
//
// We also use the `url` crate to resolve relative URLs to absolute URLs.
// A <base href> in the document takes precedence over the page URL and is
// recorded as the link's base reference.
// =============================================================================

use super::Link;
use scraper::{Html, Selector};
use url::Url;

// Extracts all links from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL of the page (for resolving relative links)
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   page_url = "https://example.com"
//   result = [Link { url: "https://example.com/docs", name: "Docs", .. }]
pub fn extract_html_links(html: &str, page_url: &str) -> Vec<Link> {
    let mut links = Vec::new();

    let document = Html::parse_document(html);

    // Constant selectors, known to be valid
    let anchors = Selector::parse("a[href]").unwrap();
    let base_tag = Selector::parse("base[href]").unwrap();

    let page = match Url::parse(page_url) {
        Ok(url) => url,
        Err(err) => {
            tracing::warn!(%page_url, "invalid base URL, no links extracted: {}", err);
            return links;
        }
    };

    let base_ref = document
        .select(&base_tag)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(str::to_string)
        .unwrap_or_default();
    let base = if base_ref.is_empty() {
        page.clone()
    } else {
        page.join(&base_ref).unwrap_or_else(|_| page.clone())
    };

    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute_url) = resolve_url(&base, href) else {
            continue;
        };
        if !is_checkable_link(&absolute_url) {
            continue;
        }
        let name = element
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        links.push(Link {
            url: absolute_url,
            name,
            parent_url: page_url.to_string(),
            base_ref: base_ref.clone(),
            ..Link::default()
        });
    }

    links
}

// Resolves a possibly-relative URL to an absolute URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "https://other.com" -> Some("https://other.com/")
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.join(href).ok().map(|url| url.to_string()),
    }
}

// Only http/https links are handed to the fetch stage
fn is_checkable_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a CSS selector here?
//    - "a[href]" matches every <a> element that has an href attribute
//    - "base[href]" matches the <base> element, if the page has one
//    - document.select() returns an iterator over the matching elements
//
// 2. Why does <base href> matter?
//    - Browsers resolve relative links against it instead of the page URL
//    - We do the same, and keep its value in base_ref for the report
//
// 3. What is let-else?
//    - `let Some(href) = ... else { continue; };` binds the value if the
//      pattern matches and otherwise runs the else block
//    - The else block must leave the scope (continue, return, break)
//
// 4. Why collect the text and split on whitespace?
//    - Anchor text can span several text nodes and lines
//    - Splitting and re-joining collapses all whitespace to single spaces
//
// 5. Why unwrap() on the selectors?
//    - The selector strings are constants and known to be valid
//    - A failure would be a programmer error, not bad user input
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_html_links(html, "https://example.com");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://www.rust-lang.org/");
        assert_eq!(links[0].name, "Rust");
        assert_eq!(links[0].parent_url, "https://example.com");
        assert!(links[0].base_ref.is_empty());
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_html_links(html, "https://example.com/page");
        assert_eq!(links[0].url, "https://example.com/docs");
    }

    #[test]
    fn test_base_tag_is_used_and_recorded() {
        let html = r#"<html><head><base href="https://cdn.example.com/v2/"></head>
            <body><a href="guide.html">The
               guide</a></body></html>"#;
        let links = extract_html_links(html, "https://example.com/page");
        assert_eq!(links[0].url, "https://cdn.example.com/v2/guide.html");
        assert_eq!(links[0].base_ref, "https://cdn.example.com/v2/");
        assert_eq!(links[0].name, "The guide");
    }

    #[test]
    fn test_skip_mailto() {
        let html = r#"<a href="mailto:test@example.com">Email</a>"#;
        assert!(extract_html_links(html, "https://example.com").is_empty());
    }

    #[test]
    fn test_invalid_page_url() {
        let html = r#"<a href="/docs">Docs</a>"#;
        assert!(extract_html_links(html, "not a url").is_empty());
    }

    #[test]
    fn test_multiple_links() {
        let html = r#"
            <a href="https://rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
        "#;
        let links = extract_html_links(html, "https://example.com/page/");
        assert_eq!(links.len(), 3);
    }
}
