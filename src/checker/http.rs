// src/checker/http.rs
// =============================================================================
// The minimal fetch stage: turns extracted links into UrlResults.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when the server refuses HEAD (405)
// - Detects various failure modes (404, timeout, SSL errors, etc.)
// - Runs checks concurrently but hands results back in link order, because
//   loggers group output by the order links were found in
// - Each distinct URL is fetched once; repeats are marked as cached
// =============================================================================

use super::Link;
use crate::result::UrlResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use url::Url;

/// How many URLs are fetched at the same time
const CONCURRENCY: usize = 16;

/// Builds the shared session every result carries.
///
/// GitHub's API rejects requests without a User-Agent, so one is always set.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent(concat!("linkcheck/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to create HTTP client")
}

/// Checks all links and returns one result per link, in the same order.
pub async fn check_links(client: &Client, links: Vec<Link>) -> Vec<UrlResult> {
    let mut seen = HashSet::new();
    let unique: Vec<String> = links
        .iter()
        .filter(|link| seen.insert(link.url.clone()))
        .map(|link| link.url.clone())
        .collect();

    let fetched: HashMap<String, UrlResult> = stream::iter(unique)
        .map(|url| {
            let client = client.clone();
            async move {
                let result = fetch_url(&client, &url).await;
                (url, result)
            }
        })
        .buffered(CONCURRENCY)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect();

    let mut logged = HashSet::new();
    links
        .into_iter()
        .map(|link| {
            let mut result = fetched
                .get(&link.url)
                .cloned()
                .unwrap_or_else(|| UrlResult::new(link.url.clone()));
            result.cached = !logged.insert(link.url.clone());
            result.name = link.name;
            result.parent_url = link.parent_url;
            result.base_ref = link.base_ref;
            result.line = link.line;
            result.column = link.column;
            result
        })
        .collect()
}

/// Fetches one URL.
pub async fn fetch_url(client: &Client, url: &str) -> UrlResult {
    let mut result = UrlResult::new(url);
    result.session = Some(client.clone());

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(err) => {
            result.set_result(format!("Invalid URL: {}", err), false, false);
            return result;
        }
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        result.set_result("Unsupported URL scheme", false, false);
        return result;
    }

    let started = Instant::now();
    match client.head(url).send().await {
        Ok(response) if response.status() == StatusCode::METHOD_NOT_ALLOWED => {
            tracing::debug!(%url, "HEAD not allowed, retrying with GET");
            fetch_with_get(client, &mut result).await;
        }
        Ok(response) => {
            let final_url = response.url().to_string();
            apply_response(&mut result, response.status(), &final_url, response.headers());
            if let Some(length) = response.content_length() {
                result.size = Some(length);
            }
        }
        Err(err) => categorize_error(&mut result, &err),
    }
    result.checktime = Some(started.elapsed().as_secs_f64());
    result
}

async fn fetch_with_get(client: &Client, result: &mut UrlResult) {
    let started = Instant::now();
    let response = match client.get(&result.base_url).send().await {
        Ok(response) => response,
        Err(err) => {
            categorize_error(result, &err);
            return;
        }
    };
    let status = response.status();
    let final_url = response.url().to_string();
    let headers = response.headers().clone();
    apply_response(result, status, &final_url, &headers);
    match response.bytes().await {
        Ok(body) => {
            result.size = Some(body.len() as u64);
            result.dltime = Some(started.elapsed().as_secs_f64());
        }
        Err(err) => result.add_info(format!("Could not read body: {}", err)),
    }
}

// Fills in the verdict and metadata from a response.
//
// HTTP status codes:
// - 200-299: Success
// - 300-399: Not followed (304 Not Modified and the like), still valid
// - 400-599: Error
fn apply_response(result: &mut UrlResult, status: StatusCode, final_url: &str, headers: &HeaderMap) {
    result.real_url = final_url.to_string();
    if redirected(&result.base_url, final_url) {
        result.add_warning("http-redirected", format!("Redirected to `{}'.", final_url));
    }

    if let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        result.content_type = content_type.to_string();
    }
    if let Some(modified) = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
    {
        result.modified = Some(modified.with_timezone(&Utc));
    }

    let valid = status.is_success() || status.is_redirection();
    result.set_result(status.to_string(), valid, false);
}

fn redirected(base_url: &str, final_url: &str) -> bool {
    match Url::parse(base_url) {
        Ok(base) => base.as_str() != final_url,
        Err(_) => false,
    }
}

// Categorizes different error types from reqwest
fn categorize_error(result: &mut UrlResult, error: &reqwest::Error) {
    let error_string = error.to_string();

    let message = if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") {
            "Could not resolve hostname".to_string()
        } else {
            "Connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    };

    tracing::debug!(url = %result.base_url, "fetch failed: {}", error);
    result.set_result(message, false, false);
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. buffered vs buffer_unordered?
//    - Both run up to N futures at once
//    - buffered() hands results back in the order the futures were created
//    - We need that order, because loggers group output by parent URL
//
// 2. Why a HashSet and a HashMap?
//    - The HashSet keeps the first occurrence of each URL, so every URL is
//      fetched once
//    - The HashMap then lets every link (repeats included) look its result
//      up by URL
//
// 3. Why HEAD first?
//    - HEAD asks for the headers only, no body to download
//    - Some servers answer 405 Method Not Allowed, then we fall back to GET
//
// 4. What is Instant?
//    - A monotonic clock reading, good for measuring elapsed time
//    - elapsed().as_secs_f64() gives the duration as fractional seconds
//
// 5. Why is Client cloned into every result?
//    - reqwest::Client is a handle around a shared connection pool
//    - Cloning it is cheap, and plugins reuse it for their own requests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn link(url: &str, parent: &str) -> Link {
        Link {
            url: url.to_string(),
            parent_url: parent.to_string(),
            ..Link::default()
        }
    }

    #[test]
    fn test_apply_ok_response() {
        let mut result = UrlResult::new("https://example.com/");
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.insert(
            LAST_MODIFIED,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        apply_response(&mut result, StatusCode::OK, "https://example.com/", &headers);
        assert!(result.valid);
        assert_eq!(result.result_text, "200 OK");
        assert_eq!(result.content_type, "text/html");
        assert!(result.modified.is_some());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_apply_redirected_not_found() {
        let mut result = UrlResult::new("http://example.com/old");
        apply_response(
            &mut result,
            StatusCode::NOT_FOUND,
            "https://example.com/new",
            &HeaderMap::new(),
        );
        assert!(!result.valid);
        assert_eq!(result.result_text, "404 Not Found");
        assert_eq!(result.real_url, "https://example.com/new");
        assert_eq!(result.warnings[0].code, "http-redirected");
    }

    #[test]
    fn test_normalized_url_is_not_a_redirect() {
        assert!(!redirected("https://example.com", "https://example.com/"));
        assert!(redirected("https://example.com/a", "https://example.com/b"));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_invalid_without_network() {
        let client = build_client().unwrap();
        let result = fetch_url(&client, "ftp://example.com/file.txt").await;
        assert!(!result.valid);
        assert_eq!(result.result_text, "Unsupported URL scheme");
        assert!(result.session.is_some());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = build_client().unwrap();
        let result = fetch_url(&client, "not a url").await;
        assert!(!result.valid);
        assert!(result.result_text.starts_with("Invalid URL"));
    }

    #[tokio::test]
    async fn test_repeated_links_are_cached_and_keep_order() {
        let client = build_client().unwrap();
        let results = check_links(
            &client,
            vec![
                link("ftp://example.com/a", "page1"),
                link("mailto:someone@example.com", "page1"),
                link("ftp://example.com/a", "page2"),
            ],
        )
        .await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].base_url, "ftp://example.com/a");
        assert!(!results[0].cached);
        assert_eq!(results[1].base_url, "mailto:someone@example.com");
        assert!(results[2].cached);
        assert_eq!(results[2].parent_url, "page2");
        assert_eq!(results[2].result_text, results[0].result_text);
    }
}
