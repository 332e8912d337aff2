// src/plugins/private_github.rs
// =============================================================================
// Checks links to private GitHub pages.
//
// A plain fetch of a private repository page returns 404 to anonymous
// clients. Instead of embedding credentials in the fetch, this plugin
// rewrites matching URLs into a GitHub Contents API request and probes it
// with a revocable token taken from the GITHUB_TOKEN environment variable.
//
// Configuration (section named after the plugin):
//
//   [PrivateGithub]
//   prefixes = """
//   github.com/my-org
//   github.com/other-org/private-repo
//   """
//   ratelimitskip = true   # a 429 from the API leaves the result alone
//
// Status policy:
//   200, 302, 304            -> valid
//   429 with ratelimitskip   -> untouched
//   anything else            -> invalid, "Private GitHub page is not accessible"
// Any failure while checking is logged and the fetch verdict stands.
// =============================================================================

use super::{CheckPlugin, PluginConfig, LOG_TARGET};
use crate::config::{parse_flag, ConfigSource};
use crate::github::{ContentsRequest, ReqwestProbe, StatusProbe};
use crate::result::UrlResult;
use anyhow::Result;
use async_trait::async_trait;
use url::Url;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const SECTION: &str = "PrivateGithub";
const ACCESSIBLE_STATUS: [u16; 3] = [200, 302, 304];
const RATE_LIMITED: u16 = 429;
const NOT_ACCESSIBLE: &str = "Private GitHub page is not accessible";
const ACCESSIBLE: &str = "Private GitHub page is accessible";

pub struct PrivateGithub {
    prefixes: Vec<String>,
    token: String,
    available: bool,
    rate_limit_skip: bool,
    probe: Box<dyn StatusProbe>,
}

impl PrivateGithub {
    /// Builds the plugin with the token from the environment and the real
    /// network probe.
    pub fn new(config: &PluginConfig) -> Self {
        let token = std::env::var(TOKEN_ENV).unwrap_or_default();
        Self::with_probe(config, token, Box::new(ReqwestProbe))
    }

    pub fn with_probe(config: &PluginConfig, token: String, probe: Box<dyn StatusProbe>) -> Self {
        let prefixes = split_prefixes(config.text("prefixes"));
        let available = !prefixes.is_empty() && !token.is_empty();
        if token.is_empty() {
            tracing::error!(
                target: LOG_TARGET,
                "no {} provided for private GitHub pages, plugin disabled",
                TOKEN_ENV
            );
        }
        Self {
            prefixes,
            token,
            available,
            rate_limit_skip: config.flag("ratelimitskip"),
            probe,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    async fn try_check(&self, result: &mut UrlResult) -> Result<()> {
        let (_, path) = url_components(&result.base_url)?;
        let Some(request) = ContentsRequest::from_path(&path)? else {
            return Ok(());
        };

        let api_url = request.api_url();
        tracing::debug!(target: LOG_TARGET, %api_url, "private GitHub API url");

        let status = self
            .probe
            .status(result.session.as_ref(), &api_url, &self.token)
            .await?;
        tracing::debug!(target: LOG_TARGET, status, "private GitHub API result");

        if self.rate_limit_skip && status == RATE_LIMITED {
            tracing::info!(
                target: LOG_TARGET,
                url = %result.base_url,
                "GitHub API request rate limited, skipping as configured"
            );
            return Ok(());
        }
        if !ACCESSIBLE_STATUS.contains(&status) {
            result.set_result(NOT_ACCESSIBLE, false, true);
            return Ok(());
        }
        result.set_result(ACCESSIBLE, true, true);
        Ok(())
    }
}

#[async_trait]
impl CheckPlugin for PrivateGithub {
    fn name(&self) -> &'static str {
        SECTION
    }

    fn applies_to(&self, result: &UrlResult) -> bool {
        if !self.is_available() || !result.is_http() {
            return false;
        }
        match url_components(&result.base_url) {
            Ok((host_path, _)) => self
                .prefixes
                .iter()
                .any(|prefix| host_path.starts_with(prefix.as_str())),
            Err(_) => false,
        }
    }

    async fn check(&self, result: &mut UrlResult) {
        tracing::debug!(target: LOG_TARGET, url = %result.base_url, "checking as private GitHub page");
        if let Err(err) = self.try_check(result).await {
            tracing::info!(
                target: LOG_TARGET,
                url = %result.base_url,
                "private GitHub page check failed: {:#}",
                err
            );
        }
    }

    fn read_config(source: &dyn ConfigSource) -> PluginConfig {
        let mut config = PluginConfig::default();
        let prefixes = if source.has_option(SECTION, "prefixes") {
            source.get(SECTION, "prefixes").unwrap_or_default()
        } else {
            String::new()
        };
        config.set_text("prefixes", prefixes);

        let rate_limit_skip = source.has_option(SECTION, "ratelimitskip")
            && source
                .get(SECTION, "ratelimitskip")
                .map(|value| parse_flag(&value))
                .unwrap_or(false);
        config.set_flag("ratelimitskip", rate_limit_skip);
        config
    }
}

/// Splits the prefix option on any whitespace, dropping empty entries and
/// repeats while keeping the configured order.
fn split_prefixes(raw: &str) -> Vec<String> {
    let mut prefixes: Vec<String> = Vec::new();
    for prefix in raw.split_whitespace() {
        if !prefixes.iter().any(|known| known == prefix) {
            prefixes.push(prefix.to_string());
        }
    }
    prefixes
}

/// Returns `(host[:port] + path, path)` for a URL.
fn url_components(base_url: &str) -> Result<(String, String)> {
    let url = Url::parse(base_url)?;
    let mut host_path = url.host_str().unwrap_or_default().to_string();
    if let Some(port) = url.port() {
        host_path.push_str(&format!(":{}", port));
    }
    let path = url.path().to_string();
    host_path.push_str(&path);
    Ok((host_path, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::github::ProbeError;
    use reqwest::Client;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(String, String)>>>;

    /// Records every probe call and answers with a fixed status.
    struct FakeProbe {
        status: Option<u16>,
        calls: Calls,
    }

    #[async_trait]
    impl StatusProbe for FakeProbe {
        async fn status(
            &self,
            _session: Option<&Client>,
            api_url: &str,
            token: &str,
        ) -> Result<u16, ProbeError> {
            self.calls
                .lock()
                .unwrap()
                .push((api_url.to_string(), token.to_string()));
            self.status
                .ok_or_else(|| ProbeError::NoSession(api_url.to_string()))
        }
    }

    fn plugin(toml: &str, token: &str, status: Option<u16>) -> (PrivateGithub, Calls) {
        let config = Config::from_toml_str(toml).unwrap();
        let calls: Calls = Arc::default();
        let probe = FakeProbe {
            status,
            calls: Arc::clone(&calls),
        };
        let plugin = PrivateGithub::with_probe(
            &PrivateGithub::read_config(&config),
            token.to_string(),
            Box::new(probe),
        );
        (plugin, calls)
    }

    const TEST_PREFIX: &str = "[PrivateGithub]\nprefixes = \"github.com/test\"\n";
    const TWO_PREFIXES: &str = "[PrivateGithub]\nprefixes = \"github.com/test github.com/other\"\n";

    /// Mirrors the pipeline: plugin only runs when it applies.
    async fn run(plugin: &PrivateGithub, result: &mut UrlResult) {
        if plugin.applies_to(result) {
            plugin.check(result).await;
        }
    }

    /// A result the fetch stage rejected, like a private page seen anonymously.
    fn fetched_404(url: &str) -> UrlResult {
        let mut result = UrlResult::new(url);
        result.set_result("404 Not Found", false, false);
        result
    }

    fn last_call(calls: &Calls) -> (String, String) {
        calls.lock().unwrap().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_repository_root_is_valid() {
        let (plugin, calls) = plugin(TEST_PREFIX, "TOKEN", Some(200));
        let mut result = fetched_404("https://github.com/test/org");
        run(&plugin, &mut result).await;
        assert!(result.valid);
        assert!(!result.result_text.is_empty());
        assert_eq!(
            last_call(&calls),
            (
                "https://api.github.com/repos/test/org/contents/".to_string(),
                "TOKEN".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_no_token_never_probes() {
        let (plugin, calls) = plugin(TEST_PREFIX, "", Some(200));
        let mut result = fetched_404("https://github.com/test/org");
        assert!(!plugin.is_available());
        assert!(!plugin.applies_to(&result));
        run(&plugin, &mut result).await;
        assert!(!result.valid);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_prefixes_never_applies() {
        let (plugin, _) = plugin("", "TOKEN", Some(200));
        assert!(!plugin.applies_to(&UrlResult::new("https://github.com/test/org")));
    }

    #[tokio::test]
    async fn test_url_too_short_is_a_silent_no_op() {
        let (plugin, calls) = plugin(
            "[PrivateGithub]\nprefixes = \"github.com/not-existing-entity\"\n",
            "TOKEN",
            Some(200),
        );
        let mut result = fetched_404("https://github.com/not-existing-entity");
        assert!(plugin.applies_to(&result));
        run(&plugin, &mut result).await;
        assert!(!result.valid);
        assert_eq!(result.result_text, "404 Not Found");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_multiple_prefixes() {
        let (plugin, calls) = plugin(TWO_PREFIXES, "TOKEN", Some(200));
        let mut result = fetched_404("https://github.com/other/some-repo");
        run(&plugin, &mut result).await;
        assert!(result.valid);
        assert_eq!(
            last_call(&calls).0,
            "https://api.github.com/repos/other/some-repo/contents/"
        );
    }

    #[tokio::test]
    async fn test_rate_limit_without_skip_is_invalid() {
        let (plugin, _) = plugin(TWO_PREFIXES, "TOKEN", Some(429));
        let mut result = UrlResult::new("https://github.com/test/some-repo");
        run(&plugin, &mut result).await;
        assert!(!result.valid);
        assert_eq!(result.result_text, NOT_ACCESSIBLE);
    }

    #[tokio::test]
    async fn test_rate_limit_with_skip_leaves_result_untouched() {
        let toml = format!("{}ratelimitskip = \"notempty\"\n", TWO_PREFIXES);
        let (plugin, calls) = plugin(&toml, "TOKEN", Some(429));
        let mut result = fetched_404("https://github.com/test/some-repo");
        run(&plugin, &mut result).await;
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(!result.valid);
        assert_eq!(result.result_text, "404 Not Found");
    }

    #[tokio::test]
    async fn test_prefix_not_matching() {
        let (plugin, calls) = plugin(TEST_PREFIX, "TOKEN", Some(200));
        let mut result = fetched_404("https://github.com/some-other-entity");
        run(&plugin, &mut result).await;
        assert!(!result.valid);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_http_scheme_never_applies() {
        let (plugin, _) = plugin("[PrivateGithub]\nprefixes = \"github.com\"\n", "TOKEN", Some(200));
        assert!(!plugin.applies_to(&UrlResult::new("ftp://github.com/test/org")));
        assert!(!plugin.applies_to(&UrlResult::new("not a url")));
    }

    #[tokio::test]
    async fn test_deep_link_without_ref() {
        let (plugin, calls) = plugin(TEST_PREFIX, "TOKEN", Some(200));
        let mut result = fetched_404("https://github.com/test/some/more/path");
        run(&plugin, &mut result).await;
        assert!(result.valid);
        assert_eq!(
            last_call(&calls).0,
            "https://api.github.com/repos/test/some/contents/more/path"
        );
    }

    #[tokio::test]
    async fn test_blob_ref_not_found() {
        let (plugin, calls) = plugin(TEST_PREFIX, "TOKEN", Some(404));
        let mut result = UrlResult::new("https://github.com/test/some/blob/branch/more/path");
        result.set_result("200 OK", true, false);
        run(&plugin, &mut result).await;
        assert!(!result.valid);
        assert_eq!(result.result_text, "Private GitHub page is not accessible");
        assert_eq!(
            last_call(&calls).0,
            "https://api.github.com/repos/test/some/contents/more/path?ref=branch"
        );
    }

    #[tokio::test]
    async fn test_redirect_and_not_modified_are_valid() {
        for status in [302, 304] {
            let (plugin, _) = plugin(TEST_PREFIX, "TOKEN", Some(status));
            let mut result = fetched_404("https://github.com/test/some/blob/branch/more/path");
            run(&plugin, &mut result).await;
            assert!(result.valid, "status {} should be valid", status);
        }
    }

    #[tokio::test]
    async fn test_probe_failure_keeps_prior_verdict() {
        let (plugin, calls) = plugin(TEST_PREFIX, "TOKEN", None);
        let mut result = fetched_404("https://github.com/test/org");
        run(&plugin, &mut result).await;
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(!result.valid);
        assert_eq!(result.result_text, "404 Not Found");
    }

    #[tokio::test]
    async fn test_blob_without_ref_keeps_prior_verdict() {
        let (plugin, calls) = plugin(TEST_PREFIX, "TOKEN", Some(200));
        let mut result = fetched_404("https://github.com/test/some/blob");
        run(&plugin, &mut result).await;
        assert!(!result.valid);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_read_config_missing_section() {
        let config = PrivateGithub::read_config(&Config::default());
        assert_eq!(config.text("prefixes"), "");
        assert!(!config.flag("ratelimitskip"));
    }

    #[test]
    fn test_split_prefixes() {
        assert_eq!(
            split_prefixes("github.com/a\n  github.com/b\tgithub.com/a\n\n"),
            vec!["github.com/a", "github.com/b"]
        );
        assert!(split_prefixes("  \n ").is_empty());
    }

    #[test]
    fn test_url_components_keep_port() {
        let (host_path, path) = url_components("https://git.example.com:8443/org/repo").unwrap();
        assert_eq!(host_path, "git.example.com:8443/org/repo");
        assert_eq!(path, "/org/repo");
    }
}
