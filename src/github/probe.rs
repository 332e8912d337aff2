// src/github/probe.rs
// =============================================================================
// The single network call the PrivateGithub plugin makes.
//
// Only the numeric HTTP status code matters, so the seam is deliberately
// tiny: "GET this API URL with this token, tell me the status". Production
// code uses ReqwestProbe on the fetch stage's shared client; tests plug in a
// fake that records calls and returns canned codes.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use thiserror::Error;

/// GitHub REST API version the request headers pin.
pub const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no network session available for {0}")]
    NoSession(String),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Answers "what status does GitHub return for this Contents API URL?".
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn status(
        &self,
        session: Option<&Client>,
        api_url: &str,
        token: &str,
    ) -> Result<u16, ProbeError>;
}

/// Real probe: an authenticated GET on the borrowed session.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestProbe;

#[async_trait]
impl StatusProbe for ReqwestProbe {
    async fn status(
        &self,
        session: Option<&Client>,
        api_url: &str,
        token: &str,
    ) -> Result<u16, ProbeError> {
        let client = session.ok_or_else(|| ProbeError::NoSession(api_url.to_string()))?;

        // https://docs.github.com/en/rest/repos/contents#get-repository-content
        let response = client
            .get(api_url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(AUTHORIZATION, format!("bearer {}", token))
            .send()
            .await
            .map_err(|source| ProbeError::Request {
                url: api_url.to_string(),
                source,
            })?;

        Ok(response.status().as_u16())
    }
}
