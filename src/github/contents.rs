// src/github/contents.rs
// =============================================================================
// Maps a GitHub web URL path onto the repository Contents API.
//
// Supported path shapes (after the host):
//   /org/repo                      -> /repos/org/repo/contents/
//   /org/repo/a/b                  -> /repos/org/repo/contents/a/b
//   /org/repo/blob/REF/a/b         -> /repos/org/repo/contents/a/b?ref=REF
//
// A path with fewer than two segments cannot name a repository and yields
// no request at all.
// =============================================================================

use anyhow::{anyhow, Result};

const API_BASE: &str = "https://api.github.com/repos";

/// One Contents API lookup derived from a web URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentsRequest {
    pub org: String,
    pub repo: String,
    /// Branch, tag or commit from a `blob/<ref>` path, empty otherwise
    pub git_ref: String,
    /// Path inside the repository, may be empty
    pub path: String,
}

impl ContentsRequest {
    /// Decomposes a URL path such as `/org/repo/blob/main/README.md`.
    ///
    /// Returns `Ok(None)` when the path is too short to contain an org and a
    /// repo, and an error when a `blob` segment is not followed by a ref.
    pub fn from_path(path: &str) -> Result<Option<Self>> {
        let mut chunks: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if chunks.len() < 2 {
            return Ok(None);
        }

        let org = chunks.remove(0).to_string();
        let repo = chunks.remove(0).to_string();
        let mut git_ref = String::new();
        let mut rest = String::new();

        // A trailing slash leaves only empty chunks behind; treat that as
        // the repository root.
        if chunks.iter().any(|chunk| !chunk.is_empty()) {
            if chunks[0] == "blob" {
                chunks.remove(0);
                if chunks.is_empty() {
                    return Err(anyhow!("'blob' without a ref in path {}", path));
                }
                git_ref = chunks.remove(0).to_string();
            }
            rest = chunks.join("/");
        }

        Ok(Some(Self {
            org,
            repo,
            git_ref,
            path: rest,
        }))
    }

    /// The full API URL, with `?ref=` only when a ref was given.
    pub fn api_url(&self) -> String {
        let mut api_url = format!(
            "{}/{}/{}/contents/{}",
            API_BASE, self.org, self.repo, self.path
        );
        if !self.git_ref.is_empty() {
            api_url.push_str("?ref=");
            api_url.push_str(&self.git_ref);
        }
        api_url
    }
}
