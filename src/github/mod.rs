// src/github/mod.rs
// =============================================================================
// GitHub specific helpers used by the PrivateGithub check plugin.
//
// - contents: turns a github.com web URL into a Contents API request
// - probe: issues the authenticated existence request and reports the
//   HTTP status code (behind a trait so tests can swap it out)
// =============================================================================

mod contents;
mod probe;

pub use contents::ContentsRequest;
pub use probe::{ReqwestProbe, StatusProbe};
#[cfg(test)]
pub use probe::ProbeError;
