// src/logger/stats.rs
// =============================================================================
// Run statistics, kept separately by every logger instance.
//
// Besides plain counts this tracks which errors and warnings were actually
// printed: an invalid result that was already seen earlier in the run
// (cached) counts as an error but not as a printed one, and warnings that
// are ignored by configuration or belong to a cached result count as
// warnings but not as printed ones.
// =============================================================================

use super::format::plural;
use crate::result::UrlResult;

/// Content type buckets for the HTML statistics block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTypes {
    pub image: usize,
    pub text: usize,
    pub video: usize,
    pub audio: usize,
    pub application: usize,
    pub mail: usize,
    pub other: usize,
}

impl LinkTypes {
    fn count(&mut self, result: &UrlResult) {
        if result.base_url.starts_with("mailto:") {
            self.mail += 1;
            return;
        }
        let major = result
            .content_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match major.as_str() {
            "image" => self.image += 1,
            "text" => self.text += 1,
            "video" => self.video += 1,
            "audio" => self.audio += 1,
            "application" => self.application += 1,
            _ => self.other += 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// URLs logged
    pub number: usize,
    pub errors: usize,
    pub errors_printed: usize,
    pub warnings: usize,
    pub warnings_printed: usize,
    pub link_types: LinkTypes,
    pub min_url_length: usize,
    pub max_url_length: usize,
    total_url_length: usize,
}

impl Stats {
    /// Accounts for one logged result. `printed_warnings` is how many of its
    /// warnings the logger is going to render.
    pub fn log_url(&mut self, result: &UrlResult, printed_warnings: usize) {
        self.number += 1;
        self.link_types.count(result);

        let length = result.base_url.chars().count();
        if self.number == 1 || length < self.min_url_length {
            self.min_url_length = length;
        }
        self.max_url_length = self.max_url_length.max(length);
        self.total_url_length += length;

        self.warnings += result.warnings.len();
        self.warnings_printed += printed_warnings;

        if !result.valid {
            self.errors += 1;
            if !result.cached {
                self.errors_printed += 1;
            }
        }
    }

    pub fn avg_url_length(&self) -> usize {
        if self.number == 0 {
            0
        } else {
            self.total_url_length / self.number
        }
    }

    /// The "That's it." summary shared by the text and HTML footers.
    pub fn summary(&self) -> String {
        let mut text = format!(
            "That's it. {} checked. {} found",
            plural(self.number, "link", "links"),
            plural(self.warnings_printed, "warning", "warnings")
        );
        if self.warnings != self.warnings_printed {
            text.push_str(&format!(
                " ({} ignored or duplicates not printed)",
                self.warnings - self.warnings_printed
            ));
        }
        text.push_str(&format!(
            ". {} found",
            plural(self.errors_printed, "error", "errors")
        ));
        if self.errors != self.errors_printed {
            text.push_str(&format!(
                " ({} duplicates not printed)",
                self.errors - self.errors_printed
            ));
        }
        text.push('.');
        text
    }
}
