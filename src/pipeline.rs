// src/pipeline.rs
// =============================================================================
// Runs finished results through the two stages after fetching:
//
//   fetch ──> plugin chain ──> every logger
//
// Results are delivered one by one in encounter order, so loggers that group
// output (by parent URL) or accumulate statistics see a stable sequence.
// A logger that panics is dropped from the run; the others keep going.
// =============================================================================

use crate::logger::Logger;
use crate::plugins::PluginChain;
use crate::result::UrlResult;
use std::panic::{self, AssertUnwindSafe};

/// What a run found, used for the exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub checked: usize,
    pub invalid: usize,
}

impl Report {
    pub fn all_valid(&self) -> bool {
        self.invalid == 0
    }
}

pub struct Pipeline {
    plugins: PluginChain,
    loggers: Vec<Box<dyn Logger>>,
}

impl Pipeline {
    pub fn new(plugins: PluginChain, loggers: Vec<Box<dyn Logger>>) -> Self {
        Self { plugins, loggers }
    }

    pub async fn run(mut self, results: Vec<UrlResult>) -> Report {
        let mut report = Report::default();

        self.each_logger("start_output", |logger| logger.start_output());

        for mut result in results {
            self.plugins.run(&mut result).await;
            report.checked += 1;
            if !result.valid {
                report.invalid += 1;
            }
            self.each_logger("log_url", |logger| logger.log_url(&result));
        }

        self.each_logger("end_output", |logger| logger.end_output());

        tracing::debug!(checked = report.checked, invalid = report.invalid, "run finished");
        report
    }

    // Calls `f` on every logger, dropping any that panics.
    fn each_logger<F>(&mut self, step: &str, mut f: F)
    where
        F: FnMut(&mut dyn Logger),
    {
        self.loggers.retain_mut(|logger| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(logger.as_mut())));
            if outcome.is_err() {
                tracing::error!("logger panicked in {}, disabling it", step);
            }
            outcome.is_ok()
        });
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does run() take `mut self`?
//    - The pipeline is used once; consuming it drops every logger at the
//      end, which closes any file they still hold
//
// 2. What does retain_mut do?
//    - Visits every element mutably and keeps only those the closure
//      returns true for
//    - Here it calls the logger and drops the ones that panicked
//
// 3. Why a generic F: FnMut(&mut dyn Logger)?
//    - The same loop serves start_output, log_url and end_output
//    - FnMut because the closure may be called once per logger
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, OutputConfig, SqlConfig};
    use crate::logger::testing::buffer_target;
    use crate::logger::SqlRenderer;
    use crate::plugins::{CheckPlugin, PluginConfig};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    // Marks every result under a prefix invalid
    struct Blocklist(&'static str);

    #[async_trait]
    impl CheckPlugin for Blocklist {
        fn name(&self) -> &'static str {
            "Blocklist"
        }

        fn applies_to(&self, result: &UrlResult) -> bool {
            result.base_url.starts_with(self.0)
        }

        async fn check(&self, result: &mut UrlResult) {
            result.set_result("blocked", false, true);
        }

        fn read_config(_source: &dyn ConfigSource) -> PluginConfig {
            PluginConfig::default()
        }
    }

    // Records calls, optionally panicking on log_url
    struct Recording {
        calls: Arc<Mutex<Vec<String>>>,
        panic_on_log: bool,
    }

    impl Logger for Recording {
        fn start_output(&mut self) {
            self.calls.lock().unwrap().push("start".to_string());
        }

        fn log_url(&mut self, result: &UrlResult) {
            if self.panic_on_log {
                panic!("renderer bug");
            }
            self.calls.lock().unwrap().push(result.base_url.clone());
        }

        fn end_output(&mut self) {
            self.calls.lock().unwrap().push("end".to_string());
        }
    }

    fn results() -> Vec<UrlResult> {
        vec![
            UrlResult::new("https://example.com/a"),
            UrlResult::new("https://blocked.example.com/b"),
            UrlResult::new("https://example.com/c"),
        ]
    }

    #[tokio::test]
    async fn test_plugins_run_before_loggers() {
        let (buffer, target) = buffer_target();
        let sql = SqlRenderer::new(&OutputConfig::default(), &SqlConfig::default(), target);
        let chain = PluginChain::new(vec![Box::new(Blocklist("https://blocked."))]);

        let report = Pipeline::new(chain, vec![Box::new(sql)]).run(results()).await;

        assert_eq!(report, Report { checked: 3, invalid: 1 });
        assert!(!report.all_valid());
        let output = buffer.contents();
        assert_eq!(output.matches("insert into linksdb").count(), 3);
        assert!(output.contains("'blocked'"));
        assert!(output.starts_with("-- created by linkcheck"));
    }

    #[tokio::test]
    async fn test_results_arrive_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let logger = Recording {
            calls: calls.clone(),
            panic_on_log: false,
        };

        Pipeline::new(PluginChain::default(), vec![Box::new(logger)])
            .run(results())
            .await;

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "start",
                "https://example.com/a",
                "https://blocked.example.com/b",
                "https://example.com/c",
                "end",
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_logger_does_not_affect_others() {
        let broken_calls = Arc::new(Mutex::new(Vec::new()));
        let healthy_calls = Arc::new(Mutex::new(Vec::new()));
        let loggers: Vec<Box<dyn Logger>> = vec![
            Box::new(Recording {
                calls: broken_calls.clone(),
                panic_on_log: true,
            }),
            Box::new(Recording {
                calls: healthy_calls.clone(),
                panic_on_log: false,
            }),
        ];

        let report = Pipeline::new(PluginChain::default(), loggers)
            .run(results())
            .await;

        assert_eq!(report.checked, 3);
        assert_eq!(*broken_calls.lock().unwrap(), vec!["start"]);
        assert_eq!(healthy_calls.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_empty_run() {
        let report = Pipeline::new(PluginChain::default(), Vec::new())
            .run(Vec::new())
            .await;
        assert!(report.all_valid());
        assert_eq!(report.checked, 0);
    }
}
