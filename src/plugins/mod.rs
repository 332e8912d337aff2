// src/plugins/mod.rs
// =============================================================================
// Check plugins: secondary validators that run after a URL was fetched and
// before any logger sees the result.
//
// How a plugin is wired up:
// 1. At startup its read_config() pulls its own section (named after the
//    plugin type) out of the config file, with defaults for every option
// 2. The registry builds it from that PluginConfig
// 3. For every result, applies_to() decides whether check() runs
//
// Plugins run in the order they are listed in `[checking] enabledplugins`.
// A plugin that fails (or even panics) never stops the rest of the chain.
// =============================================================================

mod private_github;

pub use private_github::PrivateGithub;

use crate::config::ConfigSource;
use crate::result::UrlResult;
use async_trait::async_trait;
use futures::FutureExt;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;

/// tracing target for everything plugins log
pub const LOG_TARGET: &str = "linkcheck::plugin";

/// A single option value read from a plugin section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Text(String),
    Flag(bool),
}

/// Options for one plugin, built once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    options: BTreeMap<String, OptionValue>,
}

impl PluginConfig {
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        self.options
            .insert(key.to_string(), OptionValue::Text(value.into()));
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.options.insert(key.to_string(), OptionValue::Flag(value));
    }

    /// Text option, empty when missing or not text.
    pub fn text(&self, key: &str) -> &str {
        match self.options.get(key) {
            Some(OptionValue::Text(value)) => value,
            _ => "",
        }
    }

    /// Flag option, false when missing or not a flag.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.options.get(key), Some(OptionValue::Flag(true)))
    }
}

/// The contract every check plugin implements.
#[async_trait]
pub trait CheckPlugin: Send + Sync {
    /// Type name, also the name of its config section.
    fn name(&self) -> &'static str;

    /// Cheap, side-effect free test run for every checked URL.
    fn applies_to(&self, result: &UrlResult) -> bool;

    /// Extra validation. May overwrite the verdict; must log and swallow
    /// its own failures.
    async fn check(&self, result: &mut UrlResult);

    /// Reads the plugin's section. A missing section gives the defaults.
    fn read_config(source: &dyn ConfigSource) -> PluginConfig
    where
        Self: Sized;
}

type Constructor = fn(&dyn ConfigSource) -> Box<dyn CheckPlugin>;

fn build_private_github(source: &dyn ConfigSource) -> Box<dyn CheckPlugin> {
    Box::new(PrivateGithub::new(&PrivateGithub::read_config(source)))
}

/// Every plugin this build knows, by configured name.
const REGISTRY: &[(&str, Constructor)] = &[("PrivateGithub", build_private_github)];

pub fn known_plugins() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

/// The enabled plugins, in execution order.
#[derive(Default)]
pub struct PluginChain {
    plugins: Vec<Box<dyn CheckPlugin>>,
}

impl PluginChain {
    pub fn new(plugins: Vec<Box<dyn CheckPlugin>>) -> Self {
        Self { plugins }
    }

    /// Builds the chain from the enabled names. Unknown names are skipped
    /// with a warning, duplicates run once.
    pub fn load(enabled: &[String], source: &dyn ConfigSource) -> Self {
        let mut plugins: Vec<Box<dyn CheckPlugin>> = Vec::new();
        for name in enabled {
            if plugins.iter().any(|plugin| plugin.name() == name.as_str()) {
                continue;
            }
            match REGISTRY.iter().find(|(known, _)| *known == name.as_str()) {
                Some((_, build)) => {
                    tracing::debug!(target: LOG_TARGET, plugin = %name, "enabled");
                    plugins.push(build(source));
                }
                None => {
                    tracing::warn!(target: LOG_TARGET, plugin = %name, "unknown plugin, ignoring");
                }
            }
        }
        Self::new(plugins)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Runs every applicable plugin on the result, in order.
    pub async fn run(&self, result: &mut UrlResult) {
        for plugin in &self.plugins {
            if !plugin.applies_to(result) {
                continue;
            }
            let outcome = AssertUnwindSafe(plugin.check(result)).catch_unwind().await;
            if outcome.is_err() {
                tracing::error!(
                    target: LOG_TARGET,
                    plugin = plugin.name(),
                    url = %result.base_url,
                    "plugin panicked, continuing with the remaining plugins"
                );
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - Traits with async methods used through Box<dyn Trait> need the
//      returned futures boxed; the macro writes that boilerplate for us
//
// 2. Why `where Self: Sized` on read_config?
//    - read_config has no self argument, so it cannot be called through a
//      trait object
//    - The bound keeps CheckPlugin usable as dyn CheckPlugin anyway
//
// 3. What is a fn pointer in the registry?
//    - `fn(&dyn ConfigSource) -> Box<dyn CheckPlugin>` is the type of a
//      plain function, so the registry is a constant table
//
// 4. What do AssertUnwindSafe and catch_unwind do?
//    - catch_unwind() turns a panic inside the future into an Err
//    - AssertUnwindSafe tells the compiler we accept that the result may be
//      half updated after such a panic
// -----------------------------------------------------------------------------
