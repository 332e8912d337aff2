// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap, set up diagnostics
// 2. Load the configuration, build the plugin chain and the loggers
// 3. Produce results (fetch links, or replay saved results)
// 4. Push every result through plugins and loggers
// 5. Exit with proper code (0 = all valid, 1 = invalid links, 2 = error)
// =============================================================================

mod checker;   // src/checker/ - link extraction and fetching
mod cli;       // src/cli.rs - command-line parsing
mod config;    // src/config.rs - TOML configuration
mod github;    // src/github/ - GitHub Contents API access
mod logger;    // src/logger/ - report renderers
mod logging;   // src/logging.rs - tracing setup
mod pipeline;  // src/pipeline.rs - plugin and logger stages
mod plugins;   // src/plugins/ - check plugins
mod result;    // src/result.rs - the per-URL result record

use anyhow::{Context, Result};
use checker::Link;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use pipeline::Pipeline;
use plugins::PluginChain;
use result::UrlResult;
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every result is valid
//   Ok(1) = at least one invalid result
//   Err = internal error (exit code 2)
async fn run(cli: Cli) -> Result<i32> {
    let config = Config::load(cli.config.as_deref())?;

    tracing::debug!(
        known = ?plugins::known_plugins().collect::<Vec<_>>(),
        enabled = ?config.checking.enabledplugins,
        "loading plugins"
    );
    let chain = PluginChain::load(&config.checking.enabledplugins, &config);
    if !chain.is_empty() {
        tracing::info!("plugins: {}", chain.names().join(", "));
    }

    let results = collect_results(cli.command).await?;

    let loggers = logger::create_loggers(&cli.outputs, &config);
    let report = Pipeline::new(chain, loggers).run(results).await;

    Ok(if report.all_valid() { 0 } else { 1 })
}

// Produces the results for a subcommand
async fn collect_results(command: Commands) -> Result<Vec<UrlResult>> {
    let client = checker::build_client()?;

    let links = match command {
        Commands::Check { urls } => urls.into_iter().map(Link::top_level).collect(),
        Commands::Markdown { file } => {
            let content = read_file(&file)?;
            let parent = file.display().to_string();
            checker::extract_markdown_links(&content, &parent)
        }
        Commands::Html { file, base } => {
            let content = read_file(&file)?;
            checker::extract_html_links(&content, &base)
        }
        Commands::Replay { file } => return replay(&file, client),
    };

    tracing::info!("checking {} link(s)", links.len());
    Ok(checker::check_links(&client, links).await)
}

// Loads saved results and attaches the session plugins probe with
fn replay(file: &Path, client: reqwest::Client) -> Result<Vec<UrlResult>> {
    let content = read_file(file)?;
    let mut results: Vec<UrlResult> = serde_json::from_str(&content)
        .with_context(|| format!("invalid results file {}", file.display()))?;
    for result in &mut results {
        result.session = Some(client.clone());
    }
    tracing::info!("replaying {} result(s)", results.len());
    Ok(results)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
