// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every subcommand produces a list of results which then go through the same
// two stages: the plugin chain, then every selected output logger.
// =============================================================================

use crate::logger::LoggerKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "linkcheck",
    version,
    about = "Check links and report the results as colored text, SQL or HTML",
    long_about = "linkcheck fetches links (given directly, or found in a Markdown or HTML file), \
                  runs the enabled check plugins over every result and writes a report with \
                  each selected output logger."
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format; repeat to write several reports in one run
    ///
    /// With several formats, sql and html go to linkcheck-out.sql and
    /// linkcheck-out.html unless a filename is configured.
    ///
    /// Example: -o colored -o sql
    #[arg(short, long = "output", value_enum, global = true, default_values_t = [LoggerKind::Colored])]
    pub outputs: Vec<LoggerKind>,

    /// Show debug diagnostics on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the given URLs
    ///
    /// Example: linkcheck check https://www.rust-lang.org https://crates.io
    Check {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Check the http/https links of a Markdown file
    ///
    /// Example: linkcheck markdown README.md
    Markdown {
        file: PathBuf,
    },

    /// Check the links of an HTML file
    ///
    /// Example: linkcheck html index.html --base https://example.com/
    Html {
        file: PathBuf,

        /// URL the page was served from; relative links resolve against it
        #[arg(long)]
        base: String,
    },

    /// Run plugins and loggers over results saved as a JSON array
    ///
    /// Nothing is fetched except what the plugins probe themselves.
    Replay {
        file: PathBuf,
    },
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does `global = true` do?
//    - The option may be given before or after the subcommand name
//    - `linkcheck -o sql check URL` and `linkcheck check URL -o sql` both work
//
// 2. Why Vec<LoggerKind> for --output?
//    - clap collects every occurrence of a repeated flag into the Vec
//    - `value_enum` turns the enum variants into the accepted values
//      (colored, sql, html) and rejects anything else with a helpful error
// -----------------------------------------------------------------------------
