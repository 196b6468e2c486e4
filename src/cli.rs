// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - analyze: full analysis of one page
// - check: only check a list of addresses for broken links
//
// Every tuning flag is optional. Unset flags keep the value from the
// environment (PAGE_ANALYZER_*) or the built-in default.
// =============================================================================

use clap::{Args, Parser, Subcommand};

use page_analyzer::AnalyzerConfig;

#[derive(Parser, Debug)]
#[command(
    name = "page-analyzer",
    version,
    about = "Analyze a web page's structure and check its links",
    long_about = "page-analyzer fetches a page, reports its HTML version, title, headings and \
                  login form, counts internal and external links, and checks every link."
)]
pub struct Cli {
    /// Log what is happening to stderr (same as RUST_LOG=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one page
    ///
    /// Example: page-analyzer analyze https://example.com
    Analyze {
        /// Address of the page (e.g., https://example.com/login)
        page_url: String,

        /// Output the analysis as JSON instead of a report
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Check a list of addresses without analyzing a page
    ///
    /// Example: page-analyzer check https://example.com/a https://example.com/b
    Check {
        /// Absolute addresses to check
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output the broken links as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tuning: Tuning,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct Tuning {
    /// Maximum number of link checks running at once
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=200))]
    pub concurrency: Option<u32>,

    /// Seconds to wait for each link check
    #[arg(long)]
    pub probe_timeout: Option<u64>,

    /// Seconds to wait for the page itself
    #[arg(long)]
    pub page_timeout: Option<u64>,

    /// Overall time budget in seconds; unchecked links count as broken
    #[arg(long)]
    pub deadline: Option<u64>,
}

impl Tuning {
    /// Flags win over whatever the environment configured.
    pub fn apply(&self, mut config: AnalyzerConfig) -> AnalyzerConfig {
        if let Some(n) = self.concurrency {
            config.concurrency = n as usize;
        }
        if let Some(secs) = self.probe_timeout {
            config.probe_timeout_ms = secs.saturating_mul(1_000);
        }
        if let Some(secs) = self.page_timeout {
            config.page_timeout_ms = secs.saturating_mul(1_000);
        }
        if let Some(secs) = self.deadline {
            config.deadline_ms = Some(secs.saturating_mul(1_000));
        }
        config
    }
}
