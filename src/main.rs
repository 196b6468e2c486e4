// src/main.rs
// =============================================================================
// This is the entry point of the page-analyzer CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr only, so --json output stays clean)
// 3. Build the config (defaults < environment < flags) and an Analyzer
// 4. Run the subcommand and print the result
// 5. Exit with proper code (0 = no broken links, 1 = broken links, 2 = error)
//
// Ctrl-C cancels a running analysis; links not checked yet are reported as
// broken with status 0.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use cli::{Cli, Commands, Tuning};
use page_analyzer::checker::{verify_all, PendingLink, VerifyOptions};
use page_analyzer::{
    Analyzer, AnalyzerConfig, CancellationToken, LinkCheckResult, LinkKind, PageAnalysis,
    ReqwestClient,
};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err = the page could not be analyzed at all
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze { page_url, json, tuning } => handle_analyze(&page_url, json, &tuning).await,
        Commands::Check { urls, json, tuning } => handle_check(&urls, json, &tuning).await,
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("page_analyzer=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(tuning: &Tuning) -> Result<AnalyzerConfig> {
    let config = AnalyzerConfig::from_env().context("invalid PAGE_ANALYZER_* setting")?;
    Ok(tuning.apply(config))
}

// Cancels `token` on Ctrl-C
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, finishing up...");
            token.cancel();
        }
    });
}

async fn handle_analyze(page_url: &str, json: bool, tuning: &Tuning) -> Result<i32> {
    let config = load_config(tuning)?;
    let analyzer = Analyzer::from_config(config).context("could not build HTTP client")?;

    if !json {
        println!("🔍 Analyzing page: {}", page_url);
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let analysis = analyzer
        .analyze_with_cancel(page_url, &cancel)
        .await
        .with_context(|| format!("could not analyze {}", page_url))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis);
    }

    Ok(if analysis.inaccessible_count > 0 { 1 } else { 0 })
}

async fn handle_check(urls: &[String], json: bool, tuning: &Tuning) -> Result<i32> {
    let config = load_config(tuning)?;
    let client = ReqwestClient::new(&config).context("could not build HTTP client")?;

    let links = urls
        .iter()
        .enumerate()
        .map(|(index, raw)| -> Result<PendingLink> {
            let address = Url::parse(raw).with_context(|| format!("invalid URL '{}'", raw))?;
            Ok(PendingLink { index, address })
        })
        .collect::<Result<Vec<_>>>()?;

    if !json {
        println!("🌐 Checking {} link(s)...\n", links.len());
    }

    let options = VerifyOptions {
        concurrency: config.concurrency,
        per_request_timeout: config.probe_timeout(),
    };
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());
    let deadline = config.deadline();
    let stop = async {
        match deadline {
            Some(budget) => {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(budget) => {}
                }
            }
            None => cancel.cancelled().await,
        }
    };

    let mut failures = verify_all(&client, &links, &options, stop).await;
    failures.sort_by_key(|v| v.index);
    let broken: Vec<LinkCheckResult> = failures
        .into_iter()
        .map(|v| LinkCheckResult {
            address: v.address,
            status_code: v.status_code,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&broken)?);
    } else {
        print_broken_table(&broken);
        println!();
        println!("📊 Summary:");
        println!("   ✅ OK: {}", links.len() - broken.len());
        println!("   ❌ Broken: {}", broken.len());
        println!("   📋 Total: {}", links.len());
    }

    Ok(if broken.is_empty() { 0 } else { 1 })
}

fn print_analysis(analysis: &PageAnalysis) {
    println!();
    println!("{:<20} {}", "HTML version", analysis.document_version);
    println!(
        "{:<20} {}",
        "Title",
        if analysis.title.is_empty() { "(none)" } else { analysis.title.as_str() }
    );
    println!(
        "{:<20} {}",
        "Login form",
        if analysis.has_login_form { "yes" } else { "no" }
    );

    let headings: Vec<String> = analysis
        .heading_counts
        .iter()
        .map(|(tag, count)| format!("{}: {}", tag, count))
        .collect();
    println!("{:<20} {}", "Headings", headings.join("  "));
    println!();

    if !analysis.broken_links.is_empty() {
        print_broken_table(&analysis.broken_links);
        println!();
    }

    let internal_broken = analysis
        .links
        .iter()
        .filter(|l| l.inaccessible && l.kind == LinkKind::Internal)
        .count();

    println!("📊 Links:");
    println!("   🏠 Internal: {}", analysis.internal_link_count);
    println!("   🌍 External: {}", analysis.external_link_count);
    println!(
        "   ❌ Inaccessible: {} ({} internal, {} external)",
        analysis.inaccessible_count,
        internal_broken,
        analysis.inaccessible_count - internal_broken
    );
    println!("   📋 Total: {}", analysis.total_links());
}

fn print_broken_table(broken: &[LinkCheckResult]) {
    println!("{:<80} {:<15}", "BROKEN LINK", "STATUS");
    println!("{}", "=".repeat(95));

    for link in broken {
        // Truncate URL if too long for display
        let url_display = if link.address.chars().count() > 77 {
            format!("{}...", link.address.chars().take(77).collect::<String>())
        } else {
            link.address.clone()
        };

        println!("{:<80} {:<15}", url_display, format_status(link.status_code));
    }
}

fn format_status(status_code: u16) -> String {
    match status_code {
        0 => "⏱️  NO RESPONSE".to_string(),
        404 | 410 => format!("❌ {}", status_code),
        code => format!("⚠️  {}", code),
    }
}
