//! Jobs-Harvest main entry point
//!
//! This is the command-line interface for the Jobs-Harvest listing crawler.

use anyhow::Context;
use clap::Parser;
use jobs_harvest::config::{load_config_with_hash, load_default_config, validate, Config};
use jobs_harvest::crawler::{crawl, CrawlMode};
use jobs_harvest::output::{print_report, print_store_statistics};
use jobs_harvest::storage::open_store;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Jobs-Harvest: an incremental job-listing crawler
///
/// Jobs-Harvest pages through a job board's listing table, skips every
/// vacancy already in the database and stores the new ones.
#[derive(Parser, Debug)]
#[command(name = "jobs-harvest")]
#[command(version)]
#[command(about = "An incremental job-listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults plus JOBS_* variables if omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the pagination mode from the config file
    #[arg(long, value_enum)]
    mode: Option<CrawlMode>,

    /// Override the page bound (concurrent) or page limit (sequential)
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Validate config and print the effective settings without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            load_default_config().context("Invalid default configuration")?
        }
    };

    apply_cli_overrides(&mut config, &cli);
    validate(&config).context("Invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config).await?;
    } else {
        handle_crawl(&config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
            0 => EnvFilter::new("jobs_harvest=info,warn"),
            1 => EnvFilter::new("jobs_harvest=debug,info"),
            2 => EnvFilter::new("jobs_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(mode) = cli.mode {
        config.crawler.mode = mode;
    }

    if let Some(pages) = cli.pages {
        match config.crawler.mode {
            CrawlMode::Concurrent => config.crawler.page_bound = pages,
            CrawlMode::Sequential => config.crawler.max_pages = Some(pages),
        }
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Jobs-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing table id: {}", config.site.table_id);
    println!(
        "  Columns: title={} company={} published={} deadline={}",
        config.site.columns.title,
        config.site.columns.company,
        config.site.columns.published,
        config.site.columns.deadline
    );

    println!("\nCrawler:");
    println!("  Mode: {}", config.crawler.mode);
    match config.crawler.mode {
        CrawlMode::Sequential => {
            println!("  Page delay: {}ms", config.crawler.page_delay_ms);
            match config.crawler.max_pages {
                Some(max) => println!("  Page limit: {}", max),
                None => println!("  Page limit: none"),
            }
        }
        CrawlMode::Concurrent => {
            println!("  Pages: 1..={}", config.crawler.page_bound);
            println!(
                "  Max concurrent pages: {}",
                config.crawler.max_concurrent_pages
            );
        }
    }

    println!("\nFetcher:");
    println!("  Backend: {:?}", config.fetcher.backend);
    println!(
        "  Navigation timeout: {}s",
        config.fetcher.navigation_timeout_secs
    );
    println!("  User agent: {}", config.fetcher.user_agent);

    println!("\nDatabase:");
    println!("  Backend: {:?}", config.database.backend);
    println!("  Location: {}", config.database.location());

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
async fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.database.location());

    let store = open_store(&config.database)
        .await
        .context("Failed to open the job store")?;

    print_store_statistics(store.as_ref()).await?;
    store.close().await;

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let report = crawl(config).await.context("Crawl could not start")?;

    if !quiet {
        print_report(&report);
    }

    Ok(())
}
