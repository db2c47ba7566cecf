//! CLI harness for replaying recorded indexer fixtures
//!
//! This tool allows testing:
//! - Full and incremental history passes against a recorded wallet
//! - Idempotence of repeated passes
//! - The display list and month grouping built from the merged history

mod fixture;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use fixture::{Fixture, FixtureBackend, FixtureClock};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use txhistory_core::{group_by_month_at, to_display_list_at, Transaction};
use txhistory_sync::{HistorySyncer, SyncConfig, SyncOptions, SyncReport, WalletRecord};

#[derive(Parser)]
#[command(name = "history-harness")]
#[command(about = "Wallet transaction history replay harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync a fixture wallet and print the result
    Replay {
        /// Fixture file
        #[arg(short, long)]
        fixture: PathBuf,

        /// Number of passes (later passes are forced)
        #[arg(short, long, default_value = "1")]
        passes: u32,

        /// Force the first pass past a valid cache
        #[arg(long)]
        force: bool,

        /// Stop paging after the page containing this txid
        #[arg(long)]
        limit_tx: Option<String>,

        /// First page size (overrides TXHISTORY_FIRST_PAGE_LIMIT)
        #[arg(long)]
        first_page_limit: Option<usize>,

        /// Later page size (overrides TXHISTORY_PAGE_LIMIT)
        #[arg(long)]
        page_limit: Option<usize>,

        /// Output shape
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Merged history as JSON
    Json,
    /// Display list grouped by month, as JSON
    Grouped,
    /// One line per transaction
    Table,
}

struct ReplayArgs {
    passes: u32,
    force: bool,
    limit_tx: Option<String>,
    first_page_limit: Option<usize>,
    page_limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            fixture,
            passes,
            force,
            limit_tx,
            first_page_limit,
            page_limit,
            output,
        } => {
            let args = ReplayArgs {
                passes,
                force,
                limit_tx,
                first_page_limit,
                page_limit,
            };
            let fixture_data = Fixture::load(&fixture)?;
            let report = run_replay(&fixture_data, &args).await?;
            println!("{}", render(&fixture_data, &report.transactions, output)?);
        }
    }

    Ok(())
}

async fn run_replay(fixture: &Fixture, args: &ReplayArgs) -> anyhow::Result<SyncReport> {
    let mut config = SyncConfig::from_env();
    if let Some(limit) = args.first_page_limit {
        config.first_page_limit = limit.max(1);
    }
    if let Some(limit) = args.page_limit {
        config.page_limit = limit.max(1);
    }

    let backend = Arc::new(FixtureBackend::new(fixture));
    let wallet = WalletRecord::with_state(
        "harness",
        fixture.wallet.clone(),
        backend.clone(),
        fixture.initial_state(),
    );
    let syncer = HistorySyncer::with_clock(config, Arc::new(FixtureClock::new(fixture.now())));

    let mut previous: Option<Vec<Transaction>> = None;
    let mut last = SyncReport::default();

    for pass in 0..args.passes.max(1) {
        let options = SyncOptions {
            force: args.force || pass > 0,
            limit_tx: args.limit_tx.clone(),
        };
        let report = syncer
            .sync_with_report(&wallet, options)
            .await
            .with_context(|| format!("Pass {} failed", pass + 1))?;

        info!(
            "Pass {}: {} transactions ({} new, {} pages, cached={}, persisted={})",
            pass + 1,
            report.transactions.len(),
            report.new_transactions,
            report.pages,
            report.from_cache,
            report.persisted
        );

        if let Some(prev) = &previous {
            if prev != &report.transactions {
                warn!("Pass {} differs from the previous pass", pass + 1);
            }
        }
        previous = Some(report.transactions.clone());
        last = report;
    }

    info!("Indexer requests: {}", backend.request_count());
    Ok(last)
}

fn render(
    fixture: &Fixture,
    transactions: &[Transaction],
    output: OutputFormat,
) -> anyhow::Result<String> {
    if output == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(transactions)?);
    }

    let currency = fixture
        .wallet
        .currency()
        .context("Fixture wallet has an unknown currency")?;
    let now = fixture.now().unwrap_or_else(chrono::Utc::now);
    let display = to_display_list_at(transactions, &currency, &fixture.contacts, now);
    let groups = group_by_month_at(&display, now);

    if output == OutputFormat::Grouped {
        return Ok(serde_json::to_string_pretty(&groups)?);
    }

    let mut lines = Vec::new();
    for group in &groups {
        lines.push(format!("== {} ==", group.title));
        for tx in &group.data {
            lines.push(format!(
                "{:<12} {:<28} {:>18}  {}",
                tx.txid,
                tx.ui_description.as_deref().unwrap_or(""),
                tx.ui_value.as_deref().unwrap_or(""),
                tx.ui_time.as_deref().unwrap_or("")
            ));
        }
    }
    Ok(lines.join("\n"))
}
