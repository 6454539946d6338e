//! billing-snapshots - list billing report snapshots for an account.

use std::num::NonZeroUsize;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use usage_reports::config::UsageReportsConfig;
use usage_reports::session::ConfigSession;
use usage_reports::snapshots::{
    schema, BillingSnapshotListArgs, BillingSnapshotListDataSource, SnapshotLister,
};

/// List IBM Cloud billing report snapshots for a month as JSON.
#[derive(Parser)]
#[command(name = "billing-snapshots")]
#[command(about = "List billing report snapshots for an account")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Month to list, yyyy-mm
    #[arg(long, required_unless_present = "schema")]
    month: Option<String>,

    /// Lower bound, epoch milliseconds
    #[arg(long)]
    date_from: Option<i64>,

    /// Upper bound, epoch milliseconds
    #[arg(long)]
    date_to: Option<i64>,

    /// Account ID (overrides IC_ACCOUNT_ID)
    #[arg(long)]
    account_id: Option<String>,

    /// Page size (overrides IC_USAGE_REPORTS_PAGE_LIMIT)
    #[arg(long)]
    limit: Option<u32>,

    /// Stop with an error after this many pages (overrides IC_USAGE_REPORTS_MAX_PAGES)
    #[arg(long)]
    max_pages: Option<NonZeroUsize>,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    /// Print the data source schema and exit
    #[arg(long)]
    schema: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("usage_reports=debug,billing_snapshots=debug,info")
    } else {
        EnvFilter::new("usage_reports=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.schema {
        return print_json(&schema::document(), cli.compact);
    }

    let mut config = UsageReportsConfig::from_env().context("Failed to load configuration")?;
    if let Some(account_id) = cli.account_id {
        config.account_id = Some(account_id);
    }
    if cli.limit.is_some() {
        config.page_limit = cli.limit;
    }
    if cli.max_pages.is_some() {
        config.max_pages = cli.max_pages;
    }

    let lister = SnapshotLister::new()
        .with_page_limit(config.page_limit)
        .with_max_pages(config.max_pages);
    let session = ConfigSession::new(config);

    let args = BillingSnapshotListArgs {
        month: cli.month.unwrap_or_default(),
        date_from: cli.date_from,
        date_to: cli.date_to,
    };
    tracing::debug!(?args, "Reading billing snapshots");

    let state = BillingSnapshotListDataSource::new(lister)
        .read(&session, &args)
        .await
        .context("Failed to read billing snapshots")?;

    print_json(&state, cli.compact)
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{out}");
    Ok(())
}
