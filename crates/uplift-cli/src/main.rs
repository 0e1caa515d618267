//! Uplift CLI - Trade-promotion ROI analytics
//!
//! Usage:
//!   uplift --data DIR status            Show loaded tables
//!   uplift --data DIR roi --year 2024   Calculate promotion ROI
//!   uplift --data DIR drilldown P1      Line items behind a promotion
//!   uplift --data DIR serve --port 3000 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Roi {
            year,
            hier2,
            hier3,
            hier4,
            top,
            json,
        } => {
            let workbook = commands::open_workbook(&cli.data, &config)?;
            let filter = commands::resolve_filter(
                year.as_deref(),
                &config,
                hier2.as_deref(),
                hier3.as_deref(),
                hier4.as_deref(),
            );
            let top_n = top.unwrap_or(config.report.top_n);
            commands::cmd_roi(&workbook, &filter, top_n, json)
        }
        Commands::Drilldown { promotion_id, json } => {
            let workbook = commands::open_workbook(&cli.data, &config)?;
            commands::cmd_drilldown(&workbook, &promotion_id, json)
        }
        Commands::Hierarchy { json } => {
            let workbook = commands::open_workbook(&cli.data, &config)?;
            commands::cmd_hierarchy(&workbook, json)
        }
        Commands::Years => {
            let workbook = commands::open_workbook(&cli.data, &config)?;
            commands::cmd_years(&workbook)
        }
        Commands::Status => commands::cmd_status(&cli.data, cli.config.as_deref(), &config),
        Commands::Serve { port, host } => {
            commands::cmd_serve(&cli.data, &config, host.as_deref(), port).await
        }
    }
}
