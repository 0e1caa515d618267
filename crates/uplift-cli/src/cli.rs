//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Uplift - Trade-promotion ROI analytics
#[derive(Parser)]
#[command(name = "uplift")]
#[command(about = "Trade-promotion ROI engine over exported sales and spend tables", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Workbook directory holding the exported tables (CSV or JSON)
    #[arg(long, default_value = ".", global = true)]
    pub data: PathBuf,

    /// Config file
    ///
    /// Falls back to ~/.local/share/uplift/config.toml, then built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate promotion ROI
    Roi {
        /// Promotion start year, or "all" (defaults to [report] default_year)
        #[arg(short, long)]
        year: Option<String>,

        /// Customer hierarchy level 2 name
        #[arg(long)]
        hier2: Option<String>,

        /// Customer hierarchy level 3 name
        #[arg(long)]
        hier3: Option<String>,

        /// Customer hierarchy level 4 name
        #[arg(long)]
        hier4: Option<String>,

        /// Number of top promotions to list (defaults to [report] top_n)
        #[arg(short, long)]
        top: Option<usize>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the sales and spend line items behind one promotion
    Drilldown {
        /// Promotion ID
        promotion_id: String,

        /// Print line items as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the customer hierarchy (levels 2 / 3 / 4)
    Hierarchy {
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// List promotion start years, newest first
    Years,

    /// Show which workbook tables are loaded
    Status,

    /// Start the web server with the workbook preloaded
    Serve {
        /// Port to listen on (defaults to [server] port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to [server] host)
        #[arg(long)]
        host: Option<String>,
    },
}
