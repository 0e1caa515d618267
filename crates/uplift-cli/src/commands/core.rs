//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Resolve the uplift config
//! - `open_workbook` - Load the workbook directory
//! - `resolve_filter` - Build an ROI filter from flags and config defaults

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use uplift_core::{load::load_workbook, RoiFilter, UpliftConfig, Workbook};

pub fn load_config(path: Option<&Path>) -> Result<UpliftConfig> {
    UpliftConfig::load(path).context("Failed to load config")
}

/// Load every table found in the workbook directory
pub fn open_workbook(data_dir: &Path, config: &UpliftConfig) -> Result<Workbook> {
    debug!(dir = %data_dir.display(), "Opening workbook");
    load_workbook(data_dir, &config.tables)
        .with_context(|| format!("Failed to load workbook from {}", data_dir.display()))
}

/// Filter from CLI flags; a missing year falls back to `[report] default_year`
pub fn resolve_filter(
    year: Option<&str>,
    config: &UpliftConfig,
    hier2: Option<&str>,
    hier3: Option<&str>,
    hier4: Option<&str>,
) -> RoiFilter {
    let year = year.unwrap_or(config.report.default_year.as_str());
    RoiFilter::from_parts(Some(year), hier2, hier3, hier4)
}
