//! Uplift configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), if it exists
//! 2. Override in data dir (~/.local/share/uplift/config.toml), if it exists
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::TableKind;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/uplift.toml");

/// File stems for each workbook table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablesConfig {
    pub sales: String,
    pub promotions: String,
    pub fi: String,
    pub costs: String,
    pub prices: String,
    pub hierarchy: String,
    pub customer_mappings: String,
    pub material_mappings: String,
}

impl TablesConfig {
    /// File stem for a table kind
    pub fn stem(&self, table: TableKind) -> &str {
        match table {
            TableKind::Sales => &self.sales,
            TableKind::Promotions => &self.promotions,
            TableKind::FinancialDocuments => &self.fi,
            TableKind::Costs => &self.costs,
            TableKind::Prices => &self.prices,
            TableKind::Hierarchy => &self.hierarchy,
            TableKind::CustomerMappings => &self.customer_mappings,
            TableKind::MaterialMappings => &self.material_mappings,
        }
    }
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            sales: "sales".to_string(),
            promotions: "promotions".to_string(),
            fi: "fi".to_string(),
            costs: "costs".to_string(),
            prices: "prices".to_string(),
            hierarchy: "hierarchy".to_string(),
            customer_mappings: "customer_mappings".to_string(),
            material_mappings: "material_mappings".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Size of the top-promotions list
    pub top_n: usize,
    /// Year filter applied when none is requested (`all` for none)
    pub default_year: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            default_year: "all".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpliftConfig {
    pub tables: TablesConfig,
    pub report: ReportConfig,
    pub server: ServerSettings,
}

impl UpliftConfig {
    /// Load configuration, preferring `path`, then the data-dir override
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = path
            .filter(|p| p.exists())
            .map(Path::to_path_buf)
            .or_else(|| default_config_path().filter(|p| p.exists()));

        let content = match candidate {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config override");
                fs::read_to_string(&path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
            }
            None => DEFAULT_CONFIG.to_string(),
        };

        parse_config(&content)
    }

    /// The embedded defaults
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Get the default override config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("uplift").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    tables: Option<RawTables>,
    report: Option<RawReport>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawTables {
    sales: Option<String>,
    promotions: Option<String>,
    fi: Option<String>,
    costs: Option<String>,
    prices: Option<String>,
    hierarchy: Option<String>,
    customer_mappings: Option<String>,
    material_mappings: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReport {
    top_n: Option<usize>,
    default_year: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    max_upload_bytes: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<UpliftConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = UpliftConfig::default();

    if let Some(tables) = raw.tables {
        let slots = [
            (tables.sales, &mut config.tables.sales),
            (tables.promotions, &mut config.tables.promotions),
            (tables.fi, &mut config.tables.fi),
            (tables.costs, &mut config.tables.costs),
            (tables.prices, &mut config.tables.prices),
            (tables.hierarchy, &mut config.tables.hierarchy),
            (tables.customer_mappings, &mut config.tables.customer_mappings),
            (tables.material_mappings, &mut config.tables.material_mappings),
        ];
        for (value, slot) in slots {
            if let Some(stem) = value.filter(|s| !s.trim().is_empty()) {
                *slot = stem;
            }
        }
    }

    if let Some(report) = raw.report {
        if let Some(top_n) = report.top_n {
            config.report.top_n = top_n;
        }
        if let Some(year) = report.default_year {
            config.report.default_year = year;
        }
    }

    if let Some(server) = raw.server {
        if let Some(host) = server.host {
            config.server.host = host;
        }
        if let Some(port) = server.port {
            config.server.port = port;
        }
        if let Some(limit) = server.max_upload_bytes {
            config.server.max_upload_bytes = limit;
        }
    }

    Ok(config)
}
