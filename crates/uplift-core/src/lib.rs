//! Uplift Core Library
//!
//! Trade-promotion ROI analytics over loosely keyed spreadsheet tables:
//! - Record model for header-agnostic spreadsheet rows
//! - Normalization of amounts, dates, material numbers and UPCs
//! - ROI engine (lookup indexes, hierarchy filter, promotion grouping,
//!   per-promotion calculation, customer roll-up, drill-down)
//! - Report helpers (portfolio summary, top promotions, drill-down totals)
//! - Workbook loading from CSV/JSON tables
//! - Two-layer TOML configuration

pub mod config;
pub mod error;
pub mod fields;
pub mod load;
pub mod models;
pub mod normalize;
pub mod report;
pub mod roi;

/// Fixture workbooks for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ReportConfig, ServerSettings, TablesConfig, UpliftConfig};
pub use error::{Error, Result};
pub use models::{
    CellValue, CustomerMapping, CustomerRoiStats, HierarchyTree, MaterialMapping,
    PromotionAnalysis, PromotionDrillDown, Record, RoiFilter, RoiResult, SalesDrillDownRow,
    SpendDrillDownRow, TableKind, Workbook, YearFilter,
};
pub use report::{top_promotions, DrillDownTotals, PortfolioSummary, RoiReport};
pub use roi::{
    available_years, calculate_roi, hierarchy_tree, promotion_drill_down, PriceBasis,
    SpendSource,
};
