//! ROI Engine - trade-promotion profitability
//!
//! Joins loosely keyed tables (Nielsen sales, promotion calendar, FI spend,
//! cost and price masters, customer hierarchy, manual mappings) into one
//! ROI figure per promotion and per customer.
//!
//! ## Stages
//!
//! - **Lookup index** - territory, material, cost, price and spend maps
//! - **Hierarchy scope** - admissible territories/customers for a filter
//! - **Promotion grouping** - one header row and product set per promotion
//! - **Calculator** - sales matching, margin, spend choice and ROI
//! - **Aggregation** - per-customer roll-up
//! - **Drill-down** - the line items behind one promotion
//!
//! Everything is rebuilt from the inputs on each call; the engine holds no
//! state and is safe to call concurrently.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use uplift_core::{calculate_roi, RoiFilter};
//!
//! let result = calculate_roi(&workbook, &RoiFilter::all().with_year("2024"));
//! for promo in &result.promotions {
//!     println!("{} {:.1}%", promo.promotion_id, promo.roi_percent);
//! }
//! ```

pub mod aggregate;
pub mod calculator;
pub mod drilldown;
pub mod grouping;
pub mod hierarchy;
pub mod index;
pub mod matching;
pub mod policy;

pub use aggregate::aggregate_customers;
pub use calculator::calculate_roi;
pub use drilldown::promotion_drill_down;
pub use grouping::{available_years, group_promotions, GroupedPromotions, PromotionGroup};
pub use hierarchy::{hierarchy_tree, HierarchyMatch, HierarchyScope};
pub use index::LookupIndex;
pub use matching::{LineMargin, MaterialSet, PromotionScope, SalesLine, SalesTable};
pub use policy::{
    pooled_roi_percent, roi_percent, PriceBasis, SpendDecision, SpendSource, UnitEconomics,
};
