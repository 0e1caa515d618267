//! Domain models for Uplift

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::fields;
use crate::normalize::{cell_text, find_field};
use crate::roi::{PriceBasis, SpendSource};

/// Customer name reported for promotions whose territory has no mapping
pub const UNRESOLVED_CUSTOMER: &str = "Unknown (No Mapping)";

// ============================================================================
// Spreadsheet records
// ============================================================================

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A cell the upstream parser already recognised as a date
    Date(NaiveDate),
}

impl CellValue {
    /// Render the cell as text the way ids and codes are compared
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Blank cells, zero and `false` all count as "no value"
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::Bool(b) => !b,
            Self::Date(_) => false,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or_default(),
            Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

/// One spreadsheet row: header name to cell, in column order
///
/// Header spellings differ between sources, so fields are looked up through
/// [`find_field`] with a list of candidate names rather than by a fixed key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from (header, value) pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.insert(key, value);
        }
        record
    }

    /// Set a column, replacing an existing column with the same header
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Exact header lookup
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping column names to cell values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((key, value)) = map.next_entry::<String, CellValue>()? {
                    record.insert(key, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

// ============================================================================
// Mapping tables
// ============================================================================

/// User-curated territory to Nielsen customer cross-reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerMapping {
    pub territory_id: String,
    pub territory_name: String,
    pub nielsen_customer: String,
}

impl CustomerMapping {
    pub fn new(territory_id: &str, territory_name: &str, nielsen_customer: &str) -> Self {
        Self {
            territory_id: territory_id.to_string(),
            territory_name: territory_name.to_string(),
            nielsen_customer: nielsen_customer.to_string(),
        }
    }

    /// Read a mapping from a spreadsheet row, whatever its header spelling
    pub fn from_record(record: &Record) -> Self {
        Self {
            territory_id: text_field(record, fields::MAPPING_TERRITORY_ID),
            territory_name: text_field(record, fields::MAPPING_TERRITORY_NAME),
            nielsen_customer: text_field(record, fields::MAPPING_NIELSEN_CUSTOMER),
        }
    }
}

/// User-curated SAP material to retail UPC cross-reference
///
/// `pack_size` is the number of consumer units per case; blank means 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialMapping {
    pub matnr: String,
    pub upc: String,
    pub pack_size: String,
}

impl MaterialMapping {
    pub fn new(matnr: &str, upc: &str, pack_size: &str) -> Self {
        Self {
            matnr: matnr.to_string(),
            upc: upc.to_string(),
            pack_size: pack_size.to_string(),
        }
    }

    pub fn from_record(record: &Record) -> Self {
        Self {
            matnr: text_field(record, fields::MAPPING_MATNR),
            upc: text_field(record, fields::MAPPING_UPC),
            pack_size: text_field(record, fields::MAPPING_PACK_SIZE),
        }
    }
}

fn text_field(record: &Record, candidates: &[&str]) -> String {
    find_field(record, candidates)
        .map(cell_text)
        .unwrap_or_default()
}

// ============================================================================
// Workbook
// ============================================================================

/// The tables a workbook holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableKind {
    Sales,
    Promotions,
    #[serde(rename = "fi")]
    FinancialDocuments,
    Costs,
    Prices,
    Hierarchy,
    CustomerMappings,
    MaterialMappings,
}

impl TableKind {
    pub const ALL: [TableKind; 8] = [
        Self::Sales,
        Self::Promotions,
        Self::FinancialDocuments,
        Self::Costs,
        Self::Prices,
        Self::Hierarchy,
        Self::CustomerMappings,
        Self::MaterialMappings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Promotions => "promotions",
            Self::FinancialDocuments => "fi",
            Self::Costs => "costs",
            Self::Prices => "prices",
            Self::Hierarchy => "hierarchy",
            Self::CustomerMappings => "customer-mappings",
            Self::MaterialMappings => "material-mappings",
        }
    }
}

impl FromStr for TableKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "sales" | "nielsen" => Ok(Self::Sales),
            "promotions" | "promotion" => Ok(Self::Promotions),
            "fi" | "financial-documents" => Ok(Self::FinancialDocuments),
            "costs" | "cogs" => Ok(Self::Costs),
            "prices" | "list-prices" => Ok(Self::Prices),
            "hierarchy" => Ok(Self::Hierarchy),
            "customer-mappings" => Ok(Self::CustomerMappings),
            "material-mappings" => Ok(Self::MaterialMappings),
            _ => Err(Error::UnknownTable(s.to_string())),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row count of one workbook table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatus {
    pub table: TableKind,
    pub rows: usize,
}

/// Every dataset the ROI engine reads, fully materialized in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Workbook {
    /// Nielsen sales volumes (customer / period / UPC)
    pub sales: Vec<Record>,
    /// Promotion calendar, one row per promotion product
    pub promotions: Vec<Record>,
    /// FI documents posted against promotions
    pub financial_documents: Vec<Record>,
    /// Cost of goods per material (per case)
    pub costs: Vec<Record>,
    /// List price per material (per case)
    pub prices: Vec<Record>,
    /// Customer hierarchy, level 6 is the territory leaf
    pub hierarchy: Vec<Record>,
    pub customer_mappings: Vec<CustomerMapping>,
    pub material_mappings: Vec<MaterialMapping>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sales and promotions are the minimum needed to produce any result
    pub fn is_ready_for_analysis(&self) -> bool {
        !self.sales.is_empty() && !self.promotions.is_empty()
    }

    pub fn row_count(&self, table: TableKind) -> usize {
        match table {
            TableKind::Sales => self.sales.len(),
            TableKind::Promotions => self.promotions.len(),
            TableKind::FinancialDocuments => self.financial_documents.len(),
            TableKind::Costs => self.costs.len(),
            TableKind::Prices => self.prices.len(),
            TableKind::Hierarchy => self.hierarchy.len(),
            TableKind::CustomerMappings => self.customer_mappings.len(),
            TableKind::MaterialMappings => self.material_mappings.len(),
        }
    }

    pub fn table_counts(&self) -> Vec<TableStatus> {
        TableKind::ALL
            .iter()
            .map(|&table| TableStatus {
                table,
                rows: self.row_count(table),
            })
            .collect()
    }

    /// Replace a whole table; mapping tables are read from the records
    pub fn replace_table(&mut self, table: TableKind, records: Vec<Record>) {
        match table {
            TableKind::Sales => self.sales = records,
            TableKind::Promotions => self.promotions = records,
            TableKind::FinancialDocuments => self.financial_documents = records,
            TableKind::Costs => self.costs = records,
            TableKind::Prices => self.prices = records,
            TableKind::Hierarchy => self.hierarchy = records,
            TableKind::CustomerMappings => {
                self.customer_mappings = records.iter().map(CustomerMapping::from_record).collect()
            }
            TableKind::MaterialMappings => {
                self.material_mappings = records.iter().map(MaterialMapping::from_record).collect()
            }
        }
    }

    pub fn clear_table(&mut self, table: TableKind) {
        self.replace_table(table, Vec::new());
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Year restriction on promotion start dates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum YearFilter {
    #[default]
    All,
    Year(String),
}

impl YearFilter {
    /// The promotion's start year must equal the requested year text exactly
    pub fn matches(&self, start: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Year(year) => start.year().to_string() == *year,
        }
    }
}

impl FromStr for YearFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Year(s.to_string()))
        }
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Year(year) => write!(f, "{}", year),
        }
    }
}

/// Year and customer-hierarchy restriction for an ROI run
///
/// Hierarchy levels hold node names at levels 2, 3 and 4. A level given as
/// blank or `all` is unset, matching the "All" entry of a cascading picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoiFilter {
    pub year: YearFilter,
    pub hier2: Option<String>,
    pub hier3: Option<String>,
    pub hier4: Option<String>,
}

impl RoiFilter {
    /// No restriction at all
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from raw selections (CLI flags, query parameters)
    pub fn from_parts(
        year: Option<&str>,
        hier2: Option<&str>,
        hier3: Option<&str>,
        hier4: Option<&str>,
    ) -> Self {
        Self {
            year: year
                .map(|y| y.parse().unwrap_or_default())
                .unwrap_or_default(),
            hier2: selection(hier2),
            hier3: selection(hier3),
            hier4: selection(hier4),
        }
    }

    pub fn with_year(mut self, year: &str) -> Self {
        self.year = year.parse().unwrap_or_default();
        self
    }

    pub fn with_hier2(mut self, name: &str) -> Self {
        self.hier2 = selection(Some(name));
        self
    }

    pub fn with_hier3(mut self, name: &str) -> Self {
        self.hier3 = selection(Some(name));
        self
    }

    pub fn with_hier4(mut self, name: &str) -> Self {
        self.hier4 = selection(Some(name));
        self
    }

    /// Whether any hierarchy level is selected
    pub fn has_hierarchy(&self) -> bool {
        self.hier2.is_some() || self.hier3.is_some() || self.hier4.is_some()
    }
}

fn selection(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value.to_string())
    }
}

/// Label of the active filter, e.g. `Year: 2024 | West | Grocery`
impl fmt::Display for RoiFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let YearFilter::Year(year) = &self.year {
            parts.push(format!("Year: {}", year));
        }
        if let Some(h2) = &self.hier2 {
            parts.push(h2.clone());
        }
        if let Some(h3) = &self.hier3 {
            parts.push(h3.clone());
        }
        if parts.is_empty() {
            write!(f, "All Data")
        } else {
            write!(f, "{}", parts.join(" | "))
        }
    }
}

// ============================================================================
// Engine results
// ============================================================================

/// ROI result for one promotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionAnalysis {
    pub promotion_id: String,
    pub promotion_name: String,
    pub territory_id: String,
    /// Lower-cased Nielsen customer, or [`UNRESOLVED_CUSTOMER`]
    pub customer_name: String,
    pub customer_resolved: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    pub planned_spend: f64,
    /// Sum of FI documents posted to this promotion
    pub actual_spend: f64,
    /// Actual if positive, else planned
    pub final_spend: f64,
    pub spend_source: SpendSource,

    pub incremental_units: f64,
    /// Incremental units times the average Nielsen unit price (display only)
    pub incremental_revenue: f64,
    pub baseline_units: f64,

    /// Sum of (unit list price - unit cost) x incremental units
    pub gross_margin: f64,
    pub net_profit: f64,
    pub roi_percent: f64,
    pub roi_value: f64,

    /// Number of UPCs the sales scan was restricted to (0 = unrestricted)
    pub mapped_product_count: usize,
}

/// ROI roll-up for one resolved customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRoiStats {
    pub customer_name: String,
    pub total_spend: f64,
    pub total_gross_margin: f64,
    pub promotion_count: usize,
    /// Ratio of sums, not a mean of per-promotion percentages
    pub avg_roi_percent: f64,
}

/// Output of [`crate::calculate_roi`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub promotions: Vec<PromotionAnalysis>,
    pub customer_stats: Vec<CustomerRoiStats>,
}

/// One matched Nielsen row behind a promotion's gross margin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesDrillDownRow {
    pub date: NaiveDate,
    pub customer: String,
    pub upc: String,
    pub incremental_units: f64,
    pub unit_price: f64,
    pub revenue: f64,
    pub gross_margin: f64,
    /// Material that priced this UPC; `None` when no mapping exists
    pub matched_material: Option<String>,
    pub price_basis: PriceBasis,
}

/// One FI document behind a promotion's actual spend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendDrillDownRow {
    pub document_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub material: String,
    pub gl_account: String,
    pub description: String,
    pub amount: f64,
}

/// Line items behind a single promotion's ROI figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromotionDrillDown {
    pub promotion_id: String,
    pub sales_rows: Vec<SalesDrillDownRow>,
    pub spend_rows: Vec<SpendDrillDownRow>,
}

/// Customer hierarchy levels 2-4 for cascading filter pickers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyTree {
    /// Distinct level-2 names, sorted
    pub level2: Vec<String>,
    pub level2_to_level3: BTreeMap<String, BTreeSet<String>>,
    pub level3_to_level4: BTreeMap<String, BTreeSet<String>>,
}
