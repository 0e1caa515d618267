//! Sales matching shared by the calculator and the drill-down
//!
//! Both callers build a [`PromotionScope`] and walk [`PromotionScope::matched_lines`],
//! so the rows behind a drill-down are exactly the rows behind the ROI figure.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::fields;
use crate::models::Record;
use crate::normalize::{cell_text, field, parse_amount, parse_date, upc_of};

use super::grouping::PromotionGroup;
use super::index::LookupIndex;
use super::policy::UnitEconomics;

/// Normalized material numbers in first-insertion order, without duplicates
///
/// Order matters: when several of a promotion's materials map to the same
/// UPC, the first one inserted prices it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialSet {
    items: Vec<String>,
}

impl MaterialSet {
    /// Add a material; returns false if it was already present
    pub fn insert(&mut self, material: String) -> bool {
        if self.contains(&material) {
            return false;
        }
        self.items.push(material);
        true
    }

    pub fn contains(&self, material: &str) -> bool {
        self.items.iter().any(|m| m == material)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Extend<String> for MaterialSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for material in iter {
            self.insert(material);
        }
    }
}

/// A Nielsen sales row with its fields already extracted
#[derive(Debug, Clone, PartialEq)]
pub struct SalesLine {
    /// Lower-cased customer, the join key against resolved customers
    pub customer_key: String,
    /// Customer exactly as it appears in the sales data
    pub customer: String,
    pub date: NaiveDate,
    /// Normalized UPC (leading zeros stripped)
    pub upc: String,
    pub incremental_units: f64,
    pub baseline_units: f64,
    pub unit_price: f64,
}

impl SalesLine {
    /// Extract a sales row; rows without a customer or a parseable date never match
    pub fn from_record(row: &Record) -> Option<Self> {
        let customer = cell_text(field(row, fields::SALES_CUSTOMER));
        if customer.is_empty() {
            return None;
        }
        let date = parse_date(field(row, fields::SALES_DATE))?;

        Some(Self {
            customer_key: customer.to_lowercase(),
            customer,
            date,
            upc: upc_of(field(row, fields::SALES_UPC)),
            incremental_units: parse_amount(field(row, fields::INCREMENTAL_UNITS)),
            baseline_units: parse_amount(field(row, fields::BASELINE_UNITS)),
            unit_price: parse_amount(field(row, fields::UNIT_PRICE)),
        })
    }
}

/// Sales lines bucketed by customer key, each bucket in table order
#[derive(Debug, Default)]
pub struct SalesTable {
    by_customer: HashMap<String, Vec<SalesLine>>,
}

impl SalesTable {
    pub fn new(rows: &[Record]) -> Self {
        let mut by_customer: HashMap<String, Vec<SalesLine>> = HashMap::new();
        let mut usable = 0usize;
        for line in rows.iter().filter_map(SalesLine::from_record) {
            usable += 1;
            by_customer
                .entry(line.customer_key.clone())
                .or_default()
                .push(line);
        }

        debug!(
            rows = rows.len(),
            usable,
            customers = by_customer.len(),
            "Sales lines indexed"
        );

        Self { by_customer }
    }

    pub fn lines_for(&self, customer_key: &str) -> &[SalesLine] {
        self.by_customer
            .get(customer_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Margin contribution of one matched sales line
#[derive(Debug, Clone, PartialEq)]
pub struct LineMargin {
    /// Material that priced the UPC, if any
    pub material: Option<String>,
    pub economics: UnitEconomics,
    pub gross_margin: f64,
}

/// Everything that decides which sales lines belong to a promotion
#[derive(Debug, Clone)]
pub struct PromotionScope {
    /// Resolved, lower-cased Nielsen customer
    pub customer: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Promotion-row materials followed by FI-document materials
    pub materials: MaterialSet,
    /// UPCs the scan is restricted to
    pub target_upcs: HashSet<String>,
    /// True when the promotion defines any product at all
    pub restricted: bool,
}

impl PromotionScope {
    pub fn new(
        group: &PromotionGroup<'_>,
        customer: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
        index: &LookupIndex,
    ) -> Self {
        let mut materials = group.materials.clone();
        if let Some(fi) = index.fi_materials(&group.promotion_id) {
            materials.extend(fi.iter().map(str::to_string));
        }

        let target_upcs: HashSet<String> = materials
            .iter()
            .filter_map(|m| index.upc_for_material(m))
            .map(str::to_string)
            .collect();

        Self {
            customer: customer.map(str::to_string),
            start,
            end,
            restricted: !materials.is_empty(),
            materials,
            target_upcs,
        }
    }

    /// Sales lines for the customer, inside the window, within the product scope
    ///
    /// A promotion whose materials map to no UPC matches nothing.
    pub fn matched_lines<'t>(&'t self, sales: &'t SalesTable) -> impl Iterator<Item = &'t SalesLine> + 't {
        let lines: &[SalesLine] = match &self.customer {
            Some(customer) => sales.lines_for(customer),
            None => &[],
        };
        lines.iter().filter(move |line| {
            line.date >= self.start
                && line.date <= self.end
                && (!self.restricted || self.target_upcs.contains(&line.upc))
        })
    }

    /// Material that prices a UPC
    ///
    /// The first of the promotion's own materials mapped to the UPC wins; any
    /// material mapped to the UPC is the fallback.
    pub fn material_for_upc(&self, upc: &str, index: &LookupIndex) -> Option<String> {
        self.materials
            .iter()
            .find(|m| index.upc_for_material(m) == Some(upc))
            .or_else(|| index.material_for_upc(upc))
            .map(str::to_string)
    }

    pub fn price_line(&self, line: &SalesLine, index: &LookupIndex) -> LineMargin {
        let material = self.material_for_upc(&line.upc, index);
        let economics = UnitEconomics::resolve(material.as_deref(), line.unit_price, index);
        LineMargin {
            gross_margin: economics.unit_margin() * line.incremental_units,
            material,
            economics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaterialMapping, Workbook};
    use crate::roi::group_promotions;
    use crate::roi::policy::PriceBasis;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(customer: &str, day: &str, upc: &str, units: &str, price: &str) -> Record {
        Record::from_pairs([
            ("Customer", customer),
            ("Date", day),
            ("UPC", upc),
            ("Incremental U Vol", units),
            ("Avg Sgl Unit Price", price),
        ])
    }

    fn workbook() -> Workbook {
        let mut workbook = Workbook::new();
        workbook.material_mappings = vec![
            MaterialMapping::new("200", "100", "1"),
            MaterialMapping::new("201", "100", "1"),
            MaterialMapping::new("300", "300", "1"),
        ];
        workbook.promotions = vec![Record::from_pairs([
            ("PromotionID", "P1"),
            ("ProductID", "200"),
        ])];
        workbook
    }

    #[test]
    fn test_material_set_keeps_first_insertion_order() {
        let mut set = MaterialSet::default();
        assert!(set.insert("b".into()));
        assert!(set.insert("a".into()));
        assert!(!set.insert("b".into()));
        set.extend(["c".to_string(), "a".to_string()]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sales_lines_need_customer_and_date() {
        let rows = vec![
            sale("Acme", "2024-01-05", "000100", "10", "5"),
            sale("", "2024-01-05", "100", "10", "5"),
            sale("ACME", "garbage", "100", "10", "5"),
            sale("ACME", "2024-01-06", "100", "3", "5"),
        ];
        let table = SalesTable::new(&rows);
        let lines = table.lines_for("acme");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].upc, "100");
        assert_eq!(lines[0].customer, "Acme");
        assert_eq!(lines[1].incremental_units, 3.0);
        assert!(table.lines_for("nobody").is_empty());
    }

    #[test]
    fn test_window_is_inclusive_and_products_restrict() {
        let workbook = workbook();
        let index = LookupIndex::build(&workbook);
        let grouped = group_promotions(&workbook.promotions);
        let scope = PromotionScope::new(
            grouped.get("P1").unwrap(),
            Some("acme"),
            date(2024, 1, 1),
            date(2024, 1, 31),
            &index,
        );
        assert!(scope.restricted);
        assert_eq!(scope.target_upcs.len(), 1);

        let rows = vec![
            sale("acme", "2024-01-01", "100", "1", "5"),
            sale("acme", "2024-01-31", "100", "2", "5"),
            sale("acme", "2024-02-01", "100", "4", "5"),
            sale("acme", "2024-01-15", "300", "8", "5"),
        ];
        let table = SalesTable::new(&rows);
        let units: Vec<f64> = scope
            .matched_lines(&table)
            .map(|l| l.incremental_units)
            .collect();
        assert_eq!(units, vec![1.0, 2.0]);
    }

    #[test]
    fn test_unresolved_customer_matches_nothing() {
        let workbook = workbook();
        let index = LookupIndex::build(&workbook);
        let grouped = group_promotions(&workbook.promotions);
        let scope = PromotionScope::new(
            grouped.get("P1").unwrap(),
            None,
            date(2024, 1, 1),
            date(2024, 12, 31),
            &index,
        );
        let table = SalesTable::new(&[sale("acme", "2024-01-05", "100", "1", "5")]);
        assert_eq!(scope.matched_lines(&table).count(), 0);
    }

    #[test]
    fn test_promotion_material_beats_reverse_map() {
        let workbook = workbook();
        let index = LookupIndex::build(&workbook);
        // Reverse map alone would say "201" (last write wins)
        assert_eq!(index.material_for_upc("100"), Some("201"));

        let grouped = group_promotions(&workbook.promotions);
        let scope = PromotionScope::new(
            grouped.get("P1").unwrap(),
            Some("acme"),
            date(2024, 1, 1),
            date(2024, 1, 31),
            &index,
        );
        assert_eq!(scope.material_for_upc("100", &index).as_deref(), Some("200"));
        assert_eq!(scope.material_for_upc("300", &index).as_deref(), Some("300"));
        assert_eq!(scope.material_for_upc("999", &index), None);
    }

    #[test]
    fn test_unmapped_line_margin_equals_revenue() {
        let workbook = Workbook::new();
        let index = LookupIndex::build(&workbook);
        let promotions = vec![Record::from_pairs([("PromotionID", "P9")])];
        let grouped = group_promotions(&promotions);
        let scope = PromotionScope::new(
            grouped.get("P9").unwrap(),
            Some("acme"),
            date(2024, 1, 1),
            date(2024, 1, 31),
            &index,
        );
        assert!(!scope.restricted);

        let rows = vec![sale("acme", "2024-01-05", "555", "10", "4")];
        let table = SalesTable::new(&rows);
        let line = scope.matched_lines(&table).next().unwrap();
        let margin = scope.price_line(line, &index);
        assert_eq!(margin.material, None);
        assert_eq!(margin.economics.basis, PriceBasis::SalesPriceUnmapped);
        assert_eq!(margin.gross_margin, 40.0);
    }
}
