//! Per-promotion ROI calculation

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::fields;
use crate::models::{
    PromotionAnalysis, Record, RoiFilter, RoiResult, Workbook, UNRESOLVED_CUSTOMER,
};
use crate::normalize::{cell_text, field, parse_amount, parse_date};

use super::aggregate::aggregate_customers;
use super::grouping::{group_promotions, PromotionGroup};
use super::hierarchy::HierarchyScope;
use super::index::LookupIndex;
use super::matching::{PromotionScope, SalesTable};
use super::policy::{roi_percent, SpendDecision};

/// Why a grouped promotion produced no analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    NoDates,
    Year,
    Hierarchy,
}

#[derive(Debug, Default)]
struct SkipCounts {
    no_dates: usize,
    year: usize,
    hierarchy: usize,
}

impl SkipCounts {
    fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NoDates => self.no_dates += 1,
            SkipReason::Year => self.year += 1,
            SkipReason::Hierarchy => self.hierarchy += 1,
        }
    }
}

/// Planned start and end of a promotion header row
pub(crate) fn promotion_window(header: &Record) -> Option<(NaiveDate, NaiveDate)> {
    let start = parse_date(field(header, fields::PLANNED_START))?;
    let end = parse_date(field(header, fields::PLANNED_END))?;
    Some((start, end))
}

/// Compute ROI for every promotion that survives the filter
///
/// Returns empty results when either sales or promotions are missing. Bad
/// cells never abort the run; they degrade to 0, no date, or no match.
pub fn calculate_roi(workbook: &Workbook, filter: &RoiFilter) -> RoiResult {
    if !workbook.is_ready_for_analysis() {
        debug!(
            sales = workbook.sales.len(),
            promotions = workbook.promotions.len(),
            "Workbook not ready for analysis"
        );
        return RoiResult::default();
    }

    let index = LookupIndex::build(workbook);
    let hierarchy = HierarchyScope::resolve(&workbook.hierarchy, filter);
    let grouped = group_promotions(&workbook.promotions);
    let sales = SalesTable::new(&workbook.sales);

    let mut promotions = Vec::with_capacity(grouped.len());
    let mut skipped = SkipCounts::default();

    for group in grouped.iter() {
        match analyze_promotion(group, filter, hierarchy.as_ref(), &index, &sales) {
            Ok(analysis) => promotions.push(analysis),
            Err(reason) => {
                debug!(promotion = %group.promotion_id, reason = ?reason, "Promotion skipped");
                skipped.record(reason);
            }
        }
    }

    let customer_stats = aggregate_customers(&promotions);

    debug!(
        no_dates = skipped.no_dates,
        year = skipped.year,
        hierarchy = skipped.hierarchy,
        "Skipped promotions"
    );
    info!(
        filter = %filter,
        promotions = promotions.len(),
        customers = customer_stats.len(),
        "ROI calculated"
    );

    RoiResult {
        promotions,
        customer_stats,
    }
}

fn analyze_promotion(
    group: &PromotionGroup<'_>,
    filter: &RoiFilter,
    hierarchy: Option<&HierarchyScope>,
    index: &LookupIndex,
    sales: &SalesTable,
) -> Result<PromotionAnalysis, SkipReason> {
    let header = group.header;
    let (start, end) = promotion_window(header).ok_or(SkipReason::NoDates)?;

    if !filter.year.matches(start) {
        return Err(SkipReason::Year);
    }

    let territory_id = cell_text(field(header, fields::TERRITORY_ID));
    let customer = index.customer_for_territory(&territory_id);

    if let Some(scope) = hierarchy {
        if !scope.admits(&territory_id, customer).is_admitted() {
            return Err(SkipReason::Hierarchy);
        }
    }

    let planned_spend = parse_amount(field(header, fields::PLANNED_SPEND));
    let actual_spend = index.actual_spend(&group.promotion_id);
    let spend = SpendDecision::choose(actual_spend, planned_spend);

    let scope = PromotionScope::new(group, customer, start, end, index);

    let mut incremental_units = 0.0;
    let mut baseline_units = 0.0;
    let mut gross_margin = 0.0;
    let mut unit_price_sum = 0.0;
    let mut matched = 0usize;

    for line in scope.matched_lines(sales) {
        incremental_units += line.incremental_units;
        baseline_units += line.baseline_units;
        unit_price_sum += line.unit_price;
        matched += 1;
        gross_margin += scope.price_line(line, index).gross_margin;
    }

    // Display-only revenue: incremental units at the average observed price
    let average_price = if matched > 0 {
        unit_price_sum / matched as f64
    } else {
        0.0
    };

    let net_profit = gross_margin - spend.amount;
    let promotion_name = match cell_text(field(header, fields::PROMOTION_NAME)) {
        name if name.is_empty() => format!("Promo {}", group.promotion_id),
        name => name,
    };

    Ok(PromotionAnalysis {
        promotion_id: group.promotion_id.clone(),
        promotion_name,
        territory_id,
        customer_name: customer.unwrap_or(UNRESOLVED_CUSTOMER).to_string(),
        customer_resolved: customer.is_some(),
        start_date: start,
        end_date: end,
        planned_spend,
        actual_spend,
        final_spend: spend.amount,
        spend_source: spend.source,
        incremental_units,
        incremental_revenue: incremental_units * average_price,
        baseline_units,
        gross_margin,
        net_profit,
        roi_percent: roi_percent(gross_margin, spend.amount),
        roi_value: net_profit,
        mapped_product_count: scope.target_upcs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerMapping, MaterialMapping};
    use crate::roi::SpendSource;

    fn base_workbook() -> Workbook {
        let mut workbook = Workbook::new();
        workbook.promotions = vec![Record::from_pairs([
            ("PromotionID", "P1"),
            ("PromotionName", "Spring Feature"),
            ("TerritoryID", "T1"),
            ("Tactic", "Feature"),
            ("Planned_Start", "2024-03-01"),
            ("Planned_Finish", "2024-03-31"),
            ("Planned_Spend", "50"),
        ])];
        workbook.sales = vec![
            Record::from_pairs([
                ("Customer", "Acme"),
                ("Date", "2024-03-10"),
                ("UPC", "100"),
                ("Incremental U Vol", "10"),
                ("Baseline U Vol", "40"),
                ("Avg Sgl Unit Price", "4"),
            ]),
            Record::from_pairs([
                ("Customer", "Acme"),
                ("Date", "2024-03-17"),
                ("UPC", "100"),
                ("Incremental U Vol", "10"),
                ("Baseline U Vol", "40"),
                ("Avg Sgl Unit Price", "6"),
            ]),
        ];
        workbook.customer_mappings = vec![CustomerMapping::new("T1", "North", "Acme")];
        workbook
    }

    #[test]
    fn test_not_ready_returns_empty() {
        let mut workbook = base_workbook();
        workbook.sales.clear();
        assert_eq!(calculate_roi(&workbook, &RoiFilter::all()), RoiResult::default());
    }

    #[test]
    fn test_unmapped_products_price_at_sales_price() {
        let result = calculate_roi(&base_workbook(), &RoiFilter::all());
        let p1 = &result.promotions[0];

        assert_eq!(p1.promotion_name, "Spring Feature");
        assert_eq!(p1.customer_name, "acme");
        assert!(p1.customer_resolved);
        assert_eq!(p1.incremental_units, 20.0);
        assert_eq!(p1.baseline_units, 80.0);
        // 10 x 4 + 10 x 6
        assert_eq!(p1.gross_margin, 100.0);
        // 20 units at the average price of 5
        assert_eq!(p1.incremental_revenue, 100.0);
        assert_eq!(p1.spend_source, SpendSource::Planned);
        assert_eq!(p1.final_spend, 50.0);
        assert_eq!(p1.net_profit, 50.0);
        assert_eq!(p1.roi_value, 50.0);
        assert_eq!(p1.roi_percent, 100.0);
        assert_eq!(p1.mapped_product_count, 0);
    }

    #[test]
    fn test_unresolved_territory_kept_with_sentinel() {
        let mut workbook = base_workbook();
        workbook.customer_mappings.clear();
        let result = calculate_roi(&workbook, &RoiFilter::all());

        assert_eq!(result.promotions.len(), 1);
        assert_eq!(result.promotions[0].customer_name, UNRESOLVED_CUSTOMER);
        assert!(!result.promotions[0].customer_resolved);
        assert_eq!(result.promotions[0].gross_margin, 0.0);
        assert!(result.customer_stats.is_empty());
    }

    #[test]
    fn test_missing_dates_exclude_promotion() {
        let mut workbook = base_workbook();
        workbook.promotions[0].insert("Planned_Finish", "someday");
        assert!(calculate_roi(&workbook, &RoiFilter::all()).promotions.is_empty());
    }

    #[test]
    fn test_year_filter() {
        let workbook = base_workbook();
        assert_eq!(
            calculate_roi(&workbook, &RoiFilter::all().with_year("2024")).promotions.len(),
            1
        );
        assert!(calculate_roi(&workbook, &RoiFilter::all().with_year("2023"))
            .promotions
            .is_empty());
    }

    #[test]
    fn test_default_promotion_name() {
        let mut workbook = base_workbook();
        workbook.promotions[0].insert("PromotionName", "");
        let result = calculate_roi(&workbook, &RoiFilter::all());
        assert_eq!(result.promotions[0].promotion_name, "Promo P1");
    }

    #[test]
    fn test_products_without_upc_mapping_match_nothing() {
        let mut workbook = base_workbook();
        workbook.promotions[0].insert("ProductID", "999");
        let result = calculate_roi(&workbook, &RoiFilter::all());
        assert_eq!(result.promotions[0].incremental_units, 0.0);
        assert_eq!(result.promotions[0].mapped_product_count, 0);
    }

    #[test]
    fn test_fi_materials_extend_product_scope() {
        let mut workbook = base_workbook();
        workbook.material_mappings = vec![MaterialMapping::new("200", "100", "1")];
        workbook.financial_documents = vec![Record::from_pairs([
            ("PromotionID", "P1"),
            ("AMOUNT", "0"),
            ("MATERIAL", "000200"),
        ])];
        let result = calculate_roi(&workbook, &RoiFilter::all());
        let p1 = &result.promotions[0];
        assert_eq!(p1.mapped_product_count, 1);
        assert_eq!(p1.incremental_units, 20.0);
        // Zero FI total falls back to planned spend
        assert_eq!(p1.spend_source, SpendSource::Planned);
    }
}
