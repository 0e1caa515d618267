//! Report views over engine results: portfolio summary, top promotions,
//! drill-down totals

use serde::{Deserialize, Serialize};

use crate::models::{
    CustomerRoiStats, PromotionAnalysis, PromotionDrillDown, RoiFilter, RoiResult,
};
use crate::roi::{pooled_roi_percent, SpendSource};

/// Promotions ordered by ROI percent, best first, truncated to `n`
///
/// The sort is stable, so ties keep engine order.
pub fn top_promotions(promotions: &[PromotionAnalysis], n: usize) -> Vec<PromotionAnalysis> {
    let mut ranked = promotions.to_vec();
    ranked.sort_by(|a, b| b.roi_percent.total_cmp(&a.roi_percent));
    ranked.truncate(n);
    ranked
}

/// Portfolio-level totals across every analysed promotion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub promotion_count: usize,
    pub total_spend: f64,
    pub total_gross_margin: f64,
    pub total_net_profit: f64,
    /// Ratio of sums; 0 when there is no spend
    pub roi_percent: f64,
    /// Promotions whose spend came from FI documents
    pub actual_spend_count: usize,
    /// Promotions whose territory has no customer mapping
    pub unresolved_count: usize,
}

impl PortfolioSummary {
    pub fn from_analyses(promotions: &[PromotionAnalysis]) -> Self {
        let mut summary = Self {
            promotion_count: promotions.len(),
            ..Default::default()
        };
        for promotion in promotions {
            summary.total_spend += promotion.final_spend;
            summary.total_gross_margin += promotion.gross_margin;
            summary.total_net_profit += promotion.net_profit;
            if promotion.spend_source == SpendSource::Actual {
                summary.actual_spend_count += 1;
            }
            if !promotion.customer_resolved {
                summary.unresolved_count += 1;
            }
        }
        summary.roi_percent = pooled_roi_percent(summary.total_gross_margin, summary.total_spend);
        summary
    }
}

/// Sums over a drill-down's line items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrillDownTotals {
    pub incremental_units: f64,
    pub gross_margin: f64,
    pub revenue: f64,
    pub spend: f64,
}

impl DrillDownTotals {
    pub fn from_drill_down(drill_down: &PromotionDrillDown) -> Self {
        let mut totals = Self::default();
        for row in &drill_down.sales_rows {
            totals.incremental_units += row.incremental_units;
            totals.gross_margin += row.gross_margin;
            totals.revenue += row.revenue;
        }
        totals.spend = drill_down.spend_rows.iter().map(|r| r.amount).sum();
        totals
    }
}

/// Everything the ROI report shows for one filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiReport {
    /// e.g. `Year: 2024 | West` or `All Data`
    pub filter_label: String,
    pub summary: PortfolioSummary,
    pub top_promotions: Vec<PromotionAnalysis>,
    pub promotions: Vec<PromotionAnalysis>,
    pub customer_stats: Vec<CustomerRoiStats>,
}

impl RoiReport {
    pub fn new(filter: &RoiFilter, result: RoiResult, top_n: usize) -> Self {
        Self {
            filter_label: filter.to_string(),
            summary: PortfolioSummary::from_analyses(&result.promotions),
            top_promotions: top_promotions(&result.promotions, top_n),
            promotions: result.promotions,
            customer_stats: result.customer_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SalesDrillDownRow, SpendDrillDownRow};
    use crate::roi::PriceBasis;
    use chrono::NaiveDate;

    fn analysis(
        id: &str,
        roi: f64,
        spend: f64,
        margin: f64,
        source: SpendSource,
    ) -> PromotionAnalysis {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PromotionAnalysis {
            promotion_id: id.to_string(),
            promotion_name: id.to_string(),
            territory_id: String::new(),
            customer_name: "acme".to_string(),
            customer_resolved: id != "PX",
            start_date: day,
            end_date: day,
            planned_spend: spend,
            actual_spend: 0.0,
            final_spend: spend,
            spend_source: source,
            incremental_units: 0.0,
            incremental_revenue: 0.0,
            baseline_units: 0.0,
            gross_margin: margin,
            net_profit: margin - spend,
            roi_percent: roi,
            roi_value: margin - spend,
            mapped_product_count: 0,
        }
    }

    #[test]
    fn test_top_promotions_stable_descending() {
        let promotions = vec![
            analysis("P1", 10.0, 0.0, 0.0, SpendSource::Planned),
            analysis("P2", 50.0, 0.0, 0.0, SpendSource::Planned),
            analysis("P3", 10.0, 0.0, 0.0, SpendSource::Planned),
            analysis("P4", -5.0, 0.0, 0.0, SpendSource::Planned),
        ];
        let top = top_promotions(&promotions, 3);
        let ids: Vec<&str> = top.iter().map(|p| p.promotion_id.as_str()).collect();
        assert_eq!(ids, vec!["P2", "P1", "P3"]);
        assert!(top_promotions(&[], 10).is_empty());
    }

    #[test]
    fn test_portfolio_summary() {
        let promotions = vec![
            analysis("P1", 0.0, 100.0, 150.0, SpendSource::Actual),
            analysis("PX", 0.0, 100.0, 250.0, SpendSource::Planned),
        ];
        let summary = PortfolioSummary::from_analyses(&promotions);
        assert_eq!(summary.promotion_count, 2);
        assert_eq!(summary.total_spend, 200.0);
        assert_eq!(summary.total_gross_margin, 400.0);
        assert_eq!(summary.total_net_profit, 200.0);
        assert_eq!(summary.roi_percent, 100.0);
        assert_eq!(summary.actual_spend_count, 1);
        assert_eq!(summary.unresolved_count, 1);

        assert_eq!(PortfolioSummary::from_analyses(&[]).roi_percent, 0.0);
    }

    #[test]
    fn test_drill_down_totals() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let drill = PromotionDrillDown {
            promotion_id: "P1".to_string(),
            sales_rows: vec![SalesDrillDownRow {
                date: day,
                customer: "Acme".to_string(),
                upc: "100".to_string(),
                incremental_units: 10.0,
                unit_price: 5.0,
                revenue: 50.0,
                gross_margin: 60.0,
                matched_material: Some("200".to_string()),
                price_basis: PriceBasis::ListPrice,
            }],
            spend_rows: vec![
                SpendDrillDownRow {
                    document_id: None,
                    date: None,
                    material: String::new(),
                    gl_account: String::new(),
                    description: String::new(),
                    amount: 12.5,
                },
                SpendDrillDownRow {
                    document_id: Some("1".to_string()),
                    date: Some(day),
                    material: "200".to_string(),
                    gl_account: String::new(),
                    description: String::new(),
                    amount: 7.5,
                },
            ],
        };
        let totals = DrillDownTotals::from_drill_down(&drill);
        assert_eq!(totals.incremental_units, 10.0);
        assert_eq!(totals.gross_margin, 60.0);
        assert_eq!(totals.revenue, 50.0);
        assert_eq!(totals.spend, 20.0);
    }

    #[test]
    fn test_report_label_and_top_n() {
        let result = RoiResult {
            promotions: vec![
                analysis("P1", 5.0, 10.0, 10.5, SpendSource::Planned),
                analysis("P2", 20.0, 10.0, 12.0, SpendSource::Planned),
            ],
            customer_stats: Vec::new(),
        };
        let report = RoiReport::new(&RoiFilter::all().with_year("2024"), result, 1);
        assert_eq!(report.filter_label, "Year: 2024");
        assert_eq!(report.top_promotions.len(), 1);
        assert_eq!(report.top_promotions[0].promotion_id, "P2");
        assert_eq!(report.promotions.len(), 2);
    }
}
