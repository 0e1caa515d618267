//! Per-customer roll-up of promotion results

use std::collections::HashMap;

use crate::models::{CustomerRoiStats, PromotionAnalysis};

use super::policy::pooled_roi_percent;

/// Roll promotions up per resolved customer, in first-seen order
///
/// Unresolved promotions are left out. The customer ROI is recomputed from
/// the summed margin and spend, never averaged from per-promotion percentages.
pub fn aggregate_customers(promotions: &[PromotionAnalysis]) -> Vec<CustomerRoiStats> {
    let mut stats: Vec<CustomerRoiStats> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for promotion in promotions.iter().filter(|p| p.customer_resolved) {
        let position = *positions
            .entry(promotion.customer_name.as_str())
            .or_insert_with(|| {
                stats.push(CustomerRoiStats {
                    customer_name: promotion.customer_name.clone(),
                    total_spend: 0.0,
                    total_gross_margin: 0.0,
                    promotion_count: 0,
                    avg_roi_percent: 0.0,
                });
                stats.len() - 1
            });

        let entry = &mut stats[position];
        entry.total_spend += promotion.final_spend;
        entry.total_gross_margin += promotion.gross_margin;
        entry.promotion_count += 1;
    }

    for entry in &mut stats {
        entry.avg_roi_percent = pooled_roi_percent(entry.total_gross_margin, entry.total_spend);
    }

    stats
}
