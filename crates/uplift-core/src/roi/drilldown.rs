//! Line items behind one promotion's ROI figures

use tracing::debug;

use crate::fields;
use crate::models::{PromotionDrillDown, Record, SalesDrillDownRow, SpendDrillDownRow, Workbook};
use crate::normalize::{cell_text, field, parse_amount, parse_date};

use super::calculator::promotion_window;
use super::grouping::group_promotions;
use super::index::LookupIndex;
use super::matching::{PromotionScope, SalesTable};

/// Emit the sales and spend rows the calculator used for `promotion_id`
///
/// Sales rows go through the same grouping, scope and pricing as
/// [`super::calculate_roi`], so their margins sum to the promotion's gross
/// margin. Year and hierarchy filters do not apply here. Spend rows are every
/// FI document carrying the id. EDLP promotions yield nothing.
pub fn promotion_drill_down(workbook: &Workbook, promotion_id: &str) -> PromotionDrillDown {
    let mut result = PromotionDrillDown {
        promotion_id: promotion_id.to_string(),
        ..Default::default()
    };
    if !workbook.is_ready_for_analysis() {
        return result;
    }

    let grouped = group_promotions(&workbook.promotions);
    if grouped.is_excluded(promotion_id) {
        debug!(promotion = promotion_id, "Drill-down on excluded tactic");
        return result;
    }

    let index = LookupIndex::build(workbook);

    if let Some(group) = grouped.get(promotion_id) {
        let territory_id = cell_text(field(group.header, fields::TERRITORY_ID));
        let customer = index.customer_for_territory(&territory_id);

        if let (Some(customer), Some((start, end))) = (customer, promotion_window(group.header)) {
            let scope = PromotionScope::new(group, Some(customer), start, end, &index);
            let sales = SalesTable::new(&workbook.sales);

            for line in scope.matched_lines(&sales) {
                let margin = scope.price_line(line, &index);
                result.sales_rows.push(SalesDrillDownRow {
                    date: line.date,
                    customer: line.customer.clone(),
                    upc: line.upc.clone(),
                    incremental_units: line.incremental_units,
                    unit_price: line.unit_price,
                    revenue: line.incremental_units * line.unit_price,
                    gross_margin: margin.gross_margin,
                    matched_material: margin.material,
                    price_basis: margin.economics.basis,
                });
            }
        }
    }

    result.spend_rows = workbook
        .financial_documents
        .iter()
        .filter(|row| cell_text(field(row, fields::FI_PROMOTION_ID)) == promotion_id)
        .map(spend_row)
        .collect();

    debug!(
        promotion = promotion_id,
        sales_rows = result.sales_rows.len(),
        spend_rows = result.spend_rows.len(),
        "Drill-down extracted"
    );

    result
}

fn spend_row(row: &Record) -> SpendDrillDownRow {
    let document = cell_text(field(row, fields::FI_DOCUMENT));
    SpendDrillDownRow {
        document_id: (!document.is_empty()).then_some(document),
        date: parse_date(field(row, fields::FI_DATE)),
        material: cell_text(field(row, fields::FI_MATERIAL)),
        gl_account: cell_text(field(row, fields::FI_GL_ACCOUNT)),
        description: cell_text(field(row, fields::FI_DESCRIPTION)),
        amount: parse_amount(field(row, fields::FI_AMOUNT)),
    }
}
