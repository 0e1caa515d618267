//! ROI report and drill-down command implementations

use anyhow::Result;
use uplift_core::{
    calculate_roi, promotion_drill_down, DrillDownTotals, PromotionAnalysis, RoiFilter,
    RoiReport, SpendSource, Workbook,
};

use super::{money, truncate};

/// Run the engine and assemble the report for one filter
pub fn build_roi_report(workbook: &Workbook, filter: &RoiFilter, top_n: usize) -> RoiReport {
    RoiReport::new(filter, calculate_roi(workbook, filter), top_n)
}

pub fn cmd_roi(workbook: &Workbook, filter: &RoiFilter, top_n: usize, json: bool) -> Result<()> {
    let report = build_roi_report(workbook, filter, top_n);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !workbook.is_ready_for_analysis() {
        println!("⚠️  Sales and promotions tables are both required. Run 'uplift status' to see what is loaded.");
        return Ok(());
    }

    let summary = &report.summary;
    println!();
    println!("📊 Promotion ROI");
    println!("   Filter: {}", report.filter_label);
    println!("   ─────────────────────────────────────────────────────────────");

    if report.promotions.is_empty() {
        println!("   No promotions match this filter.");
        return Ok(());
    }

    println!("   Promotions:    {}", summary.promotion_count);
    println!("   Total spend:   {}", money(summary.total_spend));
    println!("   Gross margin:  {}", money(summary.total_gross_margin));
    println!("   Net profit:    {}", money(summary.total_net_profit));
    println!("   Portfolio ROI: {:.1}%", summary.roi_percent);
    println!(
        "   Spend source:  {} actual (FI), {} planned",
        summary.actual_spend_count,
        summary.promotion_count - summary.actual_spend_count
    );
    if summary.unresolved_count > 0 {
        println!(
            "   ⚠️  {} promotion(s) have no customer mapping for their territory",
            summary.unresolved_count
        );
    }

    println!();
    println!("🏆 Top {} Promotions", report.top_promotions.len());
    print_promotion_table(&report.top_promotions);

    println!();
    println!("🏪 Customers");
    if report.customer_stats.is_empty() {
        println!("   No promotions resolved to a customer.");
    } else {
        println!(
            "   {:24} │ {:>6} │ {:>12} │ {:>12} │ {:>8}",
            "Customer", "Promos", "Spend", "Margin", "ROI"
        );
        println!("   ─────────────────────────┼────────┼──────────────┼──────────────┼─────────");
        for stats in &report.customer_stats {
            println!(
                "   {:24} │ {:>6} │ {:>12} │ {:>12} │ {:>7.1}%",
                truncate(&stats.customer_name, 24),
                stats.promotion_count,
                money(stats.total_spend),
                money(stats.total_gross_margin),
                stats.avg_roi_percent
            );
        }
    }

    Ok(())
}

fn print_promotion_table(promotions: &[PromotionAnalysis]) {
    println!(
        "   {:10} │ {:22} │ {:16} │ {:>12} │ {:>12} │ {:>8}",
        "ID", "Promotion", "Customer", "Spend", "Margin", "ROI"
    );
    println!(
        "   ───────────┼────────────────────────┼──────────────────┼──────────────┼──────────────┼─────────"
    );
    for p in promotions {
        let source_mark = match p.spend_source {
            SpendSource::Actual => "",
            SpendSource::Planned => "*",
        };
        println!(
            "   {:10} │ {:22} │ {:16} │ {:>12} │ {:>12} │ {:>7.1}%",
            truncate(&p.promotion_id, 10),
            truncate(&p.promotion_name, 22),
            truncate(&p.customer_name, 16),
            format!("{}{}", money(p.final_spend), source_mark),
            money(p.gross_margin),
            p.roi_percent
        );
    }
    if promotions
        .iter()
        .any(|p| p.spend_source == SpendSource::Planned)
    {
        println!("   * planned spend (no FI documents posted)");
    }
}

pub fn cmd_drilldown(workbook: &Workbook, promotion_id: &str, json: bool) -> Result<()> {
    let drill_down = promotion_drill_down(workbook, promotion_id);
    let totals = DrillDownTotals::from_drill_down(&drill_down);

    if json {
        let value = serde_json::json!({
            "promotion_id": drill_down.promotion_id,
            "sales_rows": drill_down.sales_rows,
            "spend_rows": drill_down.spend_rows,
            "totals": totals,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("🔎 Promotion {}", promotion_id);
    println!("   ─────────────────────────────────────────────────────────────");

    if drill_down.sales_rows.is_empty() && drill_down.spend_rows.is_empty() {
        println!("   No line items found for this promotion.");
        return Ok(());
    }

    println!();
    println!("   🛒 Sales ({} rows)", drill_down.sales_rows.len());
    if !drill_down.sales_rows.is_empty() {
        println!(
            "   {:10} │ {:14} │ {:>10} │ {:>10} │ {:>12} │ {:10}",
            "Date", "UPC", "Inc Units", "Unit Price", "Margin", "Material"
        );
        println!("   ───────────┼────────────────┼────────────┼────────────┼──────────────┼───────────");
        for row in &drill_down.sales_rows {
            println!(
                "   {:10} │ {:14} │ {:>10.1} │ {:>10.2} │ {:>12} │ {:10}",
                row.date,
                truncate(&row.upc, 14),
                row.incremental_units,
                row.unit_price,
                money(row.gross_margin),
                row.matched_material.as_deref().unwrap_or("-")
            );
        }
    }

    println!();
    println!("   💸 Spend ({} documents)", drill_down.spend_rows.len());
    for row in &drill_down.spend_rows {
        let date = row
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:12} │ {:10} │ {:10} │ {:>12} │ {}",
            row.document_id.as_deref().unwrap_or("-"),
            date,
            truncate(&row.material, 10),
            money(row.amount),
            truncate(&row.description, 30)
        );
    }

    println!();
    println!("   Incremental units: {:.1}", totals.incremental_units);
    println!("   Revenue:           {}", money(totals.revenue));
    println!("   Gross margin:      {}", money(totals.gross_margin));
    println!("   Actual spend:      {}", money(totals.spend));

    Ok(())
}
