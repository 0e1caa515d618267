//! Test utilities for uplift-core
//!
//! Fixture workbooks with hand-checked ROI figures, shared by the core,
//! CLI and server test suites.

use std::fs::File;
use std::path::Path;

use crate::error::Result;
use crate::models::{CustomerMapping, MaterialMapping, Record, TableKind, Workbook};

fn promotion(
    id: &str,
    territory: &str,
    tactic: &str,
    product: &str,
    start: &str,
    end: &str,
    planned_spend: &str,
) -> Record {
    let name = format!("Promotion {}", id);
    Record::from_pairs([
        ("PromotionID", id),
        ("PromotionName", name.as_str()),
        ("TerritoryID", territory),
        ("Tactic", tactic),
        ("ProductID", product),
        ("Planned_Start", start),
        ("Planned_Finish", end),
        ("Planned_Spend", planned_spend),
    ])
}

fn sale(customer: &str, date: &str, upc: &str, incremental: &str, price: &str) -> Record {
    Record::from_pairs([
        ("Customer", customer),
        ("Date", date),
        ("UPC", upc),
        ("Incremental U Vol", incremental),
        ("Baseline U Vol", "100"),
        ("Avg Sgl Unit Price", price),
    ])
}

fn fi_document(promotion_id: &str, document: &str, material: &str, amount: &str) -> Record {
    Record::from_pairs([
        ("PromotionID", promotion_id),
        ("FIDOCUMENT", document),
        ("Date", "2024-02-15"),
        ("MATERIAL", material),
        ("GL_ACCOUNT", "610000"),
        ("Desc", "Trade spend"),
        ("AMOUNT", amount),
    ])
}

fn master(material: &str, key: &str, value: &str) -> Record {
    Record::from_pairs([("MATNR", material), (key, value)])
}

/// Promotion P1 for Acme: margin (8 - 2) x 10 = 60, FI spend 20, ROI 200%
pub fn scenario_workbook() -> Workbook {
    let mut workbook = Workbook::new();
    workbook.promotions = vec![promotion(
        "P1",
        "T1",
        "Display",
        "200",
        "2024-01-01",
        "2024-01-31",
        "50",
    )];
    workbook.sales = vec![sale("Acme", "2024-01-15", "100", "10", "5")];
    workbook.financial_documents = vec![fi_document("P1", "4900001", "200", "20")];
    workbook.costs = vec![master("200", "COGS", "2")];
    workbook.prices = vec![master("200", "LISTPRICE", "8")];
    workbook.customer_mappings = vec![CustomerMapping::new("T1", "North", "Acme")];
    workbook.material_mappings = vec![MaterialMapping::new("200", "100", "1")];
    workbook
}

/// [`scenario_workbook`] without FI documents and with zero planned spend:
/// spend 0, margin 60, ROI exactly 100%
pub fn zero_spend_workbook() -> Workbook {
    let mut workbook = scenario_workbook();
    workbook.financial_documents.clear();
    workbook.promotions[0].insert("Planned_Spend", "0");
    workbook
}

/// A small portfolio over two customers and two hierarchy branches
///
/// | Promotion | Customer | Hierarchy | Year | Margin | Spend | ROI |
/// |---|---|---|---|---|---|---|
/// | P1 | acme | West | 2024 | 60 | 20 (FI) | 200 |
/// | P2 | globex | East | 2023 | 100 | 100 (planned) | 0 |
/// | P3 | acme | - | 2024 | EDLP, excluded | | |
/// | P4 | unresolved | - | 2024 | 0 | 30 (planned) | -100 |
pub fn sample_workbook() -> Workbook {
    let mut workbook = scenario_workbook();
    workbook.promotions.extend([
        promotion("P2", "T2", "Feature", "300", "2023-06-01", "2023-06-30", "100"),
        promotion("P3", "T1", "EDLP", "200", "2024-01-01", "2024-12-31", "10"),
        promotion("P4", "T9", "Display", "", "2024-02-01", "2024-02-28", "30"),
    ]);
    workbook.sales.extend([
        sale("Globex", "2023-06-10", "300", "20", "10"),
        // Outside P2's window
        sale("Globex", "2023-07-10", "300", "50", "10"),
    ]);
    workbook.costs.push(master("300", "COGS", "7"));
    workbook.prices.push(master("300", "LISTPRICE", "12"));
    workbook
        .customer_mappings
        .push(CustomerMapping::new("T2", "South", "Globex"));
    workbook
        .material_mappings
        .push(MaterialMapping::new("300", "300", "1"));
    workbook.hierarchy = vec![
        Record::from_pairs([
            ("Hier2Name", "West"),
            ("Hier3Name", "Grocery"),
            ("Hier4Name", "Chains"),
            ("Hier6", "T1"),
            ("Hier6Name", "Acme"),
        ]),
        Record::from_pairs([
            ("Hier2Name", "East"),
            ("Hier3Name", "Club"),
            ("Hier4Name", "Warehouse"),
            ("Hier6", "T2"),
            ("Hier6Name", "Globex"),
        ]),
    ];
    workbook
}

/// Write every table of `workbook` as JSON under `dir`, named with the
/// default file stems
pub fn write_workbook_dir(dir: &Path, workbook: &Workbook) -> Result<()> {
    for table in TableKind::ALL {
        let stem = table.as_str().replace('-', "_");
        let path = dir.join(format!("{}.json", stem));
        let file = File::create(&path)?;
        match table {
            TableKind::Sales => serde_json::to_writer(file, &workbook.sales)?,
            TableKind::Promotions => serde_json::to_writer(file, &workbook.promotions)?,
            TableKind::FinancialDocuments => {
                serde_json::to_writer(file, &workbook.financial_documents)?
            }
            TableKind::Costs => serde_json::to_writer(file, &workbook.costs)?,
            TableKind::Prices => serde_json::to_writer(file, &workbook.prices)?,
            TableKind::Hierarchy => serde_json::to_writer(file, &workbook.hierarchy)?,
            TableKind::CustomerMappings => {
                serde_json::to_writer(file, &workbook.customer_mappings)?
            }
            TableKind::MaterialMappings => {
                serde_json::to_writer(file, &workbook.material_mappings)?
            }
        }
    }
    Ok(())
}
