//! Hierarchy and year listing commands

use anyhow::Result;
use uplift_core::{available_years, hierarchy_tree, Workbook};

pub fn cmd_hierarchy(workbook: &Workbook, json: bool) -> Result<()> {
    let tree = hierarchy_tree(&workbook.hierarchy);

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    if tree.level2.is_empty() {
        println!("No hierarchy loaded. Add a hierarchy table to the workbook directory.");
        return Ok(());
    }

    println!();
    println!("🌳 Customer Hierarchy");
    println!("   ─────────────────────────────");

    for level2 in &tree.level2 {
        println!("   {}", level2);
        let Some(level3s) = tree.level2_to_level3.get(level2) else {
            continue;
        };
        for level3 in level3s {
            println!("     └─ {}", level3);
            if let Some(level4s) = tree.level3_to_level4.get(level3) {
                for level4 in level4s {
                    println!("          └─ {}", level4);
                }
            }
        }
    }

    Ok(())
}

pub fn cmd_years(workbook: &Workbook) -> Result<()> {
    let years = available_years(&workbook.promotions);

    if years.is_empty() {
        println!("No dated promotions found.");
        return Ok(());
    }

    println!();
    println!("📅 Promotion Years");
    println!("   ─────────────────────────────");
    for year in years {
        println!("   {}", year);
    }

    Ok(())
}
