//! Workbook status command

use std::path::Path;

use anyhow::Result;
use uplift_core::{config::default_config_path, load::table_path, TableKind, UpliftConfig};

use super::open_workbook;

pub fn cmd_status(data_dir: &Path, config_path: Option<&Path>, config: &UpliftConfig) -> Result<()> {
    println!();
    println!("📊 Uplift Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Workbook: {}", data_dir.display());

    let config_source = config_path
        .filter(|p| p.exists())
        .map(Path::to_path_buf)
        .or_else(|| default_config_path().filter(|p| p.exists()));
    match config_source {
        Some(path) => println!("   Config: {}", path.display()),
        None => println!("   Config: built-in defaults"),
    }

    if !data_dir.is_dir() {
        println!();
        println!("   ❌ Workbook directory not found");
        println!("      Pass --data with a directory of exported tables");
        println!();
        return Ok(());
    }

    let workbook = match open_workbook(data_dir, config) {
        Ok(workbook) => workbook,
        Err(e) => {
            println!();
            println!("   ❌ Error loading workbook: {:#}", e);
            println!();
            return Ok(());
        }
    };

    println!();
    println!("   {:20} │ {:>8} │ {}", "Table", "Rows", "File");
    println!("   ─────────────────────┼──────────┼──────────────────────");
    for table in TableKind::ALL {
        let file = table_path(data_dir, &config.tables, table)
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:20} │ {:>8} │ {}",
            table.as_str(),
            workbook.row_count(table),
            file
        );
    }

    println!();
    if workbook.is_ready_for_analysis() {
        println!("   ✅ Ready for analysis");
    } else {
        println!("   ⚠️  Sales and promotions are both required before ROI can be calculated");
    }
    println!();

    Ok(())
}
