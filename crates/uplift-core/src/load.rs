//! Workbook loading from CSV / JSON table files

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::config::TablesConfig;
use crate::error::{Error, Result};
use crate::models::{CellValue, Record, TableKind, Workbook};

/// Read a CSV table with a header row into records
///
/// Headers are trimmed. Blank cells become [`CellValue::Empty`]; every other
/// cell is kept as text. Short rows simply lack the trailing columns.
pub fn read_csv_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut records = Vec::new();

    for result in rdr.records() {
        let row = result?;
        records.push(row_to_record(&headers, &row));
    }

    debug!("Parsed {} CSV records", records.len());
    Ok(records)
}

fn row_to_record(headers: &[String], row: &StringRecord) -> Record {
    let mut record = Record::new();
    for (header, value) in headers.iter().zip(row.iter()) {
        if header.is_empty() {
            continue;
        }
        let cell = if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        };
        record.insert(header.as_str(), cell);
    }
    record
}

/// Read a JSON array of objects into records
pub fn read_json_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let records: Vec<Record> = serde_json::from_reader(reader)?;
    debug!("Parsed {} JSON records", records.len());
    Ok(records)
}

/// Read one table file, choosing the parser by extension
pub fn read_table_file(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => read_csv_records(file),
        Some(ext) if ext.eq_ignore_ascii_case("json") => read_json_records(file),
        _ => Err(Error::InvalidData(format!(
            "Unsupported table file: {}",
            path.display()
        ))),
    }
}

/// Locate the file for a table: `<stem>.csv`, then `<stem>.json`
pub fn table_path(dir: &Path, tables: &TablesConfig, table: TableKind) -> Option<PathBuf> {
    let stem = tables.stem(table);
    ["csv", "json"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|path| path.is_file())
}

/// Load every table found in a workbook directory
///
/// Tables without a file are left empty.
pub fn load_workbook(dir: &Path, tables: &TablesConfig) -> Result<Workbook> {
    if !dir.is_dir() {
        return Err(Error::NotFound(format!(
            "Workbook directory {}",
            dir.display()
        )));
    }

    let mut workbook = Workbook::new();
    for table in TableKind::ALL {
        let Some(path) = table_path(dir, tables, table) else {
            debug!(table = %table, "No file for table");
            continue;
        };
        let records = read_table_file(&path)?;
        debug!(table = %table, path = %path.display(), rows = records.len(), "Table loaded");
        workbook.replace_table(table, records);
    }

    info!(
        dir = %dir.display(),
        sales = workbook.sales.len(),
        promotions = workbook.promotions.len(),
        "Workbook loaded"
    );

    Ok(workbook)
}
