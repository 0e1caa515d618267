//! Table upload handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{AppError, AppState};
use uplift_core::{Record, TableKind};

#[derive(Debug, Serialize)]
pub struct TableUpdateResponse {
    pub table: TableKind,
    pub rows: usize,
}

fn parse_table(table: &str) -> Result<TableKind, AppError> {
    table
        .parse()
        .map_err(|e: uplift_core::Error| AppError::bad_request(&e.to_string()))
}

/// PUT /api/tables/:table - Replace a table with a JSON array of records
///
/// Mapping tables take the same record shape and are read through their
/// candidate keys (`TerritoryID`, `NielsenCustomer`, `MATNR`, ...).
pub async fn replace_table(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Json(records): Json<Vec<Record>>,
) -> Result<Json<TableUpdateResponse>, AppError> {
    let table = parse_table(&table)?;
    let rows = records.len();

    state.workbook.write().await.replace_table(table, records);
    info!(table = %table, rows, "Table replaced");

    Ok(Json(TableUpdateResponse { table, rows }))
}

/// DELETE /api/tables/:table - Empty a table
pub async fn clear_table(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Json<TableUpdateResponse>, AppError> {
    let table = parse_table(&table)?;

    state.workbook.write().await.clear_table(table);
    info!(table = %table, "Table cleared");

    Ok(Json(TableUpdateResponse { table, rows: 0 }))
}
