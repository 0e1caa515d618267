//! Workbook status handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use uplift_core::models::TableStatus;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Sales and promotions are both loaded
    pub ready: bool,
    pub tables: Vec<TableStatus>,
}

/// GET /api/status - Row counts per table and analysis readiness
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let workbook = state.workbook.read().await;
    Json(StatusResponse {
        ready: workbook.is_ready_for_analysis(),
        tables: workbook.table_counts(),
    })
}
