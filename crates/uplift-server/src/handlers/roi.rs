//! ROI report handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, MAX_TOP_N};
use uplift_core::{
    available_years, calculate_roi, hierarchy_tree, promotion_drill_down, DrillDownTotals,
    HierarchyTree, PromotionDrillDown, RoiFilter, RoiReport,
};

/// Query parameters for the ROI report
///
/// Blank or `all` selections leave that filter unset.
#[derive(Debug, Deserialize)]
pub struct RoiQuery {
    pub year: Option<String>,
    pub hier2: Option<String>,
    pub hier3: Option<String>,
    pub hier4: Option<String>,
    /// Size of the top-promotions list
    pub top: Option<usize>,
}

/// GET /api/roi - Promotion ROI, customer roll-up and portfolio summary
pub async fn get_roi_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RoiQuery>,
) -> Result<Json<RoiReport>, AppError> {
    let top_n = params.top.unwrap_or(state.config.top_n);
    if top_n > MAX_TOP_N {
        return Err(AppError::bad_request(&format!(
            "top must be at most {}",
            MAX_TOP_N
        )));
    }

    let year = params
        .year
        .as_deref()
        .unwrap_or(state.config.default_year.as_str());
    let filter = RoiFilter::from_parts(
        Some(year),
        params.hier2.as_deref(),
        params.hier3.as_deref(),
        params.hier4.as_deref(),
    );

    let workbook = state.workbook.read().await;
    let result = calculate_roi(&workbook, &filter);

    Ok(Json(RoiReport::new(&filter, result, top_n)))
}

#[derive(Debug, Serialize)]
pub struct DrillDownResponse {
    #[serde(flatten)]
    pub drill_down: PromotionDrillDown,
    pub totals: DrillDownTotals,
}

/// GET /api/roi/promotions/:id/drilldown - Sales and spend line items
pub async fn get_promotion_drill_down(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DrillDownResponse>, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::bad_request("Promotion id is required"));
    }

    let workbook = state.workbook.read().await;
    let drill_down = promotion_drill_down(&workbook, id);
    let totals = DrillDownTotals::from_drill_down(&drill_down);

    Ok(Json(DrillDownResponse { drill_down, totals }))
}

/// GET /api/hierarchy - Level 2 / 3 / 4 names for cascading filters
pub async fn get_hierarchy(State(state): State<Arc<AppState>>) -> Json<HierarchyTree> {
    let workbook = state.workbook.read().await;
    Json(hierarchy_tree(&workbook.hierarchy))
}

/// GET /api/years - Promotion start years, newest first
pub async fn get_years(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let workbook = state.workbook.read().await;
    Json(available_years(&workbook.promotions))
}
