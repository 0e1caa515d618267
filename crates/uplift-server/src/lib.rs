//! Uplift Web Server
//!
//! Axum-based REST API over an in-memory workbook. Tables are replaced
//! wholesale with `PUT /api/tables/:table`; every ROI endpoint recomputes
//! from the current workbook.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Request body size limit
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use tokio::sync::RwLock;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use uplift_core::{UpliftConfig, Workbook};

mod handlers;

/// Largest `top` a report request may ask for
pub const MAX_TOP_N: usize = 1000;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
    /// Top-promotions list size when a request does not set `top`
    pub top_n: usize,
    /// Year filter when a request does not set `year`
    pub default_year: String,
}

impl ServerConfig {
    pub fn from_config(config: &UpliftConfig) -> Self {
        Self {
            allowed_origins: vec![],
            max_upload_bytes: config.server.max_upload_bytes,
            top_n: config.report.top_n,
            default_year: config.report.default_year.clone(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_config(&UpliftConfig::default())
    }
}

/// Shared application state
pub struct AppState {
    pub workbook: RwLock<Workbook>,
    pub config: ServerConfig,
}

/// Create the application router
pub fn create_router(workbook: Workbook, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        workbook: RwLock::new(workbook),
        config: config.clone(),
    });

    let api_routes = Router::new()
        .route("/status", get(handlers::get_status))
        .route(
            "/tables/:table",
            put(handlers::replace_table).delete(handlers::clear_table),
        )
        .route("/roi", get(handlers::get_roi_report))
        .route(
            "/roi/promotions/:id/drilldown",
            get(handlers::get_promotion_drill_down),
        )
        .route("/hierarchy", get(handlers::get_hierarchy))
        .route("/years", get(handlers::get_years));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server with a preloaded workbook
pub async fn serve(
    workbook: Workbook,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !workbook.is_ready_for_analysis() {
        warn!("⚠️  Workbook has no sales or promotions yet; ROI results will be empty until both are uploaded");
    }

    let app = create_router(workbook, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
