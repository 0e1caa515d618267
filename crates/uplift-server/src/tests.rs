//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uplift_core::test_utils::{sample_workbook, scenario_workbook};

fn setup_test_app() -> Router {
    create_router(sample_workbook(), ServerConfig::default())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn put_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn promotion_ids(report: &serde_json::Value) -> Vec<String> {
    report["promotions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["promotion_id"].as_str().unwrap().to_string())
        .collect()
}

// ========== Status API Tests ==========

#[tokio::test]
async fn test_status() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["ready"], true);
    let tables = json["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 8);
    assert_eq!(tables[0]["table"], "sales");
    assert_eq!(tables[0]["rows"], 3);
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/status")).await.unwrap();
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}

// ========== ROI API Tests ==========

#[tokio::test]
async fn test_roi_report() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/roi")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["filter_label"], "All Data");
    assert_eq!(promotion_ids(&json), vec!["P1", "P2", "P4"]);
    assert_eq!(json["summary"]["promotion_count"], 3);
    assert_eq!(json["summary"]["unresolved_count"], 1);

    let p1 = &json["promotions"][0];
    assert_eq!(p1["roi_percent"], 200.0);
    assert_eq!(p1["spend_source"], "actual");
    assert_eq!(p1["start_date"], "2024-01-01");

    let customers = json["customer_stats"].as_array().unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0]["customer_name"], "acme");
}

#[tokio::test]
async fn test_roi_report_filters() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(get("/api/roi?year=2023"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["filter_label"], "Year: 2023");
    assert_eq!(promotion_ids(&json), vec!["P2"]);

    let response = app
        .clone()
        .oneshot(get("/api/roi?hier2=West&hier3=all"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["filter_label"], "West");
    assert_eq!(promotion_ids(&json), vec!["P1"]);

    let response = app.oneshot(get("/api/roi?year=all&hier2=")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(promotion_ids(&json).len(), 3);
}

#[tokio::test]
async fn test_roi_report_top_n() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/roi?top=1")).await.unwrap();
    let json = get_body_json(response).await;
    let top = json["top_promotions"].as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["promotion_id"], "P1");
}

#[tokio::test]
async fn test_roi_report_rejects_huge_top() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/roi?top=5000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("top"));
}

#[tokio::test]
async fn test_roi_report_uses_default_year() {
    let config = ServerConfig {
        default_year: "2023".to_string(),
        ..Default::default()
    };
    let app = create_router(sample_workbook(), config);

    let response = app.clone().oneshot(get("/api/roi")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(promotion_ids(&json), vec!["P2"]);

    // An explicit year overrides the default
    let response = app.oneshot(get("/api/roi?year=2024")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(promotion_ids(&json), vec!["P1", "P4"]);
}

#[tokio::test]
async fn test_roi_report_empty_workbook() {
    let app = create_router(Workbook::new(), ServerConfig::default());

    let response = app.oneshot(get("/api/roi")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json["promotions"].as_array().unwrap().is_empty());
    assert_eq!(json["summary"]["roi_percent"], 0.0);
}

// ========== Drill-down API Tests ==========

#[tokio::test]
async fn test_drill_down() {
    let app = setup_test_app();

    let response = app
        .oneshot(get("/api/roi/promotions/P1/drilldown"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["promotion_id"], "P1");
    let sales = json["sales_rows"].as_array().unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0]["matched_material"], "200");
    assert_eq!(sales[0]["price_basis"], "list_price");

    let spend = json["spend_rows"].as_array().unwrap();
    assert_eq!(spend.len(), 1);
    assert_eq!(spend[0]["document_id"], "4900001");

    assert_eq!(json["totals"]["gross_margin"], 60.0);
    assert_eq!(json["totals"]["spend"], 20.0);
}

#[tokio::test]
async fn test_drill_down_edlp_is_empty() {
    let app = setup_test_app();

    let response = app
        .oneshot(get("/api/roi/promotions/P3/drilldown"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json["sales_rows"].as_array().unwrap().is_empty());
    assert!(json["spend_rows"].as_array().unwrap().is_empty());
    assert_eq!(json["totals"]["spend"], 0.0);
}

#[tokio::test]
async fn test_drill_down_unknown_id_is_empty_not_404() {
    let app = setup_test_app();

    let response = app
        .oneshot(get("/api/roi/promotions/NOPE/drilldown"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["promotion_id"], "NOPE");
    assert!(json["sales_rows"].as_array().unwrap().is_empty());
    assert!(json["spend_rows"].as_array().unwrap().is_empty());
}

// ========== Hierarchy / Years API Tests ==========

#[tokio::test]
async fn test_hierarchy() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/hierarchy")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["level2"], serde_json::json!(["East", "West"]));
    assert_eq!(json["level2_to_level3"]["West"], serde_json::json!(["Grocery"]));
    assert_eq!(json["level3_to_level4"]["Club"], serde_json::json!(["Warehouse"]));
}

#[tokio::test]
async fn test_years() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/years")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json, serde_json::json!(["2024", "2023"]));
}

// ========== Table API Tests ==========

#[tokio::test]
async fn test_replace_table_changes_results() {
    let app = create_router(scenario_workbook(), ServerConfig::default());

    // Drop the FI document: spend falls back to the planned 50
    let response = app
        .clone()
        .oneshot(put_json("/api/tables/fi", serde_json::json!([])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["table"], "fi");
    assert_eq!(json["rows"], 0);

    let response = app.oneshot(get("/api/roi")).await.unwrap();
    let json = get_body_json(response).await;
    let p1 = &json["promotions"][0];
    assert_eq!(p1["spend_source"], "planned");
    assert_eq!(p1["final_spend"], 50.0);
    assert_eq!(p1["roi_percent"], 20.0);
}

#[tokio::test]
async fn test_replace_mapping_table_reads_candidate_keys() {
    let mut workbook = scenario_workbook();
    workbook.customer_mappings.clear();
    let app = create_router(workbook, ServerConfig::default());

    let response = app.clone().oneshot(get("/api/roi")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["promotions"][0]["customer_resolved"], false);

    let body = serde_json::json!([
        {"Territory ID": "T1", "Territory Name": "North", "Nielsen Customer": "Acme"}
    ]);
    let response = app
        .clone()
        .oneshot(put_json("/api/tables/customer-mappings", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["rows"], 1);

    let response = app.oneshot(get("/api/roi")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["promotions"][0]["customer_name"], "acme");
    assert_eq!(json["promotions"][0]["roi_percent"], 200.0);
}

#[tokio::test]
async fn test_replace_unknown_table() {
    let app = setup_test_app();

    let response = app
        .oneshot(put_json("/api/tables/budgets", serde_json::json!([])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Unknown table: budgets");
}

#[tokio::test]
async fn test_replace_table_rejects_non_array() {
    let app = setup_test_app();

    let response = app
        .oneshot(put_json("/api/tables/sales", serde_json::json!({"UPC": 1})))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_clear_table() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/tables/sales")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/status")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["ready"], false);
    assert_eq!(json["tables"][0]["rows"], 0);
}

#[tokio::test]
async fn test_body_limit() {
    let config = ServerConfig {
        max_upload_bytes: 64,
        ..Default::default()
    };
    let app = create_router(sample_workbook(), config);

    let rows: Vec<serde_json::Value> = (0..20)
        .map(|i| serde_json::json!({"Customer": "Acme", "UPC": i}))
        .collect();
    let response = app
        .oneshot(put_json("/api/tables/sales", serde_json::Value::Array(rows)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
