use axum::http::StatusCode;
use flipshare::api;
use flipshare::db::init_db;
use flipshare::orchestration::Orchestrator;
use flipshare::sinks::RecordingSink;
use flipshare::Repository;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    sink: RecordingSink,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let sink = RecordingSink::new();
    let orchestrator = Arc::new(Orchestrator::new(
        repo,
        Arc::new(sink.clone()),
        Arc::new(sink.clone()),
    ));
    let app = api::create_router(api::AppState::new(orchestrator));

    TestApp {
        app,
        sink,
        _temp: temp_dir,
    }
}

async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Creates investor, unit and an open transaction with two costs.
/// Returns (investor_id, unit_id, transaction_id).
async fn seed(app: &axum::Router) -> (String, String, String) {
    let (status, investor) = request(
        app,
        "POST",
        "/v1/investors",
        Some(json!({"name": "Budi Santoso", "profitSharePercentage": 40})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let investor_id = investor["id"].as_str().unwrap().to_string();

    let (status, unit) = request(
        app,
        "POST",
        "/v1/units",
        Some(json!({"investorId": investor_id, "name": "Honda Jazz 2018", "plateNumber": "B 1777 KZT"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(unit["status"], "AVAILABLE");
    let unit_id = unit["id"].as_str().unwrap().to_string();

    let (status, tx) = request(
        app,
        "POST",
        "/v1/transactions",
        Some(json!({"unitId": unit_id, "buyPrice": "150000000", "buyDate": "2024-01-10"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["status"], "ON_PROCESS");
    assert_eq!(tx["paymentStatus"], "UNPAID");
    let tx_id = tx["id"].as_str().unwrap().to_string();

    for (amount, payer) in [("2000000", "INVESTOR"), ("5000000", "MANAGER")] {
        let (status, _) = request(
            app,
            "POST",
            &format!("/v1/transactions/{}/costs", tx_id),
            Some(json!({"amount": amount, "payer": payer, "category": "repair"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    (investor_id, unit_id, tx_id)
}

#[tokio::test]
async fn test_health_endpoints() {
    let t = setup_test_app().await;
    let (status, body) = request(&t.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, body) = request(&t.app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_full_flip_over_http() {
    let t = setup_test_app().await;
    let (_, unit_id, tx_id) = seed(&t.app).await;

    let (status, sale) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/finalize", tx_id),
        Some(json!({"sellPrice": 180000000, "sellDate": "2024-03-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sale["transaction"]["status"], "COMPLETED");
    assert_eq!(sale["transaction"]["profitStatus"], "PROFIT");
    assert_eq!(sale["profitSharing"]["netMargin"], "23000000");
    assert_eq!(sale["profitSharing"]["investorProfitAmount"], "9200000");
    assert_eq!(sale["profitSharing"]["managerProfitAmount"], "13800000");

    let (_, unit) = request(&t.app, "GET", &format!("/v1/units/{}", unit_id), None).await;
    assert_eq!(unit["status"], "SOLD");
    assert_eq!(unit["transactions"].as_array().unwrap().len(), 1);

    let (status, paid) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/payments", tx_id),
        Some(json!({"amount": "4000000", "paymentDate": "2024-03-05", "method": "TRANSFER"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(paid["paymentStatus"], "PARTIAL");

    let (status, paid) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/payments", tx_id),
        Some(json!({"amount": "5199950", "paymentDate": "2024-03-06", "method": "CASH"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(paid["paymentStatus"], "PAID");

    let (status, detail) =
        request(&t.app, "GET", &format!("/v1/transactions/{}", tx_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["costTotals"]["totalCosts"], "7000000");
    assert_eq!(detail["capital"]["totalCapital"], "157000000");
    assert_eq!(detail["totalPaid"], "9199950");
    assert_eq!(detail["remaining"], "50");
    assert_eq!(detail["payments"].as_array().unwrap().len(), 2);

    assert_eq!(t.sink.notifications().len(), 3);
}

#[tokio::test]
async fn test_finalize_twice_returns_conflict() {
    let t = setup_test_app().await;
    let (_, _, tx_id) = seed(&t.app).await;
    let uri = format!("/v1/transactions/{}/finalize", tx_id);
    let body = json!({"sellPrice": "180000000", "sellDate": "2024-03-01"});

    let (status, _) = request(&t.app, "POST", &uri, Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, err) = request(&t.app, "POST", &uri, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"].as_str().unwrap().contains("already completed"));
}

#[tokio::test]
async fn test_finalize_without_sale_data_is_bad_request() {
    let t = setup_test_app().await;
    let (_, unit_id, tx_id) = seed(&t.app).await;

    let (status, err) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/finalize", tx_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("sell price"));

    let (_, unit) = request(&t.app, "GET", &format!("/v1/units/{}", unit_id), None).await;
    assert_eq!(unit["status"], "AVAILABLE");
}

#[tokio::test]
async fn test_out_of_range_amounts_are_bad_request() {
    let t = setup_test_app().await;
    let (_, _, tx_id) = seed(&t.app).await;

    let (status, err) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/finalize", tx_id),
        Some(json!({
            "sellPrice": "1000000000000000000000000000",
            "sellDate": "2024-03-01",
            "investorSharePercentage": 100,
            "managerSharePercentage": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("sellPrice"));

    let (status, _) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/costs", tx_id),
        Some(json!({"amount": "50000000000000000000000000000", "payer": "INVESTOR", "category": "repair"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The record stays readable and can still be finalized normally.
    let (status, detail) =
        request(&t.app, "GET", &format!("/v1/transactions/{}", tx_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["costs"].as_array().unwrap().len(), 2);
    let (status, _) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/finalize", tx_id),
        Some(json!({"sellPrice": "180000000", "sellDate": "2024-03-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_second_active_transaction_is_conflict() {
    let t = setup_test_app().await;
    let (_, unit_id, _) = seed(&t.app).await;

    let (status, _) = request(
        &t.app,
        "POST",
        "/v1/transactions",
        Some(json!({"unitId": unit_id, "buyPrice": "90000000", "buyDate": "2024-02-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_share_edit_and_revert() {
    let t = setup_test_app().await;
    let (_, unit_id, tx_id) = seed(&t.app).await;
    let shares_uri = format!("/v1/transactions/{}/shares", tx_id);

    let (status, _) = request(
        &t.app,
        "PUT",
        &shares_uri,
        Some(json!({"investorSharePercentage": 50, "managerSharePercentage": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/finalize", tx_id),
        Some(json!({"sellPrice": "180000000", "sellDate": "2024-03-01"})),
    )
    .await;

    let (status, _) = request(
        &t.app,
        "PUT",
        &shares_uri,
        Some(json!({"investorSharePercentage": 50, "managerSharePercentage": 40})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, record) = request(
        &t.app,
        "PUT",
        &shares_uri,
        Some(json!({"investorSharePercentage": "33.33", "managerSharePercentage": "66.67"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["investorProfitAmount"], "7665900");
    assert_eq!(record["managerProfitAmount"], "15334100");

    let (status, tx) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/revert", tx_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tx["status"], "ON_PROCESS");

    let (_, unit) = request(&t.app, "GET", &format!("/v1/units/{}", unit_id), None).await;
    assert_eq!(unit["status"], "AVAILABLE");
    let (_, detail) = request(&t.app, "GET", &format!("/v1/transactions/{}", tx_id), None).await;
    assert!(detail["profitSharing"].is_null());
}

#[tokio::test]
async fn test_validation_and_lookup_errors() {
    let t = setup_test_app().await;

    let (status, err) = request(
        &t.app,
        "POST",
        "/v1/investors",
        Some(json!({"name": "  ", "profitSharePercentage": 40})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].is_string());

    let (status, _) = request(
        &t.app,
        "POST",
        "/v1/investors",
        Some(json!({"name": "Sari", "profitSharePercentage": 140})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(&t.app, "POST", "/v1/investors", Some(json!({"name": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(&t.app, "GET", "/v1/transactions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &t.app,
        "GET",
        &format!("/v1/transactions/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cost_edits_and_delete() {
    let t = setup_test_app().await;
    let (_, unit_id, tx_id) = seed(&t.app).await;

    let (status, cost) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/costs", tx_id),
        Some(json!({"amount": "-5", "payer": "MANAGER", "category": "fuel"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(cost["error"].is_string());

    let (_, cost) = request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/costs", tx_id),
        Some(json!({"amount": "300000", "payer": "MANAGER", "category": "fuel"})),
    )
    .await;
    let cost_id = cost["id"].as_str().unwrap();

    let uri = format!("/v1/transactions/{}/costs/{}", tx_id, cost_id);
    let (status, _) = request(&t.app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(&t.app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, tx) = request(
        &t.app,
        "PATCH",
        &format!("/v1/transactions/{}", tx_id),
        Some(json!({"notes": "new tyres", "initialManagerCapital": "10000000"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tx["notes"], "new tyres");
    assert_eq!(tx["initialManagerCapital"], "10000000");

    let (status, _) =
        request(&t.app, "DELETE", &format!("/v1/transactions/{}", tx_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, unit) = request(&t.app, "GET", &format!("/v1/units/{}", unit_id), None).await;
    assert!(unit["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unit_status_rules() {
    let t = setup_test_app().await;
    let (_, unit_id, tx_id) = seed(&t.app).await;
    let uri = format!("/v1/units/{}/status", unit_id);

    let (status, unit) =
        request(&t.app, "PUT", &uri, Some(json!({"status": "MAINTENANCE"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unit["status"], "MAINTENANCE");

    let (status, _) = request(&t.app, "PUT", &uri, Some(json!({"status": "SOLD"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    request(
        &t.app,
        "POST",
        &format!("/v1/transactions/{}/finalize", tx_id),
        Some(json!({"sellPrice": "180000000", "sellDate": "2024-03-01"})),
    )
    .await;
    let (status, _) = request(&t.app, "PUT", &uri, Some(json!({"status": "AVAILABLE"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
