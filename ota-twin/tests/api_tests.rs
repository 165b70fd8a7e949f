//! Integration tests for ota-twin API endpoints
//!
//! Drives the full router in-process with `oneshot`; no listener is bound.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use ota_common::config::ServiceConfig;
use ota_twin::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

const ENGINEERING_CSV: &str = "\
Tag ID,Device Type,Manufacturer,IP Address,Hostname
PLC-101,PLC,Siemens,10.10.1.5,
HMI-102,HMI,Rockwell,,hmi-102.cdu.local
FT-201,Flow Transmitter,Emerson,,
";

const DISCOVERY_CSV: &str = "\
asset_tag,ip,host_name,vendor,patched,firewall
PLC-101,10.10.1.5,,Siemens,yes,yes
,10.10.8.8,HMI-102.CDU.local,Rockwell,no,no
CAM-9,10.10.7.7,,Axis,no,no
";

fn setup_app() -> Router {
    build_router(AppState::new(ServiceConfig::default()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_raw(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(body.into())
        .unwrap()
}

/// Send one request, returning status and parsed JSON body
async fn send(request: Request<Body>) -> (StatusCode, Value) {
    send_to(setup_app(), request).await
}

async fn send_to(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ota-twin");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let (status, body) = send(get("/api/buildinfo")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, body) = send(get("/api/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_strategies() {
    let (status, body) = send(get("/api/strategies")).await;

    assert_eq!(status, StatusCode::OK);
    let strategies = body.as_array().unwrap();
    assert_eq!(strategies.len(), 7);
    assert_eq!(strategies[0]["matchType"], "exact_tag_id");
    assert_eq!(strategies[0]["confidence"], 100);
    assert_eq!(strategies[0]["priority"], 1);

    let partial = strategies
        .iter()
        .find(|s| s["matchType"] == "partial_tag_id")
        .unwrap();
    assert_eq!(partial["enabledByDefault"], false);

    let confidences: Vec<u64> = strategies
        .iter()
        .map(|s| s["confidence"].as_u64().unwrap())
        .collect();
    assert!(confidences.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_list_industries() {
    let (status, body) = send(get("/api/industries")).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["generic", "oil_gas", "pharma", "automotive", "utilities"]);
    assert!(body[1]["processUnits"].as_array().unwrap().len() > 0);
}

// =============================================================================
// Single-file endpoints
// =============================================================================

#[tokio::test]
async fn test_normalize_upload() {
    let (status, body) = send(post_json(
        "/api/normalize",
        json!({ "csv": DISCOVERY_CSV, "sourceId": "nozomi" }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sourceId"], "nozomi");
    assert_eq!(body["count"], 3);
    let first = &body["records"][0];
    assert_eq!(first["tagId"], "PLC-101");
    assert_eq!(first["ipAddress"], "10.10.1.5");
    assert_eq!(first["manufacturer"], "Siemens");
    assert_eq!(first["hasSecurityPatches"], true);
    assert_eq!(first["sourceId"], "nozomi");
}

#[tokio::test]
async fn test_normalize_defaults_source_id() {
    let (status, body) = send(post_json("/api/normalize", json!({ "csv": ENGINEERING_CSV }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sourceId"], "upload");
    assert_eq!(body["records"][2]["sourceId"], "upload");
}

#[tokio::test]
async fn test_classify_upload() {
    let (status, body) = send(post_json(
        "/api/classify",
        json!({ "csv": ENGINEERING_CSV, "industry": "oil-gas" }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["industry"], "oil_gas");
    assert_eq!(body["count"], 3);
    assert_eq!(body["tierCounts"]["tier1"], 2);
    assert_eq!(body["tierCounts"]["tier3"], 1);
    assert_eq!(body["assets"][0]["classification"]["securityRequired"], "MUST");
    assert_eq!(body["assets"][2]["record"]["tagId"], "FT-201");
    assert_eq!(body["assets"][2]["classification"]["tier"], 3);
}

#[tokio::test]
async fn test_classify_unknown_industry_is_400() {
    let (status, body) = send(post_json(
        "/api/classify",
        json!({ "csv": ENGINEERING_CSV, "industry": "aerospace" }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// =============================================================================
// Analysis
// =============================================================================

#[tokio::test]
async fn test_analyze_happy_path() {
    let (status, body) = send(post_json(
        "/api/analyze",
        json!({
            "engineeringCsv": ENGINEERING_CSV,
            "otDiscoveryCsv": DISCOVERY_CSV,
            "industry": "oil_gas",
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["analysisId"].is_string());
    assert_eq!(body["industry"], "oil_gas");
    assert_eq!(body["coveragePercentage"], 67);

    let matched = body["matched"].as_array().unwrap();
    assert_eq!(matched.len(), 2);
    assert_eq!(matched[0]["matchType"], "exact_tag_id");
    assert_eq!(matched[0]["confidence"], 100);
    assert_eq!(matched[1]["matchType"], "hostname_match");
    assert_eq!(matched[1]["engineering"]["tagId"], "HMI-102");

    assert_eq!(body["blindSpots"][0]["tagId"], "FT-201");
    assert_eq!(body["orphans"][0]["tagId"], "CAM-9");
    assert_eq!(body["orphans"][0]["sourceId"], "ot_discovery");

    let assessments = body["assessments"].as_array().unwrap();
    assert_eq!(assessments.len(), 3);
    assert_eq!(assessments[2]["matchType"], "none");
    assert_eq!(assessments[2]["confidence"], 0);

    assert_eq!(body["metrics"]["engineeringCount"], 3);
    assert_eq!(body["metrics"]["discoveryCount"], 3);
    assert_eq!(body["metrics"]["matchesByType"]["exact_tag_id"], 1);
    assert_eq!(body["duplicatesRemoved"], 0);
}

#[tokio::test]
async fn test_analyze_merges_and_dedups_additional_sources() {
    let scanner = "Name,IP Address\nPLC-101,10.10.1.5\nRTU-7,10.10.5.5\n";
    let (status, body) = send(post_json(
        "/api/analyze",
        json!({
            "engineeringCsv": ENGINEERING_CSV,
            "otDiscoveryCsv": DISCOVERY_CSV,
            "additionalSources": [{ "sourceId": "scanner", "csv": scanner }],
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duplicatesRemoved"], 1);
    assert_eq!(body["metrics"]["discoveryCount"], 4);
    let orphan_sources: Vec<&str> = body["orphans"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["sourceId"].as_str().unwrap())
        .collect();
    assert_eq!(orphan_sources, ["ot_discovery", "scanner"]);
}

#[tokio::test]
async fn test_analyze_without_discovery_is_all_blind_spots() {
    let (status, body) = send(post_json(
        "/api/analyze",
        json!({ "engineeringCsv": ENGINEERING_CSV }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coveragePercentage"], 0);
    assert_eq!(body["blindSpots"].as_array().unwrap().len(), 3);
    assert!(body["matched"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_empty_engineering_is_400() {
    let (status, body) = send(post_json(
        "/api/analyze",
        json!({ "engineeringCsv": "Tag ID,IP Address\n", "otDiscoveryCsv": DISCOVERY_CSV }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_ENGINEERING");
}

#[tokio::test]
async fn test_analyze_missing_engineering_is_400() {
    let (status, body) = send(post_json(
        "/api/analyze",
        json!({ "otDiscoveryCsv": DISCOVERY_CSV }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_ENGINEERING");
}

#[tokio::test]
async fn test_analyze_unknown_strategy_is_400() {
    let (status, body) = send(post_json(
        "/api/analyze",
        json!({
            "engineeringCsv": ENGINEERING_CSV,
            "otDiscoveryCsv": DISCOVERY_CSV,
            "strategies": ["exact_tag_id", "crystal_ball"],
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("crystal_ball"));
}

#[tokio::test]
async fn test_analyze_restricted_strategies() {
    let (status, body) = send(post_json(
        "/api/analyze",
        json!({
            "engineeringCsv": ENGINEERING_CSV,
            "otDiscoveryCsv": DISCOVERY_CSV,
            "strategies": ["exact_tag_id"],
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategies"], json!(["exact_tag_id"]));
    assert_eq!(body["matched"].as_array().unwrap().len(), 1);
    assert_eq!(body["coveragePercentage"], 33);
}

#[tokio::test]
async fn test_analyze_blank_additional_source_id_is_400() {
    let (status, _) = send(post_json(
        "/api/analyze",
        json!({
            "engineeringCsv": ENGINEERING_CSV,
            "additionalSources": [{ "sourceId": " ", "csv": DISCOVERY_CSV }],
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_synthetic_fill_is_opt_in() {
    let engineering = "Tag ID\nA-1\nA-2\nA-3\nA-4\nA-5\n";
    let discovery = "Tag ID\nZ-1\nZ-2\nZ-3\n";

    let (status, body) = send(post_json(
        "/api/analyze",
        json!({ "engineeringCsv": engineering, "otDiscoveryCsv": discovery }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["coveragePercentage"], 0);
    assert!(body["matched"].as_array().unwrap().is_empty());

    let (status, body) = send(post_json(
        "/api/analyze",
        json!({
            "engineeringCsv": engineering,
            "otDiscoveryCsv": discovery,
            "syntheticFill": true,
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategies"].as_array().unwrap().last().unwrap(), "intelligent_pairing");

    // Capped at 2/5 of the engineering set
    let matched = body["matched"].as_array().unwrap();
    assert_eq!(matched.len(), 2);
    assert!(matched
        .iter()
        .all(|m| m["matchType"] == "intelligent_pairing" && m["confidence"] == 50));
    assert_eq!(body["coveragePercentage"], 40);
    assert_eq!(body["metrics"]["matchesByType"]["intelligent_pairing"], 2);
    assert_eq!(body["blindSpots"].as_array().unwrap().len(), 3);
    assert_eq!(body["orphans"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Request body errors
// =============================================================================

#[tokio::test]
async fn test_malformed_json_is_json_400() {
    for uri in ["/api/analyze", "/api/normalize", "/api/classify"] {
        let (status, body) = send(post_raw(uri, "application/json", "{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "INVALID_JSON", "{}", uri);
        assert!(body["error"]["message"].is_string());
    }
}

#[tokio::test]
async fn test_wrong_field_type_is_json_400() {
    let (status, body) = send(post_json(
        "/api/analyze",
        json!({ "engineeringCsv": ENGINEERING_CSV, "thresholdMonths": -1 }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_non_json_content_type_is_json_415() {
    let (status, body) = send(post_raw("/api/normalize", "text/plain", "Tag ID\nP-1\n")).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
}

#[tokio::test]
async fn test_body_over_upload_limit_is_json_413() {
    let app = build_router(AppState::new(ServiceConfig {
        max_upload_bytes: 256,
        ..Default::default()
    }));
    let big_csv = format!("Tag ID\n{}", "PLC-0001\n".repeat(100));

    let (status, body) = send_to(
        app,
        post_json("/api/normalize", json!({ "csv": big_csv })),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
}
