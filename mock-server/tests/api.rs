use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, seeded, Vehicle};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::HOST, "mock:3000")
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn next_link(body: &Value) -> Option<String> {
    body["Links"]["Next"]
        .as_str()
        .map(|next| urlencoding::decode(next).unwrap().into_owned())
}

// --- list ---

#[tokio::test]
async fn list_vehicles_empty_envelope() {
    let resp = app().oneshot(get("/v2/vehicles/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["Data"].as_array().unwrap().len(), 0);
    assert!(body.get("TotalCount").is_none());
    assert!(body.get("Links").is_none());
}

#[tokio::test]
async fn list_vehicles_first_page_links_next() {
    let resp = app_with(seeded(5))
        .oneshot(get("/v2/vehicles/?top=2&includeCount=true"))
        .await
        .unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["Data"].as_array().unwrap().len(), 2);
    assert_eq!(body["TotalCount"], 5);
    assert_eq!(
        next_link(&body).as_deref(),
        Some("http://mock:3000/v2/vehicles/?top=2&skip=2&includeCount=true")
    );
}

#[tokio::test]
async fn list_vehicles_next_is_percent_encoded() {
    let resp = app_with(seeded(3)).oneshot(get("/v2/vehicles/?top=1")).await.unwrap();
    let body: Value = body_json(resp).await;
    let raw = body["Links"]["Next"].as_str().unwrap();
    assert!(raw.starts_with("http%3A%2F%2F"));
}

#[tokio::test]
async fn list_vehicles_last_page_repeats_its_url() {
    let resp = app_with(seeded(5))
        .oneshot(get("/v2/vehicles/?top=2&skip=4"))
        .await
        .unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["Data"].as_array().unwrap().len(), 1);
    assert_eq!(
        next_link(&body).as_deref(),
        Some("http://mock:3000/v2/vehicles/?top=2&skip=4")
    );
}

// --- create / get / update / delete ---

#[tokio::test]
async fn create_vehicle_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/v2/vehicles/", r#"{"Name":"Civic","VIN":"1HGCM"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let vehicle: Vehicle = body_json(resp).await;
    assert_eq!(vehicle.name, "Civic");
    assert_eq!(vehicle.vin.as_deref(), Some("1HGCM"));
}

#[tokio::test]
async fn create_vehicle_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/v2/vehicles/", r#"{"NotName":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_vehicle_seeded() {
    let resp = app_with(seeded(2)).oneshot(get("/v2/vehicles/v02/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let vehicle: Vehicle = body_json(resp).await;
    assert_eq!(vehicle.name, "Vehicle 2");
}

#[tokio::test]
async fn get_vehicle_not_found_has_message() {
    let resp = app().oneshot(get("/v2/vehicles/nope/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["Message"], "Vehicle not found");
}

#[tokio::test]
async fn update_vehicle_partial() {
    let resp = app_with(seeded(1))
        .oneshot(json_request("PUT", "/v2/vehicles/v01/", r#"{"LicensePlate":"ABC-123"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let vehicle: Vehicle = body_json(resp).await;
    assert_eq!(vehicle.name, "Vehicle 1");
    assert_eq!(vehicle.license_plate.as_deref(), Some("ABC-123"));
}

#[tokio::test]
async fn delete_vehicle_returns_message() {
    let resp = app_with(seeded(1))
        .oneshot(json_request("DELETE", "/v2/vehicles/v01/", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["Message"], "Vehicle deleted");
}

// --- scalar endpoints ---

#[tokio::test]
async fn wifi_radio_returns_transaction_id() {
    let resp = app_with(seeded(1))
        .oneshot(json_request("PUT", "/v2/vehicles/v01/wifiradio/", ""))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert!(body["TransactionId"].is_string());
}

#[tokio::test]
async fn secret_is_bare_string() {
    let resp = app().oneshot(get("/v2/apps/a1/secret/")).await.unwrap();
    assert_eq!(body_text(resp).await, r#""s3cr3t""#);
}

#[tokio::test]
async fn broken_route_is_plain_text_500() {
    let resp = app().oneshot(get("/v2/broken/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(resp).await, "Internal Server Error");
}

// --- v1 storage ---

#[tokio::test]
async fn store_round_trip() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("PUT", "/v1/vehicles/v01/store/nickname", r#""Blue""#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(get("/v1/vehicles/v01/store/nickname")).await.unwrap();
    assert_eq!(body_text(resp).await, r#""Blue""#);
}
