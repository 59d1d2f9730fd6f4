use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(rename = "VIN", default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVehicle {
    pub name: String,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(rename = "VIN", default)]
    pub vin: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateVehicle {
    pub name: Option<String>,
    pub license_plate: Option<String>,
}

/// `top`/`skip`/`includeCount` as sent by the client.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub top: Option<usize>,
    pub skip: Option<usize>,
    #[serde(rename = "includeCount")]
    pub include_count: Option<bool>,
}

#[derive(Default)]
pub struct MockData {
    /// Ordered by id so pages are stable.
    pub vehicles: BTreeMap<String, Vehicle>,
    /// v1 key/value store, keyed by (vehicle id, key).
    pub store: HashMap<(String, String), Value>,
}

pub type Db = Arc<RwLock<MockData>>;

pub fn app() -> Router {
    app_with(MockData::default())
}

/// Router over pre-seeded data.
pub fn app_with(data: MockData) -> Router {
    let db: Db = Arc::new(RwLock::new(data));
    Router::new()
        .route("/v2/vehicles/", get(list_vehicles).post(create_vehicle))
        .route(
            "/v2/vehicles/{id}/",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/v2/vehicles/{id}/wifiradio/", put(wifi_radio))
        .route("/v2/transactions/{id}/", get(transaction))
        .route("/v2/me/", get(me))
        .route("/v2/apps/{id}/secret/", get(app_secret))
        .route("/v2/broken/", get(broken))
        .route("/v1/vehicles/{id}/store/{key}", get(read_store).put(write_store))
        .with_state(db)
}

/// Seed `count` vehicles with ids `v01`, `v02`...
pub fn seeded(count: usize) -> MockData {
    let mut data = MockData::default();
    for n in 1..=count {
        let id = format!("v{n:02}");
        data.vehicles.insert(
            id.clone(),
            Vehicle {
                id,
                name: format!("Vehicle {n}"),
                license_plate: None,
                vin: None,
            },
        );
    }
    data
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock moj.io API listening");
    }
    axum::serve(listener, app()).await
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "Message": format!("{what} not found"), "ErrorCode": "NotFound" })),
    )
        .into_response()
}

fn page_url(host: &str, top: usize, skip: usize, include_count: bool) -> String {
    let mut url = format!("http://{host}/v2/vehicles/?top={top}&skip={skip}");
    if include_count {
        url.push_str("&includeCount=true");
    }
    url
}

/// One page of vehicles in the platform envelope. While more data follows,
/// `Links.Next` points at the next page; the last page reached by paging
/// echoes its own URL, as the platform does.
async fn list_vehicles(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let data = db.read().await;
    let top = params.top.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let skip = params.skip.unwrap_or(0);
    let include_count = params.include_count.unwrap_or(false);
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");

    let items: Vec<&Vehicle> = data.vehicles.values().skip(skip).take(top).collect();
    let total = data.vehicles.len();
    debug!(top, skip, total, "list vehicles");

    let next = if skip + top < total {
        Some(page_url(host, top, skip + top, include_count))
    } else if skip > 0 {
        Some(page_url(host, top, skip, include_count))
    } else {
        None
    };

    let mut body = json!({ "Data": items });
    if include_count {
        body["TotalCount"] = json!(total);
    }
    if let Some(next) = next {
        body["Links"] = json!({ "Next": urlencoding::encode(&next) });
    }
    Json(body)
}

async fn create_vehicle(State(db): State<Db>, Json(input): Json<CreateVehicle>) -> Response {
    let vehicle = Vehicle {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        license_plate: input.license_plate,
        vin: input.vin,
    };
    db.write()
        .await
        .vehicles
        .insert(vehicle.id.clone(), vehicle.clone());
    info!(id = %vehicle.id, "vehicle created");
    (StatusCode::CREATED, Json(vehicle)).into_response()
}

async fn get_vehicle(State(db): State<Db>, Path(id): Path<String>) -> Response {
    match db.read().await.vehicles.get(&id) {
        Some(vehicle) => Json(vehicle.clone()).into_response(),
        None => not_found("Vehicle"),
    }
}

async fn update_vehicle(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<UpdateVehicle>,
) -> Response {
    let mut data = db.write().await;
    let Some(vehicle) = data.vehicles.get_mut(&id) else {
        return not_found("Vehicle");
    };
    if let Some(name) = input.name {
        vehicle.name = name;
    }
    if let Some(plate) = input.license_plate {
        vehicle.license_plate = Some(plate);
    }
    Json(vehicle.clone()).into_response()
}

async fn delete_vehicle(State(db): State<Db>, Path(id): Path<String>) -> Response {
    match db.write().await.vehicles.remove(&id) {
        Some(_) => Json(json!({ "Message": "Vehicle deleted" })).into_response(),
        None => not_found("Vehicle"),
    }
}

async fn wifi_radio(State(db): State<Db>, Path(id): Path<String>) -> Response {
    if !db.read().await.vehicles.contains_key(&id) {
        return not_found("Vehicle");
    }
    Json(json!({ "TransactionId": Uuid::new_v4().to_string() })).into_response()
}

async fn transaction(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "Id": id, "State": "Completed" }))
}

async fn me() -> Json<Value> {
    Json(json!({
        "Id": "u-mock",
        "UserName": "mock",
        "FirstName": "Mock",
        "LastName": "User"
    }))
}

async fn app_secret(Path(_id): Path<String>) -> Json<Value> {
    Json(Value::String("s3cr3t".to_string()))
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

async fn read_store(State(db): State<Db>, Path((id, key)): Path<(String, String)>) -> Response {
    match db.read().await.store.get(&(id, key)) {
        Some(value) => Json(value.clone()).into_response(),
        None => not_found("Key"),
    }
}

/// Stores the raw JSON body (usually a quoted string) under `key`.
async fn write_store(
    State(db): State<Db>,
    Path((id, key)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => return (StatusCode::BAD_REQUEST, Json(json!({ "Message": "Invalid body" }))).into_response(),
    };
    db.write().await.store.insert((id, key), value);
    Json(json!({ "Message": "Stored" })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_serializes_pascal_case() {
        let vehicle = Vehicle {
            id: "v1".to_string(),
            name: "Civic".to_string(),
            license_plate: None,
            vin: Some("1HGCM".to_string()),
        };
        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["Id"], "v1");
        assert_eq!(json["Name"], "Civic");
        assert_eq!(json["VIN"], "1HGCM");
        assert!(json.get("LicensePlate").is_none());
    }

    #[test]
    fn create_vehicle_requires_name() {
        let result: Result<CreateVehicle, _> = serde_json::from_str(r#"{"VIN":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_vehicle_all_fields_optional() {
        let input: UpdateVehicle = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none());
        assert!(input.license_plate.is_none());
    }

    #[test]
    fn seeded_ids_sort_in_insertion_order() {
        let data = seeded(12);
        let ids: Vec<_> = data.vehicles.keys().cloned().collect();
        assert_eq!(ids.first().map(String::as_str), Some("v01"));
        assert_eq!(ids.last().map(String::as_str), Some("v12"));
    }

    #[test]
    fn page_url_carries_count_flag() {
        assert_eq!(
            page_url("h:1", 2, 4, true),
            "http://h:1/v2/vehicles/?top=2&skip=4&includeCount=true"
        );
    }
}
