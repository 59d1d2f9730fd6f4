//! Vehicle and vehicle-derived resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Measurement;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vehicle {
    #[serde(deserialize_with = "super::lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(rename = "VIN", default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub mojio_id: Option<String>,
    #[serde(default)]
    pub current_trip: Option<String>,
    #[serde(default)]
    pub odometer: Option<Measurement>,
    #[serde(default)]
    pub fuel_level: Option<Measurement>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub ignition_state: Option<bool>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified_on: Option<DateTime<Utc>>,
}

/// A point-in-time snapshot of a vehicle's sensors (`states/`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VehicleMeasures {
    pub vehicle_id: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub speed: Option<Measurement>,
    pub odometer: Option<Measurement>,
    pub rpm: Option<Measurement>,
    pub fuel_level: Option<Measurement>,
    pub battery: Option<Measurement>,
    pub ignition_state: Option<bool>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Location {
    #[serde(deserialize_with = "super::lenient::number")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub lng: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub heading: Option<f64>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub altitude: Option<f64>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub accuracy: Option<f64>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Address {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub formatted_address: Option<String>,
}

/// VIN decode result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Vin {
    #[serde(rename = "VIN")]
    pub vin: Option<String>,
    pub market: Option<String>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub year: Option<u16>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub engine: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceSchedule {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub interval_distance: Option<Measurement>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub interval_months: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NextServiceSchedule {
    pub time_stamp: Option<DateTime<Utc>>,
    pub odometer: Option<Measurement>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub age_in_months: Option<u32>,
    pub items: Vec<ServiceSchedule>,
}

/// One bucket of an aggregate series (`{kind}/` under a vehicle).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AggregationData {
    pub date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub count: Option<u64>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub total: Option<f64>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub average: Option<f64>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub min: Option<f64>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub max: Option<f64>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VehicleStatistics {
    pub estimated_fuel_level: Option<Measurement>,
    pub estimated_fuel_volume: Option<Measurement>,
    pub average_fuel_efficiency: Option<Measurement>,
    pub total_range: Option<Measurement>,
    pub current_range: Option<Measurement>,
    pub last_fill_up_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DiagnosticCode {
    pub code: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub instructions: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_decodes_platform_json() {
        let json = r#"{
            "Id": "v1",
            "Name": "Civic",
            "VIN": "1HGCM82633A004352",
            "Odometer": {"Value": 1234.5, "BaseUnit": "Kilometers"},
            "Location": {"Lat": 49.28, "Lng": -123.12},
            "CreatedOn": "2017-01-01T10:00:00.000Z"
        }"#;
        let vehicle: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(vehicle.vin.as_deref(), Some("1HGCM82633A004352"));
        assert_eq!(vehicle.odometer.unwrap().value, Some(1234.5));
        assert_eq!(vehicle.location.unwrap().lat, Some(49.28));
        assert!(vehicle.created_on.is_some());
    }

    #[test]
    fn vehicle_without_id_is_rejected() {
        assert!(serde_json::from_str::<Vehicle>(r#"{"Name":"x"}"#).is_err());
    }

    #[test]
    fn lenient_models_accept_empty_objects() {
        let stats: VehicleStatistics = serde_json::from_str("{}").unwrap();
        assert_eq!(stats, VehicleStatistics::default());
    }
}
