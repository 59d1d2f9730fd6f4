use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Circle region of a geofence; radius in the unit given by `Radius`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Region {
    #[serde(rename = "Type")]
    pub region_type: Option<String>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub lng: Option<f64>,
    pub radius: Option<super::Measurement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geofence {
    #[serde(deserialize_with = "super::lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enable_enter_activity: Option<bool>,
    #[serde(default)]
    pub enable_exit_activity: Option<bool>,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub vehicle_ids: Vec<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
}
