use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Location, Measurement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Trip {
    #[serde(deserialize_with = "super::lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub mojio_id: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub start_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub distance: Option<Measurement>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub start_location: Option<Location>,
    #[serde(default)]
    pub end_location: Option<Location>,
    #[serde(default)]
    pub max_speed: Option<Measurement>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Encoded polyline of a trip's route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TripPolyline {
    pub polyline: Option<String>,
}
