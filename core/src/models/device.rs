use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A moj.io OBD-II device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Mojio {
    #[serde(deserialize_with = "super::lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "IMEI", default)]
    pub imei: Option<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub gateway_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub msisdn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Image {
    pub src: Option<String>,
    pub normal: Option<String>,
    pub thumbnail: Option<String>,
    pub content_type: Option<String>,
}
