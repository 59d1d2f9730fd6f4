//! Activity-stream entries and notification settings.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The "where" of an activity: actor, object, location or target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ActivityLocation {
    pub id: Option<String>,
    #[serde(rename = "Type")]
    pub activity_type: Option<String>,
    pub href: Option<String>,
    pub name: Option<String>,
    pub name_map: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Activity {
    #[serde(deserialize_with = "super::lenient::id")]
    pub id: String,
    #[serde(rename = "Type", default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actor: Option<ActivityLocation>,
    #[serde(default)]
    pub object: Option<ActivityLocation>,
    #[serde(default)]
    pub location: Option<ActivityLocation>,
    #[serde(default)]
    pub target: Option<ActivityLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NotificationSetting {
    pub key: Option<String>,
    pub enabled: Option<bool>,
    #[serde(deserialize_with = "super::lenient::number")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NotificationSettings {
    pub enable_notifications: Option<bool>,
    pub settings: Vec<NotificationSetting>,
}
