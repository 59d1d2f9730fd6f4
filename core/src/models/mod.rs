//! Domain models returned by the moj.io API.
//!
//! Field names follow the platform's PascalCase JSON. Everything is optional
//! except `Id` on entities that always carry one, so a payload without an id
//! is rejected rather than mapped to an empty shell. Numeric fields go
//! through `lenient`, so a badly typed number never drops the entity.

mod account;
mod activity;
mod device;
mod geofence;
mod lenient;
mod trip;
mod vehicle;

pub use account::{App, Contact, Group, User};
pub use activity::{Activity, ActivityLocation, NotificationSetting, NotificationSettings};
pub use device::{Image, Mojio};
pub use geofence::{Geofence, Region};
pub use trip::{Trip, TripPolyline};
pub use vehicle::{
    Address, AggregationData, DiagnosticCode, Location, NextServiceSchedule, ServiceSchedule,
    Vehicle, VehicleMeasures, VehicleStatistics, Vin,
};

use serde::{Deserialize, Serialize};

/// A measured value with its unit, e.g. `{"Value": 12.5, "BaseUnit": "Kilometers"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Measurement {
    #[serde(deserialize_with = "lenient::number")]
    pub value: Option<f64>,
    pub base_unit: Option<String>,
    pub unit: Option<String>,
}
