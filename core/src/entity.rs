//! Resource-to-model mapping.
//!
//! # Design
//! `map_entity` is the single place that knows which model a resource
//! decodes into. The `match` is exhaustive over `Resource`, so adding a
//! resource without deciding its decoder does not compile. Resources with no
//! payload shape map to `Ok(None)`; a payload that does not fit its model is
//! an `ApiError::Decode` carrying the raw object.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::models::{
    Activity, Address, AggregationData, App, DiagnosticCode, Geofence, Group, Image, Location,
    Mojio, NextServiceSchedule, NotificationSettings, ServiceSchedule, Trip, TripPolyline, User,
    Vehicle, VehicleMeasures, VehicleStatistics, Vin,
};
use crate::resource::Resource;

/// A decoded API object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Entity {
    App(App),
    Group(Group),
    User(User),
    VehicleMeasures(VehicleMeasures),
    Location(Location),
    Image(Image),
    Mojio(Mojio),
    Trip(Trip),
    Vehicle(Vehicle),
    Address(Address),
    Vin(Vin),
    ServiceSchedule(ServiceSchedule),
    NextServiceSchedule(NextServiceSchedule),
    Activity(Activity),
    NotificationSettings(NotificationSettings),
    Geofence(Geofence),
    Aggregation(AggregationData),
    Statistics(VehicleStatistics),
    DiagnosticCode(DiagnosticCode),
    Polyline(TripPolyline),
    /// `TransactionId` of a wifi-radio command.
    TransactionId(String),
    /// `State` of a transaction.
    TransactionState(String),
}

/// Decode `object` as the model `resource` produces.
pub fn map_entity(resource: Resource, object: &Map<String, Value>) -> Result<Option<Entity>, ApiError> {
    let entity = match resource {
        Resource::Base
        | Resource::Secret
        | Resource::History
        | Resource::Permission
        | Resource::Permissions
        | Resource::PhoneNumbers
        | Resource::Emails
        | Resource::Tags => return Ok(None),

        Resource::WifiRadio => return Ok(scalar(object, "TransactionId").map(Entity::TransactionId)),
        Resource::Transactions => return Ok(scalar(object, "State").map(Entity::TransactionState)),

        Resource::Apps => Entity::App(decode(resource, object)?),
        Resource::Groups => Entity::Group(decode(resource, object)?),
        Resource::Users | Resource::Me => Entity::User(decode(resource, object)?),
        Resource::States => Entity::VehicleMeasures(decode(resource, object)?),
        Resource::Locations => Entity::Location(decode(resource, object)?),
        Resource::Image => Entity::Image(decode(resource, object)?),
        Resource::Mojios => Entity::Mojio(decode(resource, object)?),
        Resource::Trips => Entity::Trip(decode(resource, object)?),
        Resource::Vehicles => Entity::Vehicle(decode(resource, object)?),
        Resource::Address => Entity::Address(decode(resource, object)?),
        Resource::Vin => Entity::Vin(decode(resource, object)?),
        Resource::ServiceSchedule => Entity::ServiceSchedule(decode(resource, object)?),
        Resource::Next => Entity::NextServiceSchedule(decode(resource, object)?),
        Resource::Activities => Entity::Activity(decode(resource, object)?),
        Resource::NotificationSettings => Entity::NotificationSettings(decode(resource, object)?),
        Resource::Geofences => Entity::Geofence(decode(resource, object)?),
        Resource::Aggregates => Entity::Aggregation(decode(resource, object)?),
        Resource::Statistics => Entity::Statistics(decode(resource, object)?),
        Resource::DiagnosticCodes => Entity::DiagnosticCode(decode(resource, object)?),
        Resource::Polyline => Entity::Polyline(decode(resource, object)?),
    };
    Ok(Some(entity))
}

fn decode<T: DeserializeOwned>(resource: Resource, object: &Map<String, Value>) -> Result<T, ApiError> {
    let payload = Value::Object(object.clone());
    serde_json::from_value(payload.clone()).map_err(|source| ApiError::Decode {
        resource,
        source,
        payload,
    })
}

fn scalar(object: &Map<String, Value>, field: &str) -> Option<String> {
    match object.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn vehicles_map_to_vehicle() {
        let entity = map_entity(Resource::Vehicles, &object(json!({"Id": "v1", "Name": "Civic"})))
            .unwrap()
            .unwrap();
        match entity {
            Entity::Vehicle(v) => assert_eq!(v.name.as_deref(), Some("Civic")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn me_maps_to_user() {
        let entity = map_entity(Resource::Me, &object(json!({"Id": "u1"}))).unwrap();
        assert!(matches!(entity, Some(Entity::User(_))));
    }

    #[test]
    fn payloadless_resources_yield_none() {
        for resource in [Resource::Secret, Resource::History, Resource::Base, Resource::Tags] {
            assert!(map_entity(resource, &object(json!({"Id": "x"}))).unwrap().is_none());
        }
    }

    #[test]
    fn wifi_radio_extracts_transaction_id() {
        let entity = map_entity(Resource::WifiRadio, &object(json!({"TransactionId": "t-9", "Other": 1})));
        assert_eq!(entity.unwrap(), Some(Entity::TransactionId("t-9".into())));
    }

    #[test]
    fn transactions_extract_state() {
        let entity = map_entity(Resource::Transactions, &object(json!({"State": "Completed"})));
        assert_eq!(entity.unwrap(), Some(Entity::TransactionState("Completed".into())));
        let missing = map_entity(Resource::Transactions, &object(json!({"Id": "t"})));
        assert_eq!(missing.unwrap(), None);
    }

    #[test]
    fn decode_failure_is_typed() {
        let err = map_entity(Resource::Trips, &object(json!({"Name": "no id"}))).unwrap_err();
        match err {
            ApiError::Decode { resource, payload, .. } => {
                assert_eq!(resource, Resource::Trips);
                assert_eq!(payload["Name"], "no id");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn loosely_typed_numbers_still_map() {
        let entity = map_entity(Resource::Vin, &object(json!({"VIN": "1HG", "Year": "2015"})));
        match entity.unwrap() {
            Some(Entity::Vin(vin)) => assert_eq!(vin.year, Some(2015)),
            other => panic!("unexpected {other:?}"),
        }

        let entity = map_entity(Resource::Aggregates, &object(json!({"Count": 3.0, "Total": "12.5"})));
        match entity.unwrap() {
            Some(Entity::Aggregation(data)) => {
                assert_eq!(data.count, Some(3));
                assert_eq!(data.total, Some(12.5));
            }
            other => panic!("unexpected {other:?}"),
        }

        let entity = map_entity(Resource::Vehicles, &object(json!({"Id": 17, "Name": "Civic"})));
        match entity.unwrap() {
            Some(Entity::Vehicle(vehicle)) => assert_eq!(vehicle.id, "17"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn entity_serializes_with_kind_tag() {
        let value = serde_json::to_value(Entity::TransactionState("Pending".into())).unwrap();
        assert_eq!(value, json!({"kind": "transaction_state", "value": "Pending"}));
    }
}
