//! The fixed set of moj.io resources.
//!
//! A `Resource` names both the URL fragment a builder call appends and the
//! decoder the response handler uses for it (see `entity::map_entity`).

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    #[default]
    Base,
    Apps,
    Secret,
    Groups,
    Users,
    Me,
    History,
    States,
    Locations,
    Image,
    Mojios,
    Permission,
    Permissions,
    PhoneNumbers,
    Emails,
    Tags,
    Trips,
    Vehicles,
    Address,
    Vin,
    ServiceSchedule,
    Next,
    Activities,
    NotificationSettings,
    WifiRadio,
    Transactions,
    Geofences,
    Aggregates,
    Statistics,
    DiagnosticCodes,
    Polyline,
}

impl Resource {
    /// Path fragment appended to the request URL, trailing slash included.
    pub fn segment(self) -> &'static str {
        match self {
            Resource::Base => "",
            Resource::Apps => "apps/",
            Resource::Secret => "secret/",
            Resource::Groups => "groups/",
            Resource::Users => "users/",
            Resource::Me => "me/",
            Resource::History => "history/",
            Resource::States => "states/",
            Resource::Locations => "locations/",
            Resource::Image => "image/",
            Resource::Mojios => "mojios/",
            Resource::Permission => "permission/",
            Resource::Permissions => "permissions/",
            Resource::PhoneNumbers => "phonenumbers/",
            Resource::Emails => "emails/",
            Resource::Tags => "tags/",
            Resource::Trips => "trips/",
            Resource::Vehicles => "vehicles/",
            Resource::Address => "address/",
            Resource::Vin => "vin/",
            Resource::ServiceSchedule => "serviceschedule/",
            Resource::Next => "next/",
            Resource::Activities => "activities/",
            Resource::NotificationSettings => "activities/settings/",
            Resource::WifiRadio => "wifiradio/",
            Resource::Transactions => "transactions/",
            Resource::Geofences => "geofences/",
            Resource::Aggregates => "aggregates/",
            Resource::Statistics => "statistics/",
            Resource::DiagnosticCodes => "diagnosticcodes/",
            Resource::Polyline => "polyline/",
        }
    }

    /// Whether the push (websocket) endpoint mirrors this resource's path.
    pub fn is_push_capable(self) -> bool {
        matches!(
            self,
            Resource::Users
                | Resource::Mojios
                | Resource::Trips
                | Resource::Vehicles
                | Resource::Activities
                | Resource::Transactions
                | Resource::Geofences
        )
    }

    /// Whether a builder call for this resource selects an entity by id.
    /// Sub-resources such as `states/` keep the id selected before them.
    pub fn takes_id(self) -> bool {
        matches!(
            self,
            Resource::Apps
                | Resource::Groups
                | Resource::Users
                | Resource::Mojios
                | Resource::PhoneNumbers
                | Resource::Emails
                | Resource::Trips
                | Resource::Vehicles
                | Resource::Transactions
                | Resource::Geofences
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Base => "base",
            other => other.segment().trim_end_matches('/'),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
