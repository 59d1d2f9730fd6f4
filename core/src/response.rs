//! Response classification.
//!
//! # Design
//! `ResponseHandler` turns one `HttpResponse` into either a `Payload` or an
//! `ApiError`. Only 200 and 201 count as success. A successful body is one
//! of four shapes:
//!
//! - an envelope object with a `Data` array (a page of entities),
//! - any other object (a single entity, or a `Message`),
//! - a JSON string,
//! - anything else, including an empty body, which acknowledges the call.
//!
//! The handler is bound to the resource captured from the builder when the
//! call started, so every page of a paginated call decodes the same way.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::builder::EndpointBuilder;
use crate::entity::{map_entity, Entity};
use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::resource::Resource;

/// What a successful call delivers to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// One page of entities.
    List(Vec<Entity>),
    /// One page of entities with the server's total count.
    Counted(CountedList),
    Entity(Entity),
    /// A bare string body, or the `Message` of an unmapped object.
    Text(String),
    /// The call succeeded without a usable body.
    Acknowledged,
    /// Emitted once after the last page of a paginated call.
    PaginationComplete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CountedList {
    pub total_count: u64,
    pub data: Vec<Entity>,
}

impl Payload {
    pub fn is_list(&self) -> bool {
        matches!(self, Payload::List(_) | Payload::Counted(_))
    }

    /// Entities of a list page, empty for every other payload.
    pub fn entities(&self) -> &[Entity] {
        match self {
            Payload::List(data) | Payload::Counted(CountedList { data, .. }) => data.as_slice(),
            _ => &[],
        }
    }
}

/// A classified response plus the raw `Links.Next` of a list envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Handled {
    pub payload: Payload,
    pub next: Option<String>,
}

impl Handled {
    fn single(payload: Payload) -> Self {
        Self { payload, next: None }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResponseHandler {
    resource: Resource,
    include_count: bool,
}

impl ResponseHandler {
    pub fn new(resource: Resource, include_count: bool) -> Self {
        Self {
            resource,
            include_count,
        }
    }

    /// Handler bound to the builder's active resource and count flag.
    pub fn for_request(builder: &EndpointBuilder) -> Self {
        Self::new(builder.active_resource(), builder.include_count())
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn handle(&self, response: &HttpResponse) -> Result<Handled, ApiError> {
        let body: Option<Value> = serde_json::from_str(&response.body).ok();
        debug!(status = response.status, resource = %self.resource, "handling response");

        if !matches!(response.status, 200 | 201) {
            return Err(match body {
                Some(body @ Value::Object(_)) => ApiError::Server {
                    status: response.status,
                    body,
                },
                _ => ApiError::RequestFailed,
            });
        }

        let handled = match body {
            Some(Value::Object(object)) => match object.get("Data") {
                Some(Value::Array(items)) => self.list(&object, items),
                _ => Handled::single(self.single(&object)),
            },
            Some(Value::String(text)) => Handled::single(Payload::Text(text)),
            _ => Handled::single(Payload::Acknowledged),
        };
        Ok(handled)
    }

    fn list(&self, envelope: &Map<String, Value>, items: &[Value]) -> Handled {
        let data: Vec<Entity> = items
            .iter()
            .filter_map(|item| {
                let object = item.as_object()?;
                match map_entity(self.resource, object) {
                    Ok(entity) => entity,
                    Err(err) => {
                        warn!(resource = %self.resource, error = %err, "dropping list element that failed to decode");
                        None
                    }
                }
            })
            .collect();

        let total_count = envelope.get("TotalCount").and_then(Value::as_u64);
        let payload = match total_count {
            Some(total_count) if self.include_count => Payload::Counted(CountedList { total_count, data }),
            _ => Payload::List(data),
        };
        let next = envelope
            .get("Links")
            .and_then(|links| links.get("Next"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Handled { payload, next }
    }

    fn single(&self, object: &Map<String, Value>) -> Payload {
        match map_entity(self.resource, object) {
            Ok(Some(entity)) => return Payload::Entity(entity),
            Ok(None) => {}
            Err(err) => debug!(error = %err, "object did not map, falling back to Message"),
        }
        let message = object
            .get("Message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Payload::Text(message.to_string())
    }
}
