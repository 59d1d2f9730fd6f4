//! Fluent request builder for moj.io resources.
//!
//! # Design
//! `EndpointBuilder` owns the whole request descriptor for one logical call:
//! the running request URL (and the push URL for push-capable resources),
//! the active resource and its id, the pending parameters, the method and
//! the pagination flag. Every configuration call consumes the builder and
//! returns it, so there is no shared mutable state between call chains.
//!
//! Resource calls append to the URL in call order, so
//! `.vehicles(Some("v1")).trips(None)` targets `vehicles/v1/trips/`. Only the
//! last resource call decides how the response is decoded.
//!
//! Like the rest of the core, the builder never touches the network:
//! `build_request` produces an `HttpRequest` for whoever executes it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::environment::ClientEnvironment;
use crate::error::ApiError;
use crate::http::{BodyEncoding, HeaderContext, HttpMethod, HttpRequest};
use crate::query::{format_timestamp, QueryOptions};
use crate::resource::Resource;

#[derive(Debug, Clone, Default)]
pub struct EndpointBuilder {
    request_url: Option<String>,
    v1_url: Option<String>,
    push_url: Option<String>,
    resource: Resource,
    entity_id: Option<String>,
    params: BTreeMap<String, String>,
    method: HttpMethod,
    paginate: bool,
    include_count: bool,
}

impl EndpointBuilder {
    pub fn new(environment: &ClientEnvironment) -> Self {
        Self {
            request_url: environment.api_endpoint.clone(),
            v1_url: environment.v1_api_endpoint.clone(),
            push_url: environment.push_endpoint.clone(),
            ..Self::default()
        }
    }

    // --- method and flags ---

    pub fn get(mut self) -> Self {
        self.method = HttpMethod::Get;
        self
    }

    pub fn post(mut self) -> Self {
        self.method = HttpMethod::Post;
        self
    }

    pub fn put(mut self) -> Self {
        self.method = HttpMethod::Put;
        self
    }

    pub fn delete(mut self) -> Self {
        self.method = HttpMethod::Delete;
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Follow `Links.Next` until the server stops advancing it.
    pub fn continue_next(mut self) -> Self {
        self.paginate = true;
        self
    }

    // --- resources ---

    pub fn apps(self, app_id: Option<&str>) -> Self {
        self.select(Resource::Apps, app_id)
    }

    pub fn secret(self) -> Self {
        self.nested(Resource::Secret)
    }

    pub fn groups(self, group_id: Option<&str>) -> Self {
        self.select(Resource::Groups, group_id)
    }

    pub fn users(self, user_id: Option<&str>) -> Self {
        self.select(Resource::Users, user_id)
    }

    pub fn me(self) -> Self {
        self.nested(Resource::Me)
    }

    pub fn history(self) -> Self {
        self.nested(Resource::History)
    }

    /// Vehicle states, optionally at a point in time.
    pub fn states(mut self, time: Option<DateTime<Utc>>) -> Self {
        self.resource = Resource::States;
        let suffix = time.map(|t| format_timestamp(&t)).unwrap_or_default();
        self.append(&format!("{}{suffix}", Resource::States.segment()));
        self
    }

    pub fn locations(self) -> Self {
        self.nested(Resource::Locations)
    }

    pub fn image(self) -> Self {
        self.nested(Resource::Image)
    }

    pub fn mojios(self, mojio_id: Option<&str>) -> Self {
        self.select(Resource::Mojios, mojio_id)
    }

    pub fn phone_numbers(self, number: Option<&str>, send_verification: bool) -> Self {
        let mut builder = self.select(Resource::PhoneNumbers, number);
        if number.is_some() && send_verification {
            // Part of the URL whatever the method or body encoding.
            builder.append("?sendVerification=true");
        }
        builder
    }

    pub fn emails(self, email: Option<&str>) -> Self {
        self.select(Resource::Emails, email)
    }

    pub fn permission(self) -> Self {
        self.nested(Resource::Permission)
    }

    pub fn permissions(self) -> Self {
        self.nested(Resource::Permissions)
    }

    /// Tag sub-resource. The tag id is part of the path but does not
    /// replace the selected entity.
    pub fn tags(mut self, tag_id: &str) -> Self {
        self.resource = Resource::Tags;
        self.append(&format!("{}{}/", Resource::Tags.segment(), urlencoding::encode(tag_id)));
        self
    }

    pub fn trips(self, trip_id: Option<&str>) -> Self {
        self.select(Resource::Trips, trip_id)
    }

    pub fn vehicles(self, vehicle_id: Option<&str>) -> Self {
        self.select(Resource::Vehicles, vehicle_id)
    }

    /// Merge `actual_vehicle_id` into `vehicle_id`.
    pub fn merge_vehicles(self, vehicle_id: &str, actual_vehicle_id: &str) -> Self {
        let mut builder = self.select(Resource::Vehicles, Some(vehicle_id));
        builder
            .params
            .insert("actual".to_string(), actual_vehicle_id.to_string());
        builder
    }

    pub fn notification_settings(self) -> Self {
        self.nested(Resource::NotificationSettings)
    }

    pub fn address(self) -> Self {
        self.nested(Resource::Address)
    }

    pub fn vin(self) -> Self {
        self.nested(Resource::Vin)
    }

    pub fn service_schedule(self) -> Self {
        self.nested(Resource::ServiceSchedule)
    }

    pub fn next(self) -> Self {
        self.nested(Resource::Next)
    }

    pub fn activities(self) -> Self {
        self.nested(Resource::Activities)
    }

    pub fn wifi_radio(self) -> Self {
        self.nested(Resource::WifiRadio)
    }

    pub fn transactions(self, transaction_id: Option<&str>) -> Self {
        self.select(Resource::Transactions, transaction_id)
    }

    pub fn geofences(self, geofence_id: Option<&str>) -> Self {
        self.select(Resource::Geofences, geofence_id)
    }

    /// Aggregates of one kind: appends only `{kind}/`.
    pub fn aggregates(self, kind: Option<&str>) -> Self {
        self.keyed(Resource::Aggregates, kind)
    }

    pub fn statistics(self) -> Self {
        self.nested(Resource::Statistics)
    }

    pub fn diagnostic_codes(self, code: Option<&str>) -> Self {
        self.keyed(Resource::DiagnosticCodes, code)
    }

    pub fn polyline(self) -> Self {
        self.nested(Resource::Polyline)
    }

    /// Point the request at the v1 key/value store of the current entity,
    /// e.g. `vehicles/{id}/store/{key}`. Needs an entity id.
    pub fn storage(mut self, key: &str) -> Self {
        let Some(entity_id) = self.entity_id.as_deref() else {
            warn!(resource = %self.resource, key, "storage() ignored: no entity id selected");
            return self;
        };
        self.request_url = self.v1_url.as_ref().map(|v1| {
            format!(
                "{v1}{}{}/store/{}",
                self.resource.segment(),
                urlencoding::encode(entity_id),
                urlencoding::encode(key)
            )
        });
        self
    }

    /// Select a resource by tag; same effect as the matching typed call.
    pub fn resource(self, resource: Resource, id: Option<&str>) -> Self {
        match (resource, id) {
            (Resource::States, _) => self.states(None),
            (Resource::Tags, Some(tag_id)) => self.tags(tag_id),
            (Resource::Aggregates | Resource::DiagnosticCodes, key) => self.keyed(resource, key),
            (other, id) if other.takes_id() => self.select(other, id),
            (other, _) => self.nested(other),
        }
    }

    // --- parameters ---

    /// Merge query options into the pending parameters. Later values for the
    /// same key win.
    pub fn query(mut self, options: QueryOptions) -> Self {
        if let Some(count) = options.count {
            self.include_count = count;
        }
        for (key, value) in options.to_params() {
            self.params.insert(key.to_string(), value);
        }
        self
    }

    /// Replace the request URL with a server-provided next-page URL and drop
    /// the parameters, which the next URL already carries.
    pub fn follow(&mut self, next_url: &str) {
        self.request_url = Some(next_url.to_string());
        self.params.clear();
    }

    // --- accessors ---

    pub fn active_resource(&self) -> Resource {
        self.resource
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_url(&self) -> Option<&str> {
        self.request_url.as_deref()
    }

    pub fn push_url(&self) -> Option<&str> {
        self.push_url.as_deref()
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn http_method(&self) -> HttpMethod {
        self.method
    }

    pub fn paginates(&self) -> bool {
        self.paginate
    }

    /// Whether the query asked for `TotalCount`. Survives `follow`.
    pub fn include_count(&self) -> bool {
        self.include_count
    }

    // --- terminal ---

    /// Build the request for the current descriptor.
    pub fn build_request(
        &self,
        encoding: &BodyEncoding,
        context: &HeaderContext,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.request_url.clone().ok_or(ApiError::NoEndpoint)?;

        let request = match encoding {
            BodyEncoding::Query => {
                let pairs = self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()));
                let (url, body) = encode_params(self.method, url, pairs);
                HttpRequest {
                    method: self.method,
                    url,
                    headers: context.default_headers(),
                    body,
                }
            }
            BodyEncoding::RawString(raw) => HttpRequest {
                method: self.method,
                url,
                headers: context.default_headers(),
                body: Some(quote(raw)?),
            },
            BodyEncoding::Json(value) => {
                let body = serde_json::to_string(value)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                HttpRequest {
                    method: self.method,
                    url,
                    headers: context.default_headers(),
                    body: Some(body),
                }
            }
            BodyEncoding::Form(params) => {
                let pairs = params.iter().map(|(k, v)| (k.as_str(), v.as_str()));
                let (url, body) = encode_params(self.method, url, pairs);
                let mut headers: Vec<_> = context.authorization().into_iter().collect();
                if body.is_some() {
                    headers.push((
                        "Content-Type".to_string(),
                        "application/x-www-form-urlencoded; charset=utf-8".to_string(),
                    ));
                }
                HttpRequest {
                    method: self.method,
                    url,
                    headers,
                    body,
                }
            }
        };

        debug!(method = %request.method, url = %request.url, resource = %self.resource, "built request");
        Ok(request)
    }

    fn select(mut self, resource: Resource, id: Option<&str>) -> Self {
        self.resource = resource;
        self.entity_id = id.map(str::to_string);
        let fragment = match id {
            Some(id) => format!("{}{}/", resource.segment(), urlencoding::encode(id)),
            None => resource.segment().to_string(),
        };
        self.append(&fragment);
        if resource.is_push_capable() {
            if let Some(push) = self.push_url.as_mut() {
                push.push_str(&fragment);
            }
        }
        self
    }

    /// Sub-resource without an id of its own; the selected entity is kept.
    fn nested(mut self, resource: Resource) -> Self {
        self.resource = resource;
        self.append(resource.segment());
        if resource.is_push_capable() {
            if let Some(push) = self.push_url.as_mut() {
                push.push_str(resource.segment());
            }
        }
        self
    }

    /// Appends just `{key}/`, or nothing without a key.
    fn keyed(mut self, resource: Resource, key: Option<&str>) -> Self {
        self.resource = resource;
        if let Some(key) = key {
            self.append(&format!("{}/", urlencoding::encode(key)));
        }
        self
    }

    fn append(&mut self, fragment: &str) {
        if let Some(url) = self.request_url.as_mut() {
            url.push_str(fragment);
        }
    }
}

/// Put parameters in the query string for GET/DELETE or in a form body for
/// POST/PUT. Empty parameter sets leave the request untouched.
fn encode_params<'a>(
    method: HttpMethod,
    mut url: String,
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> (String, Option<String>) {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    let encoded = serializer.finish();
    if encoded.is_empty() {
        return (url, None);
    }
    if method.encodes_params_in_url() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&encoded);
        (url, None)
    } else {
        (url, Some(encoded))
    }
}

/// A string body is sent as a quoted, escaped literal.
fn quote(raw: &str) -> Result<String, ApiError> {
    serde_json::to_string(raw).map_err(|e| ApiError::Serialization(e.to_string()))
}
