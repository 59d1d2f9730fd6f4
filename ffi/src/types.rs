//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Payloads cross as JSON text so the
//! host decodes them with its own JSON library. Conversion functions live
//! here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use mojio_core::{
    ApiError, Cursor, EndpointBuilder, HttpMethod, HttpRequest, Resource, ResponseHandler,
};

/// Opaque handle to one logical call: the builder, its page cursor and the
/// response handler captured when the first request was built.
pub struct FfiBuilder {
    pub(crate) builder: EndpointBuilder,
    pub(crate) cursor: Cursor,
    pub(crate) handler: Option<ResponseHandler>,
}

impl FfiBuilder {
    pub(crate) fn new(builder: EndpointBuilder) -> Self {
        Self {
            builder,
            cursor: Cursor::new(),
            handler: None,
        }
    }

    /// Apply a consuming builder call in place.
    pub(crate) fn update(&mut self, f: impl FnOnce(EndpointBuilder) -> EndpointBuilder) {
        let builder = std::mem::take(&mut self.builder);
        self.builder = f(builder);
    }

    /// The handler bound at the first request, so later pages decode the same way.
    pub(crate) fn handler(&mut self) -> ResponseHandler {
        *self
            .handler
            .get_or_insert_with(|| ResponseHandler::for_request(&self.builder))
    }
}

/// Owned Rust string to a C string. Interior NULs yield an empty string.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Delete => HttpMethod::Delete,
        }
    }
}

/// Resource selector as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResource {
    Base = 0,
    Apps = 1,
    Secret = 2,
    Groups = 3,
    Users = 4,
    Me = 5,
    History = 6,
    States = 7,
    Locations = 8,
    Image = 9,
    Mojios = 10,
    Permission = 11,
    Permissions = 12,
    PhoneNumbers = 13,
    Emails = 14,
    Tags = 15,
    Trips = 16,
    Vehicles = 17,
    Address = 18,
    Vin = 19,
    ServiceSchedule = 20,
    Next = 21,
    Activities = 22,
    NotificationSettings = 23,
    WifiRadio = 24,
    Transactions = 25,
    Geofences = 26,
    Aggregates = 27,
    Statistics = 28,
    DiagnosticCodes = 29,
    Polyline = 30,
}

impl From<FfiResource> for Resource {
    fn from(r: FfiResource) -> Self {
        match r {
            FfiResource::Base => Resource::Base,
            FfiResource::Apps => Resource::Apps,
            FfiResource::Secret => Resource::Secret,
            FfiResource::Groups => Resource::Groups,
            FfiResource::Users => Resource::Users,
            FfiResource::Me => Resource::Me,
            FfiResource::History => Resource::History,
            FfiResource::States => Resource::States,
            FfiResource::Locations => Resource::Locations,
            FfiResource::Image => Resource::Image,
            FfiResource::Mojios => Resource::Mojios,
            FfiResource::Permission => Resource::Permission,
            FfiResource::Permissions => Resource::Permissions,
            FfiResource::PhoneNumbers => Resource::PhoneNumbers,
            FfiResource::Emails => Resource::Emails,
            FfiResource::Tags => Resource::Tags,
            FfiResource::Trips => Resource::Trips,
            FfiResource::Vehicles => Resource::Vehicles,
            FfiResource::Address => Resource::Address,
            FfiResource::Vin => Resource::Vin,
            FfiResource::ServiceSchedule => Resource::ServiceSchedule,
            FfiResource::Next => Resource::Next,
            FfiResource::Activities => Resource::Activities,
            FfiResource::NotificationSettings => Resource::NotificationSettings,
            FfiResource::WifiRadio => Resource::WifiRadio,
            FfiResource::Transactions => Resource::Transactions,
            FfiResource::Geofences => Resource::Geofences,
            FfiResource::Aggregates => Resource::Aggregates,
            FfiResource::Statistics => Resource::Statistics,
            FfiResource::DiagnosticCodes => Resource::DiagnosticCodes,
            FfiResource::Polyline => Resource::Polyline,
        }
    }
}

/// How `mojio_build_request` fills the body.
///
/// - `Query`: builder parameters (the `body` argument is ignored).
/// - `RawString`: `body` sent as a quoted string literal.
/// - `Json`: `body` is a JSON document.
/// - `Form`: `body` is `key=value&...`; only `Authorization` is attached.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiBodyEncoding {
    Query = 0,
    RawString = 1,
    Json = 2,
    Form = 3,
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `mojio_build_request`. The C caller executes the request and
/// passes the response back through `mojio_handle_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = c_string(req.url);
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request, then
/// passes a pointer to `mojio_handle_response`. The FFI layer reads but does
/// not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NoEndpoint = 1,
    Transport = 2,
    Server = 3,
    RequestFailed = 4,
    Decode = 5,
    Serialization = 6,
    Config = 7,
    Panic = 8,
    NullArg = 9,
}

/// Result envelope for `mojio_handle_response`.
///
/// On success `error_code` is `Ok` and `payload_json` holds the serialized
/// payload (`{"kind": "...", "value": ...}`). `has_next` means the builder
/// already points at the next page and the host should build and execute
/// another request. `complete` marks the end of a paginated call.
///
/// On failure `error_message` is set; for `Server` errors `payload_json`
/// carries the server's error object and `http_status` its status.
#[repr(C)]
pub struct FfiMojioResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub payload_json: *mut c_char,
    pub has_next: bool,
    pub complete: bool,
}

impl FfiMojioResult {
    fn boxed(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    pub(crate) fn ok(payload_json: String, has_next: bool, complete: bool) -> *mut Self {
        FfiMojioResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            payload_json: c_string(payload_json),
            has_next,
            complete,
        }
        .boxed()
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, http_status, payload_json) = match &err {
            ApiError::NoEndpoint => (FfiErrorCode::NoEndpoint, 0, std::ptr::null_mut()),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0, std::ptr::null_mut()),
            ApiError::Server { status, body } => {
                (FfiErrorCode::Server, *status, c_string(body.to_string()))
            }
            ApiError::RequestFailed => (FfiErrorCode::RequestFailed, 0, std::ptr::null_mut()),
            ApiError::Decode { .. } => (FfiErrorCode::Decode, 0, std::ptr::null_mut()),
            ApiError::Serialization(_) => (FfiErrorCode::Serialization, 0, std::ptr::null_mut()),
            ApiError::Config(_) => (FfiErrorCode::Config, 0, std::ptr::null_mut()),
        };

        FfiMojioResult {
            error_code,
            error_message: c_string(err.to_string()),
            http_status,
            payload_json,
            has_next: false,
            complete: false,
        }
        .boxed()
    }

    pub(crate) fn failure(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        FfiMojioResult {
            error_code,
            error_message: c_string(msg),
            http_status: 0,
            payload_json: std::ptr::null_mut(),
            has_next: false,
            complete: false,
        }
        .boxed()
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg)
    }
}
