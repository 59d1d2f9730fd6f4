//! C-ABI wrapper around `mojio-core`.
//!
//! # Overview
//! Lets a mobile host (Swift, Kotlin via JNI, ...) build moj.io requests and
//! classify the responses while doing the networking itself. A typical call:
//!
//! 1. `mojio_builder_new`, then `mojio_builder_resource` / `_query_json` /
//!    `_method` / `_continue_next` to describe the call.
//! 2. `mojio_build_request`, execute it, `mojio_handle_response`.
//! 3. While the result has `has_next`, repeat step 2.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Payloads cross as JSON text (`{"kind": ..., "value": ...}`).
//! - The C caller owns all returned pointers and must call the matching
//!   `mojio_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use mojio_core::{
    BodyEncoding, ClientEnvironment, EndpointBuilder, HeaderContext, HttpResponse, PageStep,
    Payload, QueryOptions,
};
use serde_json::Value;

use types::*;

/// Borrow a C string; null or invalid UTF-8 yields `None`.
fn opt_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

/// Run `f` on the builder behind `builder`; false if it is null or panics.
fn with_builder(builder: *mut FfiBuilder, f: impl FnOnce(&mut FfiBuilder)) -> bool {
    if builder.is_null() {
        return false;
    }
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        f(unsafe { &mut *builder });
    }))
    .is_ok()
}

// ---------------------------------------------------------------------------
// Builder lifecycle
// ---------------------------------------------------------------------------

/// Create a builder rooted at the given endpoints. Any endpoint may be null;
/// a null `api_url` makes `mojio_build_request` return null.
///
/// The caller must free the returned pointer with `mojio_builder_free`.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_builder_new(
    api_url: *const c_char,
    v1_api_url: *const c_char,
    push_url: *const c_char,
) -> *mut FfiBuilder {
    catch_unwind(|| {
        let environment =
            ClientEnvironment::from_parts(opt_str(api_url), opt_str(v1_api_url), opt_str(push_url));
        let builder = FfiBuilder::new(EndpointBuilder::new(&environment));
        Box::into_raw(Box::new(builder))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a builder created by `mojio_builder_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_builder_free(builder: *mut FfiBuilder) {
    if !builder.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(builder) });
        });
    }
}

// ---------------------------------------------------------------------------
// Builder calls
// ---------------------------------------------------------------------------

/// Append a resource, with an optional (nullable) id.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_builder_resource(
    builder: *mut FfiBuilder,
    resource: FfiResource,
    id: *const c_char,
) -> bool {
    let id = opt_str(id);
    with_builder(builder, |b| b.update(|inner| inner.resource(resource.into(), id)))
}

/// Point the builder at the v1 key/value store of its current entity.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_builder_storage(builder: *mut FfiBuilder, key: *const c_char) -> bool {
    let Some(key) = opt_str(key) else {
        return false;
    };
    with_builder(builder, |b| b.update(|inner| inner.storage(key)))
}

#[unsafe(no_mangle)]
pub extern "C" fn mojio_builder_method(builder: *mut FfiBuilder, method: FfiHttpMethod) -> bool {
    with_builder(builder, |b| b.update(|inner| inner.method(method.into())))
}

/// Follow `Links.Next` until the server stops advancing it.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_builder_continue_next(builder: *mut FfiBuilder) -> bool {
    with_builder(builder, |b| b.update(EndpointBuilder::continue_next))
}

/// Merge query options given as JSON, e.g. `{"top": 20, "count": true}`.
/// Returns false if the JSON does not describe query options.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_builder_query_json(builder: *mut FfiBuilder, options_json: *const c_char) -> bool {
    let Some(options) = opt_str(options_json).and_then(|json| serde_json::from_str::<QueryOptions>(json).ok())
    else {
        return false;
    };
    with_builder(builder, |b| b.update(|inner| inner.query(options)))
}

/// Current request URL, or null. Free with `mojio_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_builder_url(builder: *const FfiBuilder) -> *mut c_char {
    if builder.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(|| match unsafe { &*builder }.builder.request_url() {
        Some(url) => c_string(url),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Push (websocket) URL matching the selected resources, or null. Free with
/// `mojio_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_builder_push_url(builder: *const FfiBuilder) -> *mut c_char {
    if builder.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(|| match unsafe { &*builder }.builder.push_url() {
        Some(url) => c_string(url),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

fn body_encoding(encoding: FfiBodyEncoding, body: Option<&str>) -> Option<BodyEncoding> {
    match encoding {
        FfiBodyEncoding::Query => Some(BodyEncoding::Query),
        FfiBodyEncoding::RawString => Some(BodyEncoding::RawString(body?.to_string())),
        FfiBodyEncoding::Json => serde_json::from_str::<Value>(body?).ok().map(BodyEncoding::Json),
        FfiBodyEncoding::Form => {
            let pairs = url::form_urlencoded::parse(body.unwrap_or_default().as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            Some(BodyEncoding::Form(pairs))
        }
    }
}

/// Build the next request for this builder.
///
/// `body` is interpreted per `encoding`. `access_token` and `languages_csv`
/// (e.g. `"en-US,fr"`) may be null. Returns null if the builder is null, has
/// no endpoint, or the body does not fit the encoding.
///
/// The caller must free the returned pointer with `mojio_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_build_request(
    builder: *mut FfiBuilder,
    encoding: FfiBodyEncoding,
    body: *const c_char,
    access_token: *const c_char,
    languages_csv: *const c_char,
) -> *mut FfiHttpRequest {
    if builder.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        let b = unsafe { &mut *builder };
        let Some(encoding) = body_encoding(encoding, opt_str(body)) else {
            return std::ptr::null_mut();
        };
        let languages = opt_str(languages_csv)
            .map(|csv| {
                csv.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let context = HeaderContext::new(opt_str(access_token).map(str::to_string), languages);

        // Bind the decoder before the first request goes out.
        b.handler();
        match b.builder.build_request(&encoding, &context) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }
            .to_string_lossy()
            .into_owned()
    };
    HttpResponse::new(resp.status, body)
}

/// Classify the response to the last request built from `builder`.
///
/// For paginated calls a list payload advances the page cursor: when
/// `has_next` is set the builder already points at the next page. When the
/// cursor converges, `complete` is set.
///
/// The caller must free the returned pointer with `mojio_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_handle_response(
    builder: *mut FfiBuilder,
    response: *const FfiHttpResponse,
) -> *mut FfiMojioResult {
    if builder.is_null() {
        return FfiMojioResult::null_arg("builder");
    }
    if response.is_null() {
        return FfiMojioResult::null_arg("response");
    }
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        let b = unsafe { &mut *builder };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        let handled = match b.handler().handle(&core_resp) {
            Ok(handled) => handled,
            Err(e) => return FfiMojioResult::from_error(e),
        };
        let step = b.cursor.step(&mut b.builder, &handled);
        let json = match serde_json::to_string(&handled.payload) {
            Ok(json) => json,
            Err(e) => return FfiMojioResult::failure(FfiErrorCode::Serialization, &e.to_string()),
        };
        FfiMojioResult::ok(
            json,
            matches!(step, PageStep::Follow(_)),
            matches!(step, PageStep::Complete),
        )
    }))
    .unwrap_or_else(|_| FfiMojioResult::panic("panic in mojio_handle_response"))
}

/// JSON of the `PaginationComplete` payload, for hosts that forward payloads
/// verbatim. Free with `mojio_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_pagination_complete_json() -> *mut c_char {
    catch_unwind(|| match serde_json::to_string(&Payload::PaginationComplete) {
        Ok(json) => c_string(json),
        Err(_) => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `mojio_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiMojioResult` returned by `mojio_handle_response`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_free_result(result: *mut FfiMojioResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.payload_json.is_null() {
            drop(unsafe { CString::from_raw(result.payload_json) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mojio_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
