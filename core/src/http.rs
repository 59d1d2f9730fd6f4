//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `EndpointBuilder::build_request`
//! produces an `HttpRequest`, something executes it (the async `Dispatcher`
//! through a `Transport`, or a mobile host through the FFI) and the resulting
//! `HttpResponse` goes to `ResponseHandler::handle`. All fields use owned
//! types so values can cross FFI boundaries without lifetime concerns.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of preferred languages advertised in `Accept-Language`.
const MAX_LANGUAGES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Methods whose parameters travel in the query string rather than the body.
    pub fn encodes_params_in_url(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the request body (and the builder's parameters) are encoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BodyEncoding {
    /// Builder parameters in the query string (GET/DELETE) or as a form body
    /// (POST/PUT).
    #[default]
    Query,
    /// A single string sent as a quoted literal body.
    RawString(String),
    /// A JSON document as body.
    Json(Value),
    /// Explicit parameters instead of the builder's, with only the
    /// `Authorization` header attached.
    Form(Vec<(String, String)>),
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Per-request header inputs: the access token (read fresh from the token
/// store) and the user's preferred languages, most preferred first.
#[derive(Debug, Clone, Default)]
pub struct HeaderContext {
    pub access_token: Option<String>,
    pub languages: Vec<String>,
}

impl HeaderContext {
    pub fn new(access_token: Option<String>, languages: Vec<String>) -> Self {
        Self {
            access_token,
            languages,
        }
    }

    /// Headers sent with every builder request.
    pub fn default_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(4);
        let language = accept_language(&self.languages);
        if !language.is_empty() {
            headers.push(("Accept-Language".to_string(), language));
        }
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        headers.push(("Accept".to_string(), "application/json".to_string()));
        headers.extend(self.authorization());
        headers
    }

    /// Only the bearer header, used by `BodyEncoding::Form`.
    pub fn authorization(&self) -> Option<(String, String)> {
        self.access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(|token| ("Authorization".to_string(), format!("Bearer {token}")))
    }
}

/// Build an RFC 7231 `Accept-Language` value from the first six language
/// tags, weighted 1.0, 0.9, 0.8... A tag with a region also advertises its
/// bare language at the same weight (`en-US,en;q=1.0`).
pub fn accept_language<S: AsRef<str>>(languages: &[S]) -> String {
    languages
        .iter()
        .map(AsRef::as_ref)
        .filter(|tag| !tag.is_empty())
        .take(MAX_LANGUAGES)
        .enumerate()
        .map(|(index, tag)| {
            let quality = 1.0 - index as f64 * 0.1;
            match tag.split_once('-') {
                Some((language, _)) if !language.is_empty() => {
                    format!("{tag},{language};q={quality:.1}")
                }
                _ => format!("{tag};q={quality:.1}"),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_language_weights_by_position() {
        let value = accept_language(&["en-US", "fr", "de-CH"]);
        assert_eq!(value, "en-US,en;q=1.0, fr;q=0.9, de-CH,de;q=0.8");
    }

    #[test]
    fn accept_language_caps_at_six() {
        let tags = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let value = accept_language(&tags);
        assert_eq!(value.split(", ").count(), 6);
        assert!(value.ends_with("f;q=0.5"));
        assert!(!value.contains('g'));
    }

    #[test]
    fn accept_language_empty() {
        let none: [&str; 0] = [];
        assert_eq!(accept_language(&none), "");
    }

    #[test]
    fn default_headers_include_bearer_when_token_present() {
        let ctx = HeaderContext::new(Some("abc".into()), vec!["en-US".into()]);
        let headers = ctx.default_headers();
        assert!(headers.contains(&("Authorization".to_string(), "Bearer abc".to_string())));
        assert!(headers.contains(&("Accept".to_string(), "application/json".to_string())));
        assert!(headers.contains(&("Content-Type".to_string(), "application/json".to_string())));
        assert_eq!(headers[0].0, "Accept-Language");
    }

    #[test]
    fn default_headers_without_token() {
        let ctx = HeaderContext::new(None, Vec::new());
        let headers = ctx.default_headers();
        assert!(headers.iter().all(|(k, _)| k != "Authorization" && k != "Accept-Language"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn get_and_delete_use_query_string() {
        assert!(HttpMethod::Get.encodes_params_in_url());
        assert!(HttpMethod::Delete.encodes_params_in_url());
        assert!(!HttpMethod::Post.encodes_params_in_url());
    }
}
