//! Endpoint configuration.
//!
//! # Design
//! A `ClientEnvironment` names the three base URLs the SDK talks to: the v2
//! REST API, the legacy v1 API (used only for key/value storage) and the push
//! websocket endpoint. Any of them may be missing; builders created from an
//! environment without an API endpoint fail with `ApiError::NoEndpoint` at
//! the first terminal call instead of at construction.

use std::env;

use crate::error::ApiError;

const PRODUCTION_API: &str = "https://api.moj.io/v2/";
const PRODUCTION_V1_API: &str = "https://api.moj.io/v1/";
const PRODUCTION_PUSH: &str = "wss://push.moj.io/v2/";
const STAGING_API: &str = "https://staging-api.moj.io/v2/";
const STAGING_V1_API: &str = "https://staging-api.moj.io/v1/";
const STAGING_PUSH: &str = "wss://staging-push.moj.io/v2/";

const FALLBACK_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientEnvironment {
    pub api_endpoint: Option<String>,
    pub v1_api_endpoint: Option<String>,
    pub push_endpoint: Option<String>,
}

impl ClientEnvironment {
    pub fn production() -> Self {
        Self::custom(PRODUCTION_API, PRODUCTION_V1_API, PRODUCTION_PUSH)
    }

    pub fn staging() -> Self {
        Self::custom(STAGING_API, STAGING_V1_API, STAGING_PUSH)
    }

    pub fn custom(api: &str, v1_api: &str, push: &str) -> Self {
        Self::from_parts(Some(api), Some(v1_api), Some(push))
    }

    /// Like `custom`, but any endpoint may be absent.
    pub fn from_parts(api: Option<&str>, v1_api: Option<&str>, push: Option<&str>) -> Self {
        Self {
            api_endpoint: api.map(normalize),
            v1_api_endpoint: v1_api.map(normalize),
            push_endpoint: push.map(normalize),
        }
    }

    /// Production endpoints, overridden by `MOJIO_API_URL`,
    /// `MOJIO_V1_API_URL` and `MOJIO_PUSH_URL` when set.
    pub fn from_env() -> Result<Self, ApiError> {
        let mut environment = Self::production();
        if let Some(api) = read_url("MOJIO_API_URL")? {
            environment.api_endpoint = Some(api);
        }
        if let Some(v1) = read_url("MOJIO_V1_API_URL")? {
            environment.v1_api_endpoint = Some(v1);
        }
        if let Some(push) = read_url("MOJIO_PUSH_URL")? {
            environment.push_endpoint = Some(push);
        }
        Ok(environment)
    }
}

fn read_url(var: &str) -> Result<Option<String>, ApiError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => {
            let value = normalize(value.trim());
            url::Url::parse(&value)
                .map_err(|e| ApiError::Config(format!("{var} is not a valid URL: {e}")))?;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}

/// Builder calls append fragments directly, so every base URL ends with `/`.
fn normalize(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// The user's preferred language tags, most preferred first.
///
/// Reads the colon-separated `LANGUAGE` list, then `LANG`, converting POSIX
/// locale names (`en_US.UTF-8`) to language tags (`en-US`).
pub fn preferred_languages_from_env() -> Vec<String> {
    let raw = env::var("LANGUAGE")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| env::var("LANG").ok());
    let languages = raw.as_deref().map(parse_locale_list).unwrap_or_default();
    if languages.is_empty() {
        vec![FALLBACK_LANGUAGE.to_string()]
    } else {
        languages
    }
}

fn parse_locale_list(raw: &str) -> Vec<String> {
    raw.split(':')
        .filter_map(|locale| {
            let name = locale.split(['.', '@']).next().unwrap_or_default();
            if name.is_empty() || name == "C" || name == "POSIX" {
                None
            } else {
                Some(name.replace('_', "-"))
            }
        })
        .collect()
}
