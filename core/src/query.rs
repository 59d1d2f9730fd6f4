//! Query options for list endpoints.
//!
//! `QueryOptions` is the structured bag behind `EndpointBuilder::query`.
//! Absent options never produce a parameter. Timestamps are sent in UTC as
//! `yyyy-MM-ddTHH:mm:ss.SSSZ`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Parameter that asks the server for `TotalCount` in list envelopes.
pub const INCLUDE_COUNT: &str = "includeCount";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub filter: Option<String>,
    pub select: Option<String>,
    pub orderby: Option<String>,
    pub count: Option<bool>,
    pub since: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub fields: Vec<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn orderby(mut self, orderby: impl Into<String>) -> Self {
        self.orderby = Some(orderby.into());
        self
    }

    pub fn count(mut self, count: bool) -> Self {
        self.count = Some(count);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn before(mut self, before: DateTime<Utc>) -> Self {
        self.before = Some(before);
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Wire parameters for the options that are set.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(top) = self.top {
            params.push(("top", top.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("skip", skip.to_string()));
        }
        if let Some(filter) = &self.filter {
            params.push(("filter", filter.clone()));
        }
        if let Some(select) = &self.select {
            params.push(("select", select.clone()));
        }
        if let Some(orderby) = &self.orderby {
            params.push(("orderby", orderby.clone()));
        }
        if let Some(count) = self.count {
            params.push((INCLUDE_COUNT, count.to_string()));
        }
        if let Some(since) = &self.since {
            params.push(("since", format_timestamp(since)));
        }
        if let Some(before) = &self.before {
            params.push(("before", format_timestamp(before)));
        }
        if !self.fields.is_empty() {
            params.push(("fields", self.fields.join(",")));
        }
        params
    }

    /// `application/x-www-form-urlencoded` form of `to_params`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_params() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    /// Parse a query string produced by `to_query_string`. Unknown keys are
    /// ignored.
    pub fn from_query_string(query: &str) -> Result<Self, ApiError> {
        let mut options = QueryOptions::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "top" => options.top = Some(parse_number(&key, &value)?),
                "skip" => options.skip = Some(parse_number(&key, &value)?),
                "filter" => options.filter = Some(value.into_owned()),
                "select" => options.select = Some(value.into_owned()),
                "orderby" => options.orderby = Some(value.into_owned()),
                INCLUDE_COUNT => {
                    let count = value
                        .parse::<bool>()
                        .map_err(|_| invalid_value(&key, &value))?;
                    options.count = Some(count);
                }
                "since" => options.since = Some(parse_timestamp(&value)?),
                "before" => options.before = Some(parse_timestamp(&value)?),
                "fields" => {
                    options.fields = value
                        .split(',')
                        .filter(|f| !f.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                _ => {}
            }
        }
        Ok(options)
    }
}

/// Format a timestamp the way the platform expects in `since`/`before` and
/// in `states/` paths.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ApiError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| invalid_value("timestamp", value))
}

fn parse_number(key: &str, value: &str) -> Result<u32, ApiError> {
    value.parse().map_err(|_| invalid_value(key, value))
}

fn invalid_value(key: &str, value: &str) -> ApiError {
    ApiError::Config(format!("invalid query value for {key}: {value:?}"))
}
