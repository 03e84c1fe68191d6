// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Event retrieval: fetch, filter by message, newest first, truncate.
//!
//! Raw core/v1 events are flattened into summaries before filtering so the
//! sort keys (`lastTime`, `firstTime`, `eventTime`) are always top-level.

use chrono::{DateTime, FixedOffset};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::ClusterBackend;
use crate::error::{InspectError, Result};
use crate::projection::extract_path;

/// Default number of events returned
pub const DEFAULT_MAX_EVENTS: usize = 20;

/// Timestamp an event list can be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum EventSortField {
    /// Last time the event was observed
    #[default]
    LastTime,
    /// First time the event was observed
    FirstTime,
    /// Event creation time (events.k8s.io style micro time)
    EventTime,
}

impl EventSortField {
    pub const ALL: [EventSortField; 3] = [Self::LastTime, Self::FirstTime, Self::EventTime];

    /// Key of this timestamp in an event summary
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastTime => "lastTime",
            Self::FirstTime => "firstTime",
            Self::EventTime => "eventTime",
        }
    }
}

impl fmt::Display for EventSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSortField {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                InspectError::invalid_parameter(
                    "sortBy",
                    format!("'{}' is not one of lastTime, firstTime, eventTime", s),
                )
            })
    }
}

/// Defaults applied when the caller leaves a field unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EventDefaults {
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    #[serde(default)]
    pub sort_by: EventSortField,
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

impl Default for EventDefaults {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            sort_by: EventSortField::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// None lists events across all namespaces
    pub namespace: Option<String>,
    /// Case-insensitive substring to look for in the message
    pub message_filter: Option<String>,
    pub sort_by: Option<EventSortField>,
    /// Zero or negative falls back to the default
    pub max_events: Option<i64>,
}

impl EventQuery {
    fn effective_limit(&self, defaults: &EventDefaults) -> usize {
        match self.max_events {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ => defaults.max_events.max(1),
        }
    }
}

/// Fetch events and apply filter, ordering and limit
pub async fn get_events(
    backend: &dyn ClusterBackend,
    query: &EventQuery,
    defaults: &EventDefaults,
) -> Result<Vec<Value>> {
    let raw = backend.list_events(query.namespace.as_deref()).await?;
    let fetched = raw.len();

    let summaries = raw.iter().map(summarize_event).collect();
    let sort_by = query.sort_by.unwrap_or(defaults.sort_by);
    let limit = query.effective_limit(defaults);
    let events = select_events(summaries, query.message_filter.as_deref(), sort_by, limit);

    tracing::debug!(
        namespace = ?query.namespace,
        fetched,
        returned = events.len(),
        sort_by = %sort_by,
        "Selected events"
    );

    Ok(events)
}

/// Filter, sort newest first and truncate a list of event summaries
pub fn select_events(
    events: Vec<Value>,
    message_filter: Option<&str>,
    sort_by: EventSortField,
    limit: usize,
) -> Vec<Value> {
    let mut events: Vec<Value> = match message_filter.map(str::to_lowercase) {
        Some(needle) if !needle.is_empty() => events
            .into_iter()
            .filter(|e| message_matches(e, &needle))
            .collect(),
        _ => events,
    };

    sort_newest_first(&mut events, sort_by);
    events.truncate(limit);
    events
}

fn message_matches(event: &Value, needle_lower: &str) -> bool {
    event
        .get("message")
        .and_then(Value::as_str)
        .is_some_and(|m| m.to_lowercase().contains(needle_lower))
}

fn timestamp(event: &Value, field: EventSortField) -> Option<DateTime<FixedOffset>> {
    let raw = event.get(field.as_str())?.as_str()?;
    DateTime::parse_from_rfc3339(raw).ok()
}

/// Stable descending sort; events without a usable timestamp go last
pub fn sort_newest_first(events: &mut [Value], field: EventSortField) {
    events.sort_by(|a, b| match (timestamp(a, field), timestamp(b, field)) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// First of `paths` holding a non-null value
fn first_present(raw: &Value, paths: &[&str]) -> Value {
    paths
        .iter()
        .filter_map(|p| extract_path(raw, p))
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or(Value::Null)
}

/// Flatten a raw core/v1 event into the summary shape
pub fn summarize_event(raw: &Value) -> Value {
    let field = |path: &str| extract_path(raw, path).cloned().unwrap_or(Value::Null);

    let mut summary = Map::new();
    summary.insert("name".into(), field("metadata.name"));
    summary.insert("namespace".into(), field("metadata.namespace"));
    summary.insert("type".into(), field("type"));
    summary.insert("reason".into(), field("reason"));
    summary.insert("message".into(), field("message"));
    summary.insert("count".into(), field("count"));
    summary.insert(
        "firstTime".into(),
        first_present(raw, &["firstTimestamp", "eventTime", "metadata.creationTimestamp"]),
    );
    summary.insert(
        "lastTime".into(),
        first_present(
            raw,
            &[
                "lastTimestamp",
                "series.lastObservedTime",
                "eventTime",
                "metadata.creationTimestamp",
            ],
        ),
    );
    summary.insert("eventTime".into(), field("eventTime"));
    summary.insert(
        "involvedObject".into(),
        json!({
            "kind": field("involvedObject.kind"),
            "name": field("involvedObject.name"),
            "namespace": field("involvedObject.namespace"),
        }),
    );
    summary.insert(
        "source".into(),
        first_present(raw, &["source.component", "reportingComponent"]),
    );
    Value::Object(summary)
}
