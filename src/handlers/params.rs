// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Parameter structs for every tool.
//!
//! Optional strings treat `""` and `null` as "not supplied", which is how most
//! tool-calling clients express an unset argument. Anything else is kept as
//! the caller sent it: selectors and message filters are never trimmed.
//! Required strings stay `Option` here so a missing one is reported by name
//! (see `args::require`).

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};

use crate::kubernetes::events::EventSortField;

// ── listResources ──

/// Parameters for the `listResources` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesParams {
    #[serde(rename = "Kind")]
    #[schemars(required)]
    #[schemars(description = "Resource kind, plural or short name (e.g. Pod, deployments, svc)")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    #[schemars(description = "Namespace; all namespaces when omitted")]
    pub namespace: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    #[schemars(description = "Label selector (e.g. app=nginx)")]
    pub label_selector: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    #[schemars(description = "Field selector (e.g. status.phase=Running)")]
    pub field_selector: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    #[schemars(description = "Comma-separated dot paths to keep (e.g. metadata.name,status.phase)")]
    pub field_paths: Option<String>,
}

// ── getResource ──

/// Parameters for the `getResource` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetResourceParams {
    #[schemars(required)]
    #[schemars(description = "Resource kind")]
    pub kind: Option<String>,
    #[schemars(required)]
    #[schemars(description = "Resource name")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    #[schemars(
        description = "Namespace of a namespaced resource; the kubeconfig namespace when omitted"
    )]
    pub namespace: Option<String>,
}

// ── getAPIResources ──

/// Parameters for the `getAPIResources` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetApiResourcesParams {
    #[serde(default)]
    #[schemars(description = "Include namespace-scoped kinds (default: true)")]
    pub include_namespace_scoped: Option<bool>,
    #[serde(default)]
    #[schemars(description = "Include cluster-scoped kinds (default: true)")]
    pub include_cluster_scoped: Option<bool>,
}

// ── getEvents ──

/// Parameters for the `getEvents` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetEventsParams {
    #[serde(default, deserialize_with = "non_empty")]
    #[schemars(description = "Namespace; all namespaces when omitted")]
    pub namespace: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    #[schemars(description = "Case-insensitive text the message must contain")]
    pub message_filter: Option<String>,
    #[serde(default, deserialize_with = "sort_field")]
    #[schemars(description = "Timestamp to order by, newest first (default: lastTime)")]
    pub sort_by: Option<EventSortField>,
    #[serde(default, deserialize_with = "whole_number")]
    #[schemars(with = "Option<f64>")]
    #[schemars(description = "Maximum events to return; 0 or less uses the default (20)")]
    pub max_events: Option<i64>,
}

/// Optional string where `""` counts as absent
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Case-insensitive sort field name
fn sort_field<'de, D>(deserializer: D) -> Result<Option<EventSortField>, D::Error>
where
    D: Deserializer<'de>,
{
    non_empty(deserializer)?
        .map(|s| s.parse::<EventSortField>())
        .transpose()
        .map_err(serde::de::Error::custom)
}

/// Integer that may arrive as a float (5.0); fractions are truncated
fn whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(|f| f.trunc() as i64))
}
