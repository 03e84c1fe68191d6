// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Tool handlers: validate arguments, query the cluster, encode the result.
//!
//! Every call is independent. The only shared state is the backend handle,
//! which is read-only, so a `Toolbox` can serve concurrent calls directly.

pub mod args;
pub mod params;

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{InspectError, Result};
use crate::kubernetes::discovery::filter_by_scope;
use crate::kubernetes::events::{self, EventDefaults, EventQuery};
use crate::kubernetes::{ClusterBackend, ResourceQuery};
use crate::output::ToolResponse;
use crate::projection::Projection;
use args::{Arguments, parse_params, require};
use params::{GetApiResourcesParams, GetEventsParams, GetResourceParams, ListResourcesParams};

/// Default deadline for a single call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// The tools this crate serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ListResources,
    GetResource,
    GetApiResources,
    GetEvents,
}

impl Tool {
    pub const ALL: [Tool; 4] = [
        Self::ListResources,
        Self::GetResource,
        Self::GetApiResources,
        Self::GetEvents,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ListResources => "listResources",
            Self::GetResource => "getResource",
            Self::GetApiResources => "getAPIResources",
            Self::GetEvents => "getEvents",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ListResources => {
                "List Kubernetes resources of a kind, optionally filtered by namespace, \
                 label selector and field selector, and projected onto selected fields"
            }
            Self::GetResource => "Get a single Kubernetes resource by kind and name",
            Self::GetApiResources => {
                "List the resource kinds served by the cluster with their group, version \
                 and scope"
            }
            Self::GetEvents => {
                "Get recent Kubernetes events, newest first, optionally filtered by \
                 namespace and message text"
            }
        }
    }

    /// JSON schema of the tool's arguments
    pub fn input_schema(&self) -> Value {
        let schema = match self {
            Self::ListResources => schemars::schema_for!(ListResourcesParams),
            Self::GetResource => schemars::schema_for!(GetResourceParams),
            Self::GetApiResources => schemars::schema_for!(GetApiResourcesParams),
            Self::GetEvents => schemars::schema_for!(GetEventsParams),
        };
        Value::from(schema)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| InspectError::InvalidArgument(format!("unknown tool: {}", s)))
    }
}

/// Advertised description of a tool
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    Tool::ALL
        .iter()
        .map(|t| ToolDefinition {
            name: t.name(),
            description: t.description(),
            input_schema: t.input_schema(),
        })
        .collect()
}

/// Per-process settings applied to every call
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub call_timeout: Duration,
    pub events: EventDefaults,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            events: EventDefaults::default(),
        }
    }
}

/// Dispatches tool calls against a cluster backend
pub struct Toolbox {
    backend: Arc<dyn ClusterBackend>,
    settings: ToolSettings,
}

impl Toolbox {
    pub fn new(backend: Arc<dyn ClusterBackend>, settings: ToolSettings) -> Self {
        Self { backend, settings }
    }

    /// Run the named tool.
    ///
    /// The call gives up with `BackendUnavailable` once the configured
    /// timeout passes, and with `Cancelled` as soon as `cancel` fires; in
    /// both cases the in-flight backend request is dropped.
    pub async fn call(
        &self,
        name: &str,
        args: &Arguments,
        cancel: &CancellationToken,
    ) -> Result<ToolResponse> {
        let tool: Tool = name.parse()?;
        let start = Instant::now();
        let timeout = self.settings.call_timeout;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(InspectError::Cancelled),
            outcome = tokio::time::timeout(timeout, self.dispatch(tool, args)) => {
                outcome.unwrap_or_else(|_| {
                    Err(InspectError::BackendUnavailable(format!(
                        "{} timed out after {}s",
                        tool,
                        timeout.as_secs_f64()
                    )))
                })
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(tool = %tool, elapsed_ms, "Tool call completed"),
            Err(e) => warn!(tool = %tool, elapsed_ms, code = e.code(), error = %e, "Tool call failed"),
        }
        result
    }

    async fn dispatch(&self, tool: Tool, args: &Arguments) -> Result<ToolResponse> {
        match tool {
            Tool::ListResources => self.list_resources(args).await,
            Tool::GetResource => self.get_resource(args).await,
            Tool::GetApiResources => self.get_api_resources(args).await,
            Tool::GetEvents => self.get_events(args).await,
        }
    }

    async fn list_resources(&self, args: &Arguments) -> Result<ToolResponse> {
        let params: ListResourcesParams = parse_params(Tool::ListResources.name(), args)?;
        let kind = require(&params.kind, "Kind")?;
        let query = ResourceQuery::new(kind)
            .namespace(params.namespace)
            .label_selector(params.label_selector)
            .field_selector(params.field_selector);
        let projection = params
            .field_paths
            .as_deref()
            .map(Projection::parse)
            .unwrap_or_default();

        let items = self.backend.list(&query).await?;
        debug!(
            kind = %query.kind,
            items = items.len(),
            projected = !projection.is_identity(),
            "Listed resources"
        );

        let items: Vec<Value> = items
            .into_iter()
            .map(|item| projection.apply(item))
            .collect();
        ToolResponse::json(&items)
    }

    async fn get_resource(&self, args: &Arguments) -> Result<ToolResponse> {
        let params: GetResourceParams = parse_params(Tool::GetResource.name(), args)?;
        let kind = require(&params.kind, "kind")?;
        let name = require(&params.name, "name")?;

        let object = self
            .backend
            .get(kind, name, params.namespace.as_deref())
            .await?;
        ToolResponse::json(&object)
    }

    async fn get_api_resources(&self, args: &Arguments) -> Result<ToolResponse> {
        let params: GetApiResourcesParams = parse_params(Tool::GetApiResources.name(), args)?;
        let include_namespaced = params.include_namespace_scoped.unwrap_or(true);
        let include_cluster = params.include_cluster_scoped.unwrap_or(true);

        let descriptors = self.backend.discover().await?;
        let descriptors = filter_by_scope(descriptors, include_namespaced, include_cluster);
        ToolResponse::json(&descriptors)
    }

    async fn get_events(&self, args: &Arguments) -> Result<ToolResponse> {
        let params: GetEventsParams = parse_params(Tool::GetEvents.name(), args)?;
        let query = EventQuery {
            namespace: params.namespace,
            message_filter: params.message_filter,
            sort_by: params.sort_by,
            max_events: params.max_events,
        };

        let events = events::get_events(self.backend.as_ref(), &query, &self.settings.events).await?;
        ToolResponse::json(&events)
    }
}
