// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Event;
use kube::api::{DynamicObject, ListParams, ObjectList};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use super::discovery::{
    ApiResourceDescriptor, ResourceInfo, ResourceRegistry, build_core_registry,
    discover_resources,
};
use super::{ApiFilters, ClusterBackend, ResourceQuery};
use crate::error::{InspectError, Result};

/// Default timeout for connecting to K8s API
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for reading K8s API responses
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Default page size for paginated list requests
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// How to reach the cluster
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Kubeconfig context; None uses the kubeconfig's current context
    pub context: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub page_size: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            context: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Cluster backend over a single kube client.
///
/// The kube `Client` is a cheap handle over a shared connection pool, so one
/// `K8sClient` serves any number of concurrent calls.
pub struct K8sClient {
    client: Client,
    context: String,
    core: ResourceRegistry,
    page_size: u32,
}

impl K8sClient {
    /// Create a client for the configured kubeconfig context
    pub async fn connect(options: &ClientOptions) -> anyhow::Result<Self> {
        let kubeconfig = Kubeconfig::read().context("Failed to read kubeconfig")?;

        let context_name = options
            .context
            .clone()
            .or_else(|| kubeconfig.current_context.clone())
            .ok_or_else(|| anyhow!("No context specified and no current context in kubeconfig"))?;

        if !kubeconfig.contexts.iter().any(|c| c.name == context_name) {
            return Err(anyhow!("Context '{}' not found in kubeconfig", context_name));
        }

        let start = Instant::now();
        let mut config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: Some(context_name.clone()),
                ..Default::default()
            },
        )
        .await
        .with_context(|| format!("Failed to load kubeconfig for context '{}'", context_name))?;

        config.connect_timeout = Some(options.connect_timeout);
        config.read_timeout = Some(options.read_timeout);

        let client = Client::try_from(config)
            .with_context(|| format!("Failed to create client for context '{}'", context_name))?;

        debug!(
            context = %context_name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Created K8s client"
        );

        Ok(Self::from_client(client, context_name, options.page_size))
    }

    /// Wrap an already configured kube client
    pub fn from_client(client: Client, context: impl Into<String>, page_size: u32) -> Self {
        Self {
            client,
            context: context.into(),
            core: build_core_registry(),
            page_size: page_size.max(1),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Resolve a kind, plural or short name to a resource.
    /// Built-in kinds resolve without I/O; anything else runs discovery.
    async fn resolve(&self, kind: &str) -> Result<ResourceInfo> {
        if let Some(info) = self.core.get(kind) {
            return Ok(info.clone());
        }

        debug!(kind = %kind, "Kind not built in, running discovery");
        let registry = discover_resources(&self.client).await?;
        registry.get(kind).cloned().ok_or_else(|| {
            InspectError::NotFound(format!(
                "unknown resource kind '{}'. Use getAPIResources to see available kinds.",
                kind
            ))
        })
    }

    /// Create a dynamic API handle honouring the resource's scope
    fn dynamic_api(&self, info: &ResourceInfo, namespace: Option<&str>) -> Api<DynamicObject> {
        let ar = &info.api_resource;
        match namespace {
            Some(ns) if info.is_namespaced() => Api::namespaced_with(self.client.clone(), ns, ar),
            _ => Api::all_with(self.client.clone(), ar),
        }
    }

    /// Build ListParams from API filters (label selectors, field selectors)
    fn build_list_params(&self, filters: &ApiFilters) -> ListParams {
        let mut params = ListParams::default();

        if let Some(ref label_sel) = filters.label_selector {
            params = params.labels(label_sel);
        }

        if let Some(ref field_sel) = filters.field_selector {
            params = params.fields(field_sel);
        }

        trace!(
            label_selector = ?filters.label_selector,
            field_selector = ?filters.field_selector,
            "Built ListParams"
        );

        params
    }

    /// List every page using continue tokens
    async fn list_all<K>(&self, api: &Api<K>, base_params: &ListParams, kind: &str) -> Result<Vec<K>>
    where
        K: Clone + DeserializeOwned + Debug,
    {
        let mut all_items: Vec<K> = Vec::new();
        let mut continue_token: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            let mut params = base_params.clone().limit(self.page_size);
            if let Some(ref token) = continue_token {
                params = params.continue_token(token);
            }

            let list: ObjectList<K> = api.list(&params).await?;
            let items_count = list.items.len();
            all_items.extend(list.items);
            page_count += 1;

            match list.metadata.continue_ {
                Some(token) if !token.is_empty() => {
                    debug!(
                        kind = %kind,
                        context = %self.context,
                        page = page_count,
                        items_this_page = items_count,
                        total_so_far = all_items.len(),
                        "Fetched page, continuing"
                    );
                    continue_token = Some(token);
                }
                _ => break,
            }
        }

        if page_count > 1 {
            debug!(
                kind = %kind,
                context = %self.context,
                pages = page_count,
                total_items = all_items.len(),
                "Pagination complete"
            );
        }

        Ok(all_items)
    }
}

/// Namespace a single named object is fetched from.
/// Namespaced kinds fall back to the kubeconfig namespace, like kubectl;
/// cluster-scoped kinds ignore any namespace given.
fn object_namespace<'a>(
    info: &ResourceInfo,
    namespace: Option<&'a str>,
    default_namespace: &'a str,
) -> Option<&'a str> {
    if info.is_namespaced() {
        Some(namespace.unwrap_or(default_namespace))
    } else {
        None
    }
}

/// Serialize an object and inject apiVersion/kind, which list responses omit per item
fn to_document<T: Serialize>(item: T, info: &ResourceInfo) -> Result<Value> {
    let mut value = serde_json::to_value(item)?;
    if let Value::Object(ref mut map) = value {
        map.insert("apiVersion".to_string(), Value::String(info.api_version()));
        map.insert(
            "kind".to_string(),
            Value::String(info.api_resource.kind.clone()),
        );
    }
    Ok(value)
}

#[async_trait]
impl ClusterBackend for K8sClient {
    async fn list(&self, query: &ResourceQuery) -> Result<Vec<Value>> {
        if query.kind.trim().is_empty() {
            return Err(InspectError::InvalidArgument(
                "resource kind must not be empty".to_string(),
            ));
        }

        let info = self.resolve(&query.kind).await?;
        let api = self.dynamic_api(&info, query.namespace.as_deref());
        let params = self.build_list_params(&query.filters);

        debug!(
            kind = %info.api_resource.kind,
            context = %self.context,
            namespace = ?query.namespace,
            group = %info.api_resource.group,
            version = %info.api_resource.version,
            "Listing K8s resources"
        );

        let items = self.list_all(&api, &params, &info.api_resource.kind).await?;
        items.into_iter().map(|item| to_document(item, &info)).collect()
    }

    async fn get(&self, kind: &str, name: &str, namespace: Option<&str>) -> Result<Value> {
        if kind.trim().is_empty() {
            return Err(InspectError::InvalidArgument(
                "resource kind must not be empty".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(InspectError::InvalidArgument(
                "resource name must not be empty".to_string(),
            ));
        }

        let info = self.resolve(kind).await?;
        let namespace = object_namespace(&info, namespace, self.client.default_namespace());
        let api = self.dynamic_api(&info, namespace);

        debug!(
            kind = %info.api_resource.kind,
            name = %name,
            namespace = ?namespace,
            context = %self.context,
            "Getting K8s resource"
        );

        match api.get_opt(name).await? {
            Some(object) => to_document(object, &info),
            None => Err(InspectError::NotFound(match namespace {
                Some(ns) => format!("{} '{}' in namespace '{}'", info.api_resource.kind, name, ns),
                None => format!("{} '{}'", info.api_resource.kind, name),
            })),
        }
    }

    async fn discover(&self) -> Result<Vec<ApiResourceDescriptor>> {
        let start = Instant::now();
        let registry = discover_resources(&self.client).await?;

        debug!(
            context = %self.context,
            resources = registry.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Discovery complete"
        );
        if registry.is_empty() {
            warn!(context = %self.context, "Discovery returned no resources");
        }

        Ok(registry
            .resources()
            .iter()
            .map(ApiResourceDescriptor::from)
            .collect())
    }

    async fn list_events(&self, namespace: Option<&str>) -> Result<Vec<Value>> {
        let api: Api<Event> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };

        debug!(namespace = ?namespace, context = %self.context, "Listing events");

        let events = self.list_all(&api, &ListParams::default(), "Event").await?;
        let info = self
            .core
            .get("Event")
            .cloned()
            .ok_or_else(|| InspectError::NotFound("Event kind is not registered".to_string()))?;

        events.into_iter().map(|event| to_document(event, &info)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert!(options.context.is_none());
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert_eq!(options.read_timeout, Duration::from_secs(30));
        assert_eq!(options.page_size, 500);
    }

    #[test]
    fn test_object_namespace() {
        let registry = build_core_registry();
        let pod = registry.get("Pod").unwrap();
        let node = registry.get("Node").unwrap();

        assert_eq!(object_namespace(pod, Some("kube-system"), "default"), Some("kube-system"));
        assert_eq!(object_namespace(pod, None, "team-a"), Some("team-a"));
        assert_eq!(object_namespace(node, Some("kube-system"), "default"), None);
        assert_eq!(object_namespace(node, None, "default"), None);
    }

    #[test]
    fn test_to_document_injects_type_meta() {
        let registry = build_core_registry();
        let info = registry.get("Deployment").unwrap();
        let doc = to_document(
            serde_json::json!({"metadata": {"name": "web"}, "spec": {"replicas": 2}}),
            info,
        )
        .unwrap();

        assert_eq!(doc["apiVersion"], "apps/v1");
        assert_eq!(doc["kind"], "Deployment");
        assert_eq!(doc["metadata"]["name"], "web");
        assert_eq!(doc["spec"]["replicas"], 2);
    }

    #[test]
    fn test_to_document_leaves_non_objects_alone() {
        let registry = build_core_registry();
        let info = registry.get("Pod").unwrap();
        let doc = to_document(serde_json::json!("scalar"), info).unwrap();
        assert_eq!(doc, serde_json::json!("scalar"));
    }
}
