// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod client;
pub mod discovery;
pub mod events;
#[cfg(test)]
pub(crate) mod fake;

pub use client::{ClientOptions, K8sClient};
pub use discovery::ApiResourceDescriptor;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Parameters to push down to the Kubernetes API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiFilters {
    /// Label selector string (e.g., "app=nginx,version=v1")
    pub label_selector: Option<String>,
    /// Field selector string (e.g., "status.phase=Running")
    pub field_selector: Option<String>,
}

/// What to list: a kind, optionally narrowed by namespace and selectors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceQuery {
    pub kind: String,
    /// None means all namespaces (ignored for cluster-scoped kinds)
    pub namespace: Option<String>,
    pub filters: ApiFilters,
}

impl ResourceQuery {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn label_selector(mut self, selector: Option<String>) -> Self {
        self.filters.label_selector = selector;
        self
    }

    pub fn field_selector(mut self, selector: Option<String>) -> Self {
        self.filters.field_selector = selector;
        self
    }
}

/// Read-only access to a cluster's control plane.
///
/// Implementations must be safe for concurrent use by many in-flight calls.
/// Documents are returned as raw JSON; selectors are passed through to the
/// server untouched.
#[async_trait]
pub trait ClusterBackend: Send + Sync {
    /// List every object of `query.kind` matching the namespace and selectors
    async fn list(&self, query: &ResourceQuery) -> Result<Vec<Value>>;

    /// Fetch one object by name
    async fn get(&self, kind: &str, name: &str, namespace: Option<&str>) -> Result<Value>;

    /// Enumerate the resource kinds served by the cluster
    async fn discover(&self) -> Result<Vec<ApiResourceDescriptor>>;

    /// List raw core/v1 events, cluster-wide when `namespace` is None
    async fn list_events(&self, namespace: Option<&str>) -> Result<Vec<Value>>;
}
