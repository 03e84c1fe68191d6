// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory cluster for handler and pipeline tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::discovery::ApiResourceDescriptor;
use super::{ClusterBackend, ResourceQuery};
use crate::error::{InspectError, Result};

#[derive(Default)]
pub struct FakeCluster {
    /// Objects keyed by lowercase kind
    objects: HashMap<String, Vec<Value>>,
    events: Vec<Value>,
    descriptors: Vec<ApiResourceDescriptor>,
    /// Fail every call with BackendUnavailable
    unavailable: bool,
    /// Stall every call for this long before answering
    delay: Option<Duration>,
    /// Queries seen by `list`, for pass-through assertions
    seen_queries: Mutex<Vec<ResourceQuery>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(mut self, kind: &str, objects: Vec<Value>) -> Self {
        self.objects.insert(kind.to_lowercase(), objects);
        self
    }

    pub fn with_events(mut self, events: Vec<Value>) -> Self {
        self.events = events;
        self
    }

    pub fn with_descriptors(mut self, descriptors: Vec<ApiResourceDescriptor>) -> Self {
        self.descriptors = descriptors;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Snapshot of the queries `list` has received
    pub fn seen_queries(&self) -> Vec<ResourceQuery> {
        self.seen_queries
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    async fn enter(&self) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable {
            return Err(InspectError::BackendUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }

    fn objects_of(&self, kind: &str) -> Result<&Vec<Value>> {
        self.objects
            .get(&kind.to_lowercase())
            .ok_or_else(|| InspectError::NotFound(format!("unknown resource kind '{}'", kind)))
    }
}

fn namespace_of(doc: &Value) -> Option<&str> {
    doc.get("metadata")?.get("namespace")?.as_str()
}

fn name_of(doc: &Value) -> Option<&str> {
    doc.get("metadata")?.get("name")?.as_str()
}

#[async_trait]
impl ClusterBackend for FakeCluster {
    async fn list(&self, query: &ResourceQuery) -> Result<Vec<Value>> {
        if query.kind.is_empty() {
            return Err(InspectError::InvalidArgument(
                "resource kind must not be empty".to_string(),
            ));
        }
        self.enter().await?;
        if let Ok(mut seen) = self.seen_queries.lock() {
            seen.push(query.clone());
        }

        Ok(self
            .objects_of(&query.kind)?
            .iter()
            .filter(|doc| match &query.namespace {
                Some(ns) => namespace_of(doc).is_none_or(|n| n == ns),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get(&self, kind: &str, name: &str, namespace: Option<&str>) -> Result<Value> {
        if kind.is_empty() || name.is_empty() {
            return Err(InspectError::InvalidArgument(
                "kind and name must not be empty".to_string(),
            ));
        }
        self.enter().await?;

        self.objects_of(kind)?
            .iter()
            .find(|doc| {
                name_of(doc) == Some(name)
                    && namespace.is_none_or(|ns| namespace_of(doc).is_none_or(|n| n == ns))
            })
            .cloned()
            .ok_or_else(|| InspectError::NotFound(format!("{} '{}'", kind, name)))
    }

    async fn discover(&self) -> Result<Vec<ApiResourceDescriptor>> {
        self.enter().await?;
        Ok(self.descriptors.clone())
    }

    async fn list_events(&self, namespace: Option<&str>) -> Result<Vec<Value>> {
        self.enter().await?;
        Ok(self
            .events
            .iter()
            .filter(|e| namespace.is_none_or(|ns| namespace_of(e) == Some(ns)))
            .cloned()
            .collect())
    }
}
