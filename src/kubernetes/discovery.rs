// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Resource discovery for Kubernetes clusters.
//!
//! Built-in kinds are known statically from k8s-openapi, so the common
//! `Pod`/`Deployment`/`Node` lookups never hit the discovery API. Anything
//! else (CRDs, aggregated APIs) is resolved by running discovery against
//! the cluster.

use kube::Client;
use kube::discovery::{ApiCapabilities, ApiResource, Discovery, Scope};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;

/// Information about a discovered Kubernetes resource
#[derive(Debug, Clone)]
pub struct ResourceInfo {
    /// The API resource definition
    pub api_resource: ApiResource,
    /// API capabilities (verbs, scope, etc.)
    pub capabilities: ApiCapabilities,
    /// Extra lookup names (e.g., "po" for pods, "deploy" for deployments)
    pub aliases: Vec<String>,
    /// Whether this is a built-in resource (has static type) or dynamic (CRD)
    pub is_core: bool,
}

impl ResourceInfo {
    /// Check if this resource is namespace-scoped
    pub fn is_namespaced(&self) -> bool {
        self.capabilities.scope == Scope::Namespaced
    }

    /// Get the full API group/version string
    pub fn api_version(&self) -> String {
        if self.api_resource.group.is_empty() {
            self.api_resource.version.clone()
        } else {
            format!("{}/{}", self.api_resource.group, self.api_resource.version)
        }
    }

    /// Names this resource answers to: kind, plural and aliases, lowercased
    fn lookup_names(&self) -> Vec<String> {
        let mut names = vec![
            self.api_resource.kind.to_lowercase(),
            self.api_resource.plural.to_lowercase(),
        ];
        names.extend(self.aliases.iter().map(|a| a.to_lowercase()));
        names
    }
}

/// Externally visible description of a resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceDescriptor {
    /// API group, empty for the core group
    pub group: String,
    pub version: String,
    pub kind: String,
    /// Plural resource name as used in URLs (e.g., "deployments")
    #[serde(rename = "name")]
    pub plural_name: String,
    pub namespaced: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<String>,
}

impl From<&ResourceInfo> for ApiResourceDescriptor {
    fn from(info: &ResourceInfo) -> Self {
        Self {
            group: info.api_resource.group.clone(),
            version: info.api_resource.version.clone(),
            kind: info.api_resource.kind.clone(),
            plural_name: info.api_resource.plural.clone(),
            namespaced: info.is_namespaced(),
            verbs: info.capabilities.operations.clone(),
        }
    }
}

/// Keep only the scopes the caller asked for, preserving order
pub fn filter_by_scope(
    descriptors: Vec<ApiResourceDescriptor>,
    include_namespaced: bool,
    include_cluster: bool,
) -> Vec<ApiResourceDescriptor> {
    descriptors
        .into_iter()
        .filter(|d| {
            if d.namespaced {
                include_namespaced
            } else {
                include_cluster
            }
        })
        .collect()
}

/// Lookup table from kind / plural / alias to resource
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: Vec<ResourceInfo>,
    by_name: HashMap<String, usize>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource to the registry.
    /// A name already claimed by a built-in resource is never taken over by
    /// a CRD; otherwise the first registration keeps the name.
    pub fn add(&mut self, info: ResourceInfo) {
        let index = self.resources.len();
        for name in info.lookup_names() {
            match self.by_name.get(&name) {
                Some(&existing) if self.resources[existing].is_core || !info.is_core => {}
                _ => {
                    self.by_name.insert(name, index);
                }
            }
        }
        self.resources.push(info);
    }

    /// Look up a resource by kind, plural or alias (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&ResourceInfo> {
        let index = self.by_name.get(&name.to_lowercase())?;
        self.resources.get(*index)
    }

    /// All resources in registration order
    pub fn resources(&self) -> &[ResourceInfo] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Build a registry with just core resources using k8s-openapi types (no discovery, instant)
///
/// This uses compile-time type information from k8s-openapi, so it automatically
/// stays in sync with the Kubernetes API version we're building against.
pub fn build_core_registry() -> ResourceRegistry {
    use k8s_openapi::api::{
        apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet},
        autoscaling::v2::HorizontalPodAutoscaler,
        batch::v1::{CronJob, Job},
        coordination::v1::Lease,
        core::v1::{
            ConfigMap, Endpoints, Event, LimitRange, Namespace, Node, PersistentVolume,
            PersistentVolumeClaim, Pod, ResourceQuota, Secret, Service, ServiceAccount,
        },
        networking::v1::{Ingress, IngressClass, NetworkPolicy},
        policy::v1::PodDisruptionBudget,
        rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding},
        storage::v1::StorageClass,
    };

    let mut registry = ResourceRegistry::new();

    // The Resource trait's Scope is an associated type, so scope is spelled out per entry
    macro_rules! add_resource {
        ($type:ty, namespaced, [$($alias:expr),* $(,)?]) => {{
            add_resource!(@inner $type, Scope::Namespaced, [$($alias),*])
        }};
        ($type:ty, cluster, [$($alias:expr),* $(,)?]) => {{
            add_resource!(@inner $type, Scope::Cluster, [$($alias),*])
        }};
        (@inner $type:ty, $scope:expr, [$($alias:expr),* $(,)?]) => {{
            let ar = ApiResource::erase::<$type>(&());
            let caps = ApiCapabilities {
                scope: $scope,
                subresources: vec![],
                operations: vec![],
            };
            registry.add(ResourceInfo {
                api_resource: ar,
                capabilities: caps,
                aliases: vec![$($alias.to_string()),*],
                is_core: true,
            });
        }};
    }

    // Core API (v1) - namespaced resources
    add_resource!(Pod, namespaced, ["po"]);
    add_resource!(Service, namespaced, ["svc"]);
    add_resource!(ConfigMap, namespaced, ["cm"]);
    add_resource!(Secret, namespaced, []);
    add_resource!(Event, namespaced, ["ev"]);
    add_resource!(ServiceAccount, namespaced, ["sa"]);
    add_resource!(Endpoints, namespaced, ["ep"]);
    add_resource!(PersistentVolumeClaim, namespaced, ["pvc"]);
    add_resource!(ResourceQuota, namespaced, ["quota"]);
    add_resource!(LimitRange, namespaced, ["limits"]);

    // Core API (v1) - cluster-scoped resources
    add_resource!(Node, cluster, ["no"]);
    add_resource!(Namespace, cluster, ["ns"]);
    add_resource!(PersistentVolume, cluster, ["pv"]);

    // Apps API (apps/v1)
    add_resource!(Deployment, namespaced, ["deploy"]);
    add_resource!(StatefulSet, namespaced, ["sts"]);
    add_resource!(DaemonSet, namespaced, ["ds"]);
    add_resource!(ReplicaSet, namespaced, ["rs"]);

    // Batch API (batch/v1)
    add_resource!(Job, namespaced, []);
    add_resource!(CronJob, namespaced, ["cj"]);

    // Networking API (networking.k8s.io/v1)
    add_resource!(Ingress, namespaced, ["ing"]);
    add_resource!(NetworkPolicy, namespaced, ["netpol"]);
    add_resource!(IngressClass, cluster, []);

    // Autoscaling API (autoscaling/v2)
    add_resource!(HorizontalPodAutoscaler, namespaced, ["hpa"]);

    // Policy API (policy/v1)
    add_resource!(PodDisruptionBudget, namespaced, ["pdb"]);

    // Coordination API (coordination.k8s.io/v1)
    add_resource!(Lease, namespaced, []);

    // Storage API (storage.k8s.io/v1) - cluster-scoped
    add_resource!(StorageClass, cluster, ["sc"]);

    // RBAC API (rbac.authorization.k8s.io/v1)
    add_resource!(Role, namespaced, []);
    add_resource!(RoleBinding, namespaced, []);
    add_resource!(ClusterRole, cluster, []);
    add_resource!(ClusterRoleBinding, cluster, []);

    registry
}

/// Discover all available resources on a Kubernetes cluster (including CRDs).
///
/// Runs the discovery API once; only the preferred version of each group is
/// reported, and subresources (pods/log, pods/exec) are skipped.
pub async fn discover_resources(client: &Client) -> Result<ResourceRegistry> {
    let discovery = Discovery::new(client.clone()).run().await?;
    let mut registry = ResourceRegistry::new();

    for group in discovery.groups() {
        for (ar, caps) in group.recommended_resources() {
            if ar.plural.contains('/') {
                continue;
            }

            // Mark as core if from a standard K8s API group
            let is_core = matches!(
                ar.group.as_str(),
                "" | "apps"
                    | "batch"
                    | "networking.k8s.io"
                    | "policy"
                    | "rbac.authorization.k8s.io"
                    | "storage.k8s.io"
                    | "autoscaling"
                    | "coordination.k8s.io"
            );

            registry.add(ResourceInfo {
                api_resource: ar,
                capabilities: caps,
                aliases: vec![],
                is_core,
            });
        }
    }

    Ok(registry)
}
