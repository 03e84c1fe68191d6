// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Read-only Kubernetes inspection for tool-calling clients.
//!
//! [`handlers::Toolbox`] dispatches the `listResources`, `getResource`,
//! `getAPIResources` and `getEvents` tools against any
//! [`kubernetes::ClusterBackend`]; [`kubernetes::K8sClient`] is the backend
//! for a real cluster. Results can be reduced to selected fields with
//! [`projection`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod kubernetes;
pub mod output;
pub mod projection;

pub use error::{InspectError, Result};
pub use handlers::{Tool, ToolSettings, Toolbox};
pub use output::ToolResponse;
