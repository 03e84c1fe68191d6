// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Decoding a tool call's argument map into its parameter struct.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{InspectError, Result};

pub type Arguments = Map<String, Value>;

/// Decode the argument map; malformed input is an InvalidArgument
pub fn parse_params<T: DeserializeOwned>(tool: &str, args: &Arguments) -> Result<T> {
    serde_json::from_value(Value::Object(args.clone())).map_err(|e| {
        InspectError::InvalidArgument(format!("invalid arguments for {}: {}", tool, e))
    })
}

/// A required string parameter. Surrounding whitespace is dropped since
/// kinds and object names never carry it.
pub fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| InspectError::missing_parameter(name))
}
