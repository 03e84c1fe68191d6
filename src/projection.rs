// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Field projection over schema-less Kubernetes documents.
//!
//! A projection reduces a document to the fields named by dot-separated
//! paths, keeping the original nesting:
//!
//! ```text
//! {"metadata":{"name":"pod-1","namespace":"default"},"status":{"phase":"Running"}}
//!   project ["metadata.name", "status.phase"]
//! {"metadata":{"name":"pod-1"},"status":{"phase":"Running"}}
//! ```
//!
//! Paths only descend through objects. Arrays are returned whole when a path
//! ends on one; a path that would continue into an array element is not
//! found. Literal dots inside keys cannot be addressed.

use serde_json::{Map, Value};
use std::fmt;

/// A parsed, non-empty field path (`metadata.name` -> `["metadata", "name"]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dot-separated path, trimming surrounding whitespace.
    ///
    /// Returns `None` for an empty path or one with an empty segment
    /// (`metadata..name`, `.status`, `spec.`).
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        let segments: Vec<String> = path.split('.').map(String::from).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        Some(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Look up the value at `path`. Every intermediate value must be an object.
pub fn extract<'a>(doc: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// String form of [`extract`]; an unparseable path is simply not found.
pub fn extract_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    extract(doc, &FieldPath::parse(path)?)
}

/// Write `value` at `path` inside `target`, creating intermediate objects.
///
/// Keys outside the path are left alone, so successive calls compose.
/// A non-object found at an intermediate position is replaced by an empty
/// object, and the final segment is always overwritten: the last write wins.
pub fn set_field(target: &mut Map<String, Value>, path: &FieldPath, value: Value) {
    let (last, parents) = match path.segments().split_last() {
        Some(split) => split,
        None => return,
    };

    let mut current = target;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(map) = slot else {
            return;
        };
        current = map;
    }

    current.insert(last.clone(), value);
}

/// A set of paths parsed once from a caller's projection request.
///
/// An empty request is the identity projection. A request whose entries are
/// all unparseable is *not* empty: it projects onto nothing.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    paths: Vec<FieldPath>,
    requested: usize,
}

impl Projection {
    /// Parse a comma-separated request such as `"metadata.name, status.phase"`.
    /// Blank entries are ignored.
    pub fn parse(fields: &str) -> Self {
        Self::from_paths(fields.split(','))
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut projection = Self::default();
        for raw in paths {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }
            projection.requested += 1;
            if let Some(path) = FieldPath::parse(raw) {
                projection.paths.push(path);
            }
        }
        projection
    }

    /// True when no path was requested (identity projection)
    pub fn is_identity(&self) -> bool {
        self.requested == 0
    }

    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    /// Reduce `doc` to the requested paths.
    pub fn apply(&self, doc: Value) -> Value {
        if self.is_identity() {
            return doc;
        }

        let mut out = Map::new();
        for path in &self.paths {
            if let Some(value) = extract(&doc, path) {
                set_field(&mut out, path, value.clone());
            }
        }
        Value::Object(out)
    }
}

/// Project `doc` onto `paths`; an empty list returns `doc` unchanged.
pub fn project<S: AsRef<str>>(doc: Value, paths: &[S]) -> Value {
    Projection::from_paths(paths).apply(doc)
}
