// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Response envelope handed back to the tool-calling client

use serde::Serialize;

use crate::error::Result;

/// One block of response content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// Successful tool result: a single text block carrying JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    pub content: Vec<Content>,
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
        }
    }

    /// Encode `value` as pretty-printed JSON text
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::text(serde_json::to_string_pretty(value)?))
    }

    /// Text of the first content block
    pub fn text_payload(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            Content::Text { text } => Some(text.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_payload() {
        let response = ToolResponse::json(&json!([{"a": 1}])).unwrap();
        assert_eq!(response.content.len(), 1);

        let parsed: serde_json::Value =
            serde_json::from_str(response.text_payload().unwrap()).unwrap();
        assert_eq!(parsed, json!([{"a": 1}]));
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = serde_json::to_value(ToolResponse::text("hi")).unwrap();
        assert_eq!(envelope, json!({"content": [{"type": "text", "text": "hi"}]}));
    }

    #[test]
    fn test_unserializable_value_is_error() {
        use std::collections::HashMap;

        // Non-string map keys cannot be encoded as JSON object keys
        let mut bad: HashMap<(i32, i32), i32> = HashMap::new();
        bad.insert((1, 2), 3);
        let err = ToolResponse::json(&bad).unwrap_err();
        assert_eq!(err.code(), "serialization_error");
    }
}
