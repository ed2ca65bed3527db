use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An HTTP-request-shaped invocation, as delivered by a serverless runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl InvocationEvent {
    pub fn post(body: impl Into<String>) -> Self {
        Self {
            http_method: Some("POST".to_string()),
            body: Some(body.into()),
        }
    }
}

/// The response handed back to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl InvocationResponse {
    /// Plain response with no headers.
    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Response whose body is already-serialized JSON.
    pub fn json(status_code: u16, body: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: body.into(),
        }
    }
}

/// Error body: `{"error": ..., "trace": ...}`. `trace` is only present
/// for unclassified failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            trace: None,
        }
    }

    pub fn with_trace(error: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            trace: Some(trace.into()),
        }
    }
}
