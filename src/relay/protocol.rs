//! Wire format of the single request/response pair between the page-side
//! controller and the privileged relay.
//!
//! - request:  `{"action": "fetchContent", "url": "<absolute URL>"}`
//! - response: `{"content": "<text>"}` or `{"content": null}`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum RelayRequest {
    #[serde(rename = "fetchContent")]
    FetchContent { url: String },
}

impl RelayRequest {
    pub fn fetch(url: impl Into<String>) -> Self {
        RelayRequest::FetchContent { url: url.into() }
    }

    pub fn url(&self) -> &str {
        match self {
            RelayRequest::FetchContent { url } => url,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::from)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::from)
    }
}

/// `content: None` is the sole failure signal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    pub content: Option<String>,
}

impl FetchResponse {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }

    pub fn failed() -> Self {
        Self { content: None }
    }

    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::from)
    }

    /// Serialization of this shape cannot fail; a failure would still
    /// degrade to the null response rather than panic.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"content":null}"#.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub message: String,
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "protocol error: {}", self.message)
    }
}

impl std::error::Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}
