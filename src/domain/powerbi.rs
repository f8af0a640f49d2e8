// Power BI domain models
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const STATUS_SUCCEEDED: &str = "SUCCEEDED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

impl Workspace {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Report {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Envelope returned by the backend list and token endpoints. The payload
/// stays raw until the status says it is worth decoding.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn succeeded(&self) -> bool {
        self.status == STATUS_SUCCEEDED
    }

    /// Decode the payload of a successful response; any other status yields `None`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<Option<T>, serde_json::Error> {
        if !self.succeeded() {
            return Ok(None);
        }
        self.data.map(serde_json::from_value).transpose()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedToken {
    pub token: String,
}

/// Settings stored by the backend under `/config`. The shape is owned by the
/// backend, so it is kept as an open JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(flatten)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingInfo {
    pub report_id: String,
    pub embedding_token: String,
}

/// Process-local cache of the last-known backend data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedInfo {
    pub reports: HashMap<String, Vec<Report>>,
    pub active_token: String,
    pub settings: Option<BackendSettings>,
}
