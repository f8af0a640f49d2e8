// Transport trait for JSON requests against the DataHub backend
use crate::application::error::PowerBiError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[async_trait]
pub trait JsonTransport: Send + Sync {
    /// Set the path prefix (the DataHub endpoint) placed in front of every request path.
    fn set_prefix(&self, prefix: &str);

    /// GET `path` with the given query parameters and return the decoded JSON body
    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, PowerBiError>;

    /// POST a JSON body to `path`
    async fn post(&self, path: &str, body: &Value) -> Result<Value, PowerBiError>;

    /// DELETE `path`, optionally overriding the client timeout
    async fn delete(&self, path: &str, timeout: Option<Duration>) -> Result<Value, PowerBiError>;
}
