// HTTP transport - reqwest client for the DataHub backend
use crate::application::error::PowerBiError;
use crate::application::transport::JsonTransport;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: String,
    prefix: Mutex<String>,
}

impl ReqwestTransport {
    pub fn new(origin: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
            prefix: Mutex::new(String::new()),
        })
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let prefix = self
            .prefix
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let separator = if path.starts_with('/') { "" } else { "/" };
        let mut url = format!(
            "{}{}{}{}",
            self.origin,
            prefix.trim_end_matches('/'),
            separator,
            path
        );

        if !params.is_empty() {
            let query: Vec<String> = params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    async fn execute(
        &self,
        url: String,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, PowerBiError> {
        tracing::debug!("Sending request to {}", url);
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| PowerBiError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PowerBiError::Http {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| PowerBiError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| PowerBiError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl JsonTransport for ReqwestTransport {
    fn set_prefix(&self, prefix: &str) {
        *self.prefix.lock().unwrap_or_else(PoisonError::into_inner) = prefix.to_string();
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, PowerBiError> {
        let url = self.build_url(path, params);
        let request = self.client.get(&url);
        self.execute(url, request).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, PowerBiError> {
        let url = self.build_url(path, &[]);
        let request = self.client.post(&url).json(body);
        self.execute(url, request).await
    }

    async fn delete(&self, path: &str, timeout: Option<Duration>) -> Result<Value, PowerBiError> {
        let url = self.build_url(path, &[]);
        let mut request = self.client.delete(&url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        self.execute(url, request).await
    }
}
