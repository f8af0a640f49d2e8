// Power BI service - Proxy over the backend endpoints with a last-known cache
use crate::application::error::PowerBiError;
use crate::application::transport::JsonTransport;
use crate::domain::configuration::DEFAULT_POWERBI_ENDPOINT;
use crate::domain::powerbi::{
    ApiResponse, BackendSettings, CachedInfo, EmbedToken, Report, Workspace,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const DELETE_TIMEOUT: Duration = Duration::from_millis(5000);

pub struct PowerBiService {
    transport: Arc<dyn JsonTransport>,
    path: Mutex<String>,
    cache: Mutex<CachedInfo>,
}

impl PowerBiService {
    pub fn new(transport: Arc<dyn JsonTransport>) -> Self {
        Self {
            transport,
            path: Mutex::new(DEFAULT_POWERBI_ENDPOINT.to_string()),
            cache: Mutex::new(CachedInfo::default()),
        }
    }

    /// Point the transport at the DataHub endpoint and the service at the Power BI endpoint.
    pub fn set_endpoints(&self, datahub_endpoint: &str, powerbi_endpoint: &str) {
        self.transport.set_prefix(datahub_endpoint);
        *lock(&self.path) = powerbi_endpoint.to_string();
    }

    pub fn path(&self) -> String {
        lock(&self.path).clone()
    }

    /// Fetch the settings stored in the backend, failing if the path cannot be reached.
    pub async fn get_config(&self) -> Result<BackendSettings, PowerBiError> {
        let value = self.transport.get(&self.url("config"), &[]).await?;
        let settings = match value {
            Value::Object(values) => BackendSettings { values },
            _ => BackendSettings::default(),
        };
        lock(&self.cache).settings = Some(settings.clone());
        Ok(settings)
    }

    pub async fn save<T: Serialize + ?Sized>(&self, connection: &T) -> Result<Value, PowerBiError> {
        let url = self.url("config");
        let body = serde_json::to_value(connection).map_err(|e| PowerBiError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;
        self.transport.post(&url, &body).await
    }

    pub async fn delete(&self) -> Result<Value, PowerBiError> {
        self.transport
            .delete(&self.url("config"), Some(DELETE_TIMEOUT))
            .await
    }

    /// List workspaces; a non-successful status yields an empty list.
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, PowerBiError> {
        let url = self.url("groups");
        let value = self.transport.get(&url, &[]).await?;
        let response: ApiResponse = decode(&url, value)?;
        if !response.succeeded() {
            tracing::warn!("Listing workspaces returned status {}", response.status);
        }
        Ok(payload(&url, response)?.unwrap_or_default())
    }

    /// List the reports of a workspace; a non-successful status yields an empty list.
    pub async fn list_reports(&self, workspace_id: &str) -> Result<Vec<Report>, PowerBiError> {
        let url = self.url("reports");
        let value = self
            .transport
            .get(&url, &[("groupId", workspace_id)])
            .await?;
        let response: ApiResponse = decode(&url, value)?;
        if !response.succeeded() {
            tracing::warn!(
                "Listing reports of workspace {} returned status {}",
                workspace_id,
                response.status
            );
        }
        let reports: Vec<Report> = payload(&url, response)?.unwrap_or_default();
        lock(&self.cache)
            .reports
            .insert(workspace_id.to_string(), reports.clone());
        Ok(reports)
    }

    /// Request an embedding token for a report.
    pub async fn embed_report(
        &self,
        workspace_id: &str,
        report_id: &str,
    ) -> Result<String, PowerBiError> {
        let url = self.url("embedReport");
        let value = self
            .transport
            .get(&url, &[("groupId", workspace_id), ("reportId", report_id)])
            .await?;
        let response: ApiResponse = decode(&url, value)?;
        let status = response.status.clone();
        let token = payload::<EmbedToken>(&url, response)?
            .ok_or(PowerBiError::TokenUnavailable { status })?
            .token;
        lock(&self.cache).active_token = token.clone();
        Ok(token)
    }

    pub fn cached_info(&self) -> CachedInfo {
        lock(&self.cache).clone()
    }

    pub fn flush_cache(&self) {
        *lock(&self.cache) = CachedInfo::default();
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", lock(&self.path).trim_end_matches('/'), resource)
    }
}

fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T, PowerBiError> {
    serde_json::from_value(value).map_err(|e| PowerBiError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn payload<T: DeserializeOwned>(url: &str, response: ApiResponse) -> Result<Option<T>, PowerBiError> {
    response.into_data().map_err(|e| PowerBiError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
