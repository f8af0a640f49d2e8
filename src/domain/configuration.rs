// Widget configuration domain model
use crate::domain::powerbi::Report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

pub const DEFAULT_POWERBI_ENDPOINT: &str = "/powerbi";
pub const DEFAULT_DATAHUB_ENDPOINT: &str = "/service/datahub";
pub const DEFAULT_EMBED_ENDPOINT: &str = "https://app.powerbi.com/reportEmbed";

/// Configuration object owned by the host and shared by both panels.
///
/// Lowercase aliases accept keys from case-folding sources such as environment variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(rename = "powerBIEndPoint", alias = "powerbiendpoint", default)]
    pub powerbi_endpoint: String,
    #[serde(rename = "datahubEndPoint", alias = "datahubendpoint", default)]
    pub datahub_endpoint: String,
    #[serde(rename = "embedEndPoint", alias = "embedendpoint", default)]
    pub embed_endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    #[serde(rename = "isNavPaneEnabled", alias = "isnavpaneenabled", default)]
    pub nav_pane_enabled: bool,
    #[serde(rename = "isFilterPaneEnabled", alias = "isfilterpaneenabled", default)]
    pub filter_pane_enabled: bool,
}

impl WidgetConfig {
    /// Fill blank endpoints with their defaults. Returns true if anything changed.
    pub fn apply_defaults(&mut self) -> bool {
        let mut changed = false;
        for (field, default) in [
            (&mut self.powerbi_endpoint, DEFAULT_POWERBI_ENDPOINT),
            (&mut self.datahub_endpoint, DEFAULT_DATAHUB_ENDPOINT),
            (&mut self.embed_endpoint, DEFAULT_EMBED_ENDPOINT),
        ] {
            if field.is_empty() {
                *field = default.to_string();
                changed = true;
            } else {
                tracing::debug!("Keeping configured endpoint {}", field);
            }
        }
        changed
    }

    pub fn connection(&self) -> ConnectionSettings {
        ConnectionSettings {
            powerbi_endpoint: self.powerbi_endpoint.clone(),
            datahub_endpoint: self.datahub_endpoint.clone(),
            embed_endpoint: self.embed_endpoint.clone(),
        }
    }

    pub fn set_connection(&mut self, connection: &ConnectionSettings) {
        self.datahub_endpoint = connection.datahub_endpoint.clone();
        self.embed_endpoint = connection.embed_endpoint.clone();
        self.powerbi_endpoint = connection.powerbi_endpoint.clone();
    }
}

/// The connection group of the configuration form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    #[serde(rename = "powerBIEndPoint")]
    pub powerbi_endpoint: String,
    #[serde(rename = "datahubEndPoint")]
    pub datahub_endpoint: String,
    #[serde(rename = "embedEndPoint")]
    pub embed_endpoint: String,
}

impl ConnectionSettings {
    pub fn is_complete(&self) -> bool {
        !self.powerbi_endpoint.is_empty()
            && !self.datahub_endpoint.is_empty()
            && !self.embed_endpoint.is_empty()
    }
}

/// Host-owned handle to the configuration. Mutations happen in place and are
/// published to every subscriber; the last writer wins.
#[derive(Clone)]
pub struct SharedConfig {
    tx: Arc<watch::Sender<WidgetConfig>>,
}

impl SharedConfig {
    pub fn new(config: WidgetConfig) -> Self {
        let (tx, _rx) = watch::channel(config);
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> WidgetConfig {
        self.tx.borrow().clone()
    }

    pub fn update(&self, modify: impl FnOnce(&mut WidgetConfig)) {
        self.tx.send_modify(modify);
    }

    /// Like `update`, but only publishes when `modify` reports a change.
    pub fn update_if(&self, modify: impl FnOnce(&mut WidgetConfig) -> bool) -> bool {
        self.tx.send_if_modified(modify)
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetConfig> {
        self.tx.subscribe()
    }
}
