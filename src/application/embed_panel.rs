// Embedding panel - Turns the shared configuration into an embedded report
use crate::application::alerts::{AlertService, EMBED_FAILED, REPORT_LOAD_FAILED, TOKEN_FETCH_FAILED};
use crate::application::embed_client::{EmbedClient, EmbedError, EmbeddedReport};
use crate::application::error::PowerBiError;
use crate::application::powerbi_service::PowerBiService;
use crate::domain::configuration::{DEFAULT_EMBED_ENDPOINT, WidgetConfig};
use crate::domain::embed::EmbedConfiguration;
use crate::domain::powerbi::{EmbeddingInfo, Report};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayedReport {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedView {
    pub container: String,
    pub embed_url: String,
    pub report: Option<DisplayedReport>,
    pub embedded: bool,
}

pub struct EmbeddingPanel {
    service: Arc<PowerBiService>,
    alerts: Arc<dyn AlertService>,
    client: Arc<dyn EmbedClient>,
    container: String,
    embed_url: String,
    embedding_info: Option<EmbeddingInfo>,
    displayed: Option<DisplayedReport>,
    embedded: Option<Arc<dyn EmbeddedReport>>,
    applied: Option<WidgetConfig>,
}

impl EmbeddingPanel {
    pub fn new(
        service: Arc<PowerBiService>,
        alerts: Arc<dyn AlertService>,
        client: Arc<dyn EmbedClient>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            service,
            alerts,
            client,
            container: container.into(),
            embed_url: DEFAULT_EMBED_ENDPOINT.to_string(),
            embedding_info: None,
            displayed: None,
            embedded: None,
            applied: None,
        }
    }

    /// Re-initialize if `config` differs from the configuration last rendered.
    /// Returns true when a reload happened.
    pub async fn apply(&mut self, config: &WidgetConfig) -> bool {
        if self.applied.as_ref() == Some(config) {
            return false;
        }
        self.initialize(config).await;
        true
    }

    /// Resolve endpoints, fetch a token for the configured report and embed it.
    /// Failures are surfaced as alerts and never returned.
    pub async fn initialize(&mut self, config: &WidgetConfig) {
        self.applied = Some(config.clone());
        self.embed_url = if config.embed_endpoint.is_empty() {
            DEFAULT_EMBED_ENDPOINT.to_string()
        } else {
            config.embed_endpoint.clone()
        };
        self.service
            .set_endpoints(&config.datahub_endpoint, &config.powerbi_endpoint);

        if let Err(e) = self.load_report(config).await {
            tracing::warn!("Loading report failed: {}", e);
            self.alerts.danger(REPORT_LOAD_FAILED);
        }

        if let Some(info) = self.embedding_info.clone() {
            if let Err(e) =
                self.embed_report(info, config.filter_pane_enabled, config.nav_pane_enabled)
            {
                tracing::warn!("Embedding report failed: {}", e);
                self.alerts.danger(EMBED_FAILED);
            }
        }
    }

    async fn load_report(&mut self, config: &WidgetConfig) -> Result<(), PowerBiError> {
        self.embedding_info = None;
        self.displayed = None;
        if self.embedded.take().is_some() {
            self.client.reset(&self.container);
        }
        let (Some(report), Some(workspace_id)) = (&config.report, &config.workspace) else {
            return Err(PowerBiError::SelectionMissing);
        };

        if let Some(token) = self.get_token(report, workspace_id).await {
            self.embedding_info = Some(EmbeddingInfo {
                report_id: report.id.clone(),
                embedding_token: token,
            });
        }
        Ok(())
    }

    async fn get_token(&mut self, report: &Report, workspace_id: &str) -> Option<String> {
        match self.service.embed_report(workspace_id, &report.id).await {
            Ok(token) => {
                self.displayed = Some(DisplayedReport {
                    id: report.id.clone(),
                    workspace_id: workspace_id.to_string(),
                    name: report.name.clone(),
                });
                Some(token)
            }
            Err(e) => {
                tracing::warn!("Fetching embedding token for report {} failed: {}", report.id, e);
                self.alerts.danger(TOKEN_FETCH_FAILED);
                None
            }
        }
    }

    fn embed_report(
        &mut self,
        info: EmbeddingInfo,
        filter_pane_enabled: bool,
        nav_pane_enabled: bool,
    ) -> Result<(), EmbedError> {
        let embed_config = EmbedConfiguration::report(
            info.report_id,
            self.embed_url.clone(),
            info.embedding_token,
            filter_pane_enabled,
            nav_pane_enabled,
        );

        self.client.reset(&self.container);
        self.embedded = None;
        let report = self.client.embed(&self.container, &embed_config)?;

        report.off_error();
        let alerts = self.alerts.clone();
        report.on_error(Arc::new(move |detail: &str| {
            tracing::warn!("Embedded report raised an error: {}", detail);
            alerts.danger(EMBED_FAILED);
        }));

        tracing::info!("Embedded report {} into {}", embed_config.id, self.container);
        self.embedded = Some(report);
        Ok(())
    }

    pub fn embedding_info(&self) -> Option<&EmbeddingInfo> {
        self.embedding_info.as_ref()
    }

    pub fn view(&self) -> EmbedView {
        EmbedView {
            container: self.container.clone(),
            embed_url: self.embed_url.clone(),
            report: self.displayed.clone(),
            embedded: self.embedded.is_some(),
        }
    }
}
