// Configuration panel - Workspace/report selection bound to the shared configuration
use crate::application::alerts::{AlertService, NO_WORKSPACES, PATH_NOT_FOUND};
use crate::application::error::PowerBiError;
use crate::application::form::{ConfigForm, FormValues};
use crate::application::powerbi_service::PowerBiService;
use crate::domain::configuration::{ConnectionSettings, SharedConfig};
use crate::domain::powerbi::{Report, Workspace};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub const REPORT_FETCH_FAILED: &str = "Fetching reports for workspace failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelStage {
    Uninitialized,
    DefaultsApplied,
    WorkspacesLoaded,
    ReportsLoaded,
    FormBound,
    NoWorkspaces,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PanelError {
    #[error("the configuration form has not been built yet")]
    NotInitialized,

    #[error("the configuration form is not bound to a workspace list")]
    NotBound,

    #[error("unknown workspace {0}")]
    UnknownWorkspace(String),

    #[error("report {0} is not available in the selected workspace")]
    UnknownReport(String),
}

/// Ticket for a workspace-change report fetch. Only the most recent ticket's
/// result is applied.
#[derive(Debug, Clone)]
pub struct ReportFetch {
    seq: u64,
    workspace: Workspace,
}

impl ReportFetch {
    pub fn workspace_id(&self) -> &str {
        &self.workspace.id
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub stage: PanelStage,
    pub workspaces: Vec<Workspace>,
    pub visible_reports: Option<Vec<Report>>,
    pub form: Option<FormValues>,
    pub form_valid: bool,
    pub is_loading: bool,
    pub error: String,
}

pub struct ConfigPanel {
    config: SharedConfig,
    service: Arc<PowerBiService>,
    alerts: Arc<dyn AlertService>,
    stage: PanelStage,
    form: Option<ConfigForm>,
    workspaces: Vec<Workspace>,
    reports: HashMap<String, Vec<Report>>,
    visible_reports: Option<Vec<Report>>,
    is_loading: bool,
    error: String,
    fetch_seq: u64,
}

impl ConfigPanel {
    pub fn new(
        config: SharedConfig,
        service: Arc<PowerBiService>,
        alerts: Arc<dyn AlertService>,
    ) -> Self {
        Self {
            config,
            service,
            alerts,
            stage: PanelStage::Uninitialized,
            form: None,
            workspaces: Vec::new(),
            reports: HashMap::new(),
            visible_reports: None,
            is_loading: false,
            error: String::new(),
            fetch_seq: 0,
        }
    }

    /// Apply endpoint defaults, build the form and load workspaces and reports.
    pub async fn initialize(&mut self) {
        self.config.update_if(|config| config.apply_defaults());
        self.rebuild_form();
        self.set_url_and_get_workspaces().await;
    }

    /// Re-read the connection endpoints and reload the workspace list.
    pub async fn refresh(&mut self) {
        if self.stage == PanelStage::Uninitialized {
            return self.initialize().await;
        }
        self.rebuild_form();
        self.set_url_and_get_workspaces().await;
    }

    fn rebuild_form(&mut self) {
        let config = self.config.snapshot();
        let mut form = ConfigForm::from_config(&config);

        let shared = self.config.clone();
        form.is_filter_enabled
            .subscribe(move |enabled| shared.update(|c| c.filter_pane_enabled = *enabled));
        let shared = self.config.clone();
        form.is_nav_pane_enabled
            .subscribe(move |enabled| shared.update(|c| c.nav_pane_enabled = *enabled));
        let shared = self.config.clone();
        form.connection
            .subscribe(move |connection| shared.update(|c| c.set_connection(connection)));

        self.form = Some(form);
        self.workspaces.clear();
        self.reports.clear();
        self.visible_reports = None;
        self.error.clear();
        self.is_loading = false;
        // fetches started against the previous form are void
        self.fetch_seq += 1;
        self.stage = PanelStage::DefaultsApplied;
    }

    async fn set_url_and_get_workspaces(&mut self) {
        let config = self.config.snapshot();
        tracing::debug!(
            "Loading workspaces via {}{}",
            config.datahub_endpoint,
            config.powerbi_endpoint
        );
        self.service
            .set_endpoints(&config.datahub_endpoint, &config.powerbi_endpoint);
        self.load_workspaces().await;
    }

    async fn load_workspaces(&mut self) {
        if let Err(e) = self.service.get_config().await {
            tracing::warn!("Fetching backend configuration failed: {}", e);
            self.alerts.danger(PATH_NOT_FOUND);
        }

        self.workspaces = match self.service.list_workspaces().await {
            Ok(workspaces) => workspaces,
            Err(e) => {
                tracing::warn!("Listing workspaces failed: {}", e);
                Vec::new()
            }
        };

        if self.workspaces.is_empty() {
            self.alerts.danger(NO_WORKSPACES);
            self.stage = PanelStage::NoWorkspaces;
            return;
        }
        self.stage = PanelStage::WorkspacesLoaded;

        self.fetch_reports_for_initial_workspace().await;
        self.bind_form();
    }

    fn initial_workspace_id(&self) -> Option<String> {
        self.config
            .snapshot()
            .workspace
            .or_else(|| self.workspaces.first().map(|w| w.id.clone()))
    }

    async fn fetch_reports_for_initial_workspace(&mut self) {
        if let Some(workspace_id) = self.initial_workspace_id() {
            match self.service.list_reports(&workspace_id).await {
                Ok(reports) => {
                    self.reports.insert(workspace_id, reports);
                }
                Err(e) => {
                    let name = self
                        .workspaces
                        .iter()
                        .find(|w| w.id == workspace_id)
                        .map_or(workspace_id.as_str(), |w| w.name.as_str());
                    self.alerts.danger(&format!(
                        "An error occurred while fetching reports of workspace {}. Try again. {}",
                        name, e
                    ));
                }
            }
        }
        self.stage = PanelStage::ReportsLoaded;
    }

    /// Show the initial selection, then start mirroring report edits into the configuration.
    fn bind_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let config = self.config.snapshot();
        let selected = config
            .workspace
            .clone()
            .or_else(|| self.workspaces.first().map(|w| w.id.clone()));
        let written = selected.clone();
        self.config.update(|c| c.workspace = written);

        if let Some(workspace) = selected
            .as_ref()
            .and_then(|id| self.workspaces.iter().find(|w| &w.id == id))
        {
            form.workspace.set_value(Some(workspace.clone()));
            let reports = self.reports.get(&workspace.id).cloned().unwrap_or_default();
            if let Some(report) = config
                .report
                .filter(|r| reports.iter().any(|candidate| candidate.id == r.id))
            {
                form.report.set_value(Some(report));
            }
            self.visible_reports = Some(reports);
        }

        let shared = self.config.clone();
        form.report.subscribe(move |report| {
            shared.update_if(|c| {
                let changed = c.report != *report;
                c.report = report.clone();
                changed
            });
        });

        self.stage = PanelStage::FormBound;
    }

    /// Select a workspace and reload its reports.
    pub async fn select_workspace(&mut self, workspace_id: &str) -> Result<(), PanelError> {
        let fetch = self.begin_workspace_change(workspace_id)?;
        let result = self.service.list_reports(fetch.workspace_id()).await;
        self.finish_workspace_change(fetch, result);
        Ok(())
    }

    /// First half of a workspace change: update the form and hand out a fetch ticket.
    pub fn begin_workspace_change(&mut self, workspace_id: &str) -> Result<ReportFetch, PanelError> {
        if self.stage != PanelStage::FormBound {
            return Err(PanelError::NotBound);
        }
        let workspace = self
            .workspaces
            .iter()
            .find(|w| w.id == workspace_id)
            .cloned()
            .ok_or_else(|| PanelError::UnknownWorkspace(workspace_id.to_string()))?;
        let form = self.form.as_mut().ok_or(PanelError::NotInitialized)?;

        form.workspace.set_value(Some(workspace.clone()));
        self.error.clear();
        self.is_loading = true;
        self.fetch_seq += 1;
        Ok(ReportFetch {
            seq: self.fetch_seq,
            workspace,
        })
    }

    /// Second half of a workspace change. Returns false when the result was
    /// superseded or its workspace is no longer listed.
    pub fn finish_workspace_change(
        &mut self,
        fetch: ReportFetch,
        result: Result<Vec<Report>, PowerBiError>,
    ) -> bool {
        if fetch.seq != self.fetch_seq {
            tracing::debug!(
                "Dropping superseded report list for workspace {}",
                fetch.workspace.id
            );
            return false;
        }
        if !self.workspaces.iter().any(|w| w.id == fetch.workspace.id) {
            tracing::debug!(
                "Dropping report list for unlisted workspace {}",
                fetch.workspace.id
            );
            self.is_loading = false;
            return false;
        }

        match result {
            Ok(reports) => {
                // workspace and report are published together
                let workspace_id = fetch.workspace.id.clone();
                let first = reports.first().cloned();
                self.config.update(|c| {
                    c.workspace = Some(workspace_id);
                    c.report = first.clone();
                });
                if let Some(form) = self.form.as_mut() {
                    form.report.set_value(first);
                }
                self.reports
                    .insert(fetch.workspace.id.clone(), reports.clone());
                self.visible_reports = Some(reports);
            }
            Err(e) => {
                tracing::warn!(
                    "Fetching reports for workspace {} failed: {}",
                    fetch.workspace.id,
                    e
                );
                self.error = REPORT_FETCH_FAILED.to_string();
            }
        }
        self.is_loading = false;
        true
    }

    pub fn select_report(&mut self, report_id: &str) -> Result<(), PanelError> {
        let report = self
            .visible_reports
            .as_ref()
            .and_then(|reports| reports.iter().find(|r| r.id == report_id))
            .cloned()
            .ok_or_else(|| PanelError::UnknownReport(report_id.to_string()))?;
        let form = self.form.as_mut().ok_or(PanelError::NotInitialized)?;
        form.report.set_value(Some(report));
        Ok(())
    }

    pub fn set_filter_pane(&mut self, enabled: bool) -> Result<(), PanelError> {
        self.form_mut()?.is_filter_enabled.set_value(enabled);
        Ok(())
    }

    pub fn set_nav_pane(&mut self, enabled: bool) -> Result<(), PanelError> {
        self.form_mut()?.is_nav_pane_enabled.set_value(enabled);
        Ok(())
    }

    pub fn set_connection(&mut self, connection: ConnectionSettings) -> Result<(), PanelError> {
        self.form_mut()?.connection.set_value(connection);
        Ok(())
    }

    fn form_mut(&mut self) -> Result<&mut ConfigForm, PanelError> {
        self.form.as_mut().ok_or(PanelError::NotInitialized)
    }

    pub fn service(&self) -> Arc<PowerBiService> {
        self.service.clone()
    }

    pub fn stage(&self) -> PanelStage {
        self.stage
    }

    pub fn form(&self) -> Option<&ConfigForm> {
        self.form.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn visible_reports(&self) -> Option<&[Report]> {
        self.visible_reports.as_deref()
    }

    pub fn view(&self) -> PanelView {
        PanelView {
            stage: self.stage,
            workspaces: self.workspaces.clone(),
            visible_reports: self.visible_reports.clone(),
            form: self.form.as_ref().map(ConfigForm::values),
            form_valid: self.form.as_ref().is_some_and(ConfigForm::is_valid),
            is_loading: self.is_loading,
            error: self.error.clone(),
        }
    }
}
