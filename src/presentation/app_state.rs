// Application state for HTTP handlers
use crate::application::alerts::AlertLog;
use crate::application::config_panel::ConfigPanel;
use crate::application::embed_panel::EmbeddingPanel;
use crate::application::powerbi_service::PowerBiService;
use crate::application::transport::JsonTransport;
use crate::domain::configuration::{SharedConfig, WidgetConfig};
use crate::domain::widget::WidgetDescriptor;
use crate::infrastructure::page_embed::PageEmbedClient;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    pub config: SharedConfig,
    pub service: Arc<PowerBiService>,
    pub alerts: Arc<AlertLog>,
    pub embed_client: Arc<PageEmbedClient>,
    pub config_panel: Mutex<ConfigPanel>,
    pub embedding_panel: Mutex<EmbeddingPanel>,
    pub descriptor: WidgetDescriptor,
}

impl AppState {
    pub fn new(
        initial: WidgetConfig,
        transport: Arc<dyn JsonTransport>,
        container: &str,
    ) -> Self {
        let config = SharedConfig::new(initial);
        let service = Arc::new(PowerBiService::new(transport));
        let alerts = Arc::new(AlertLog::new());
        let embed_client = Arc::new(PageEmbedClient::new());

        let config_panel = ConfigPanel::new(config.clone(), service.clone(), alerts.clone());
        let embedding_panel = EmbeddingPanel::new(
            service.clone(),
            alerts.clone(),
            embed_client.clone(),
            container,
        );

        Self {
            config,
            service,
            alerts,
            embed_client,
            config_panel: Mutex::new(config_panel),
            embedding_panel: Mutex::new(embedding_panel),
            descriptor: WidgetDescriptor::powerbi(),
        }
    }
}
