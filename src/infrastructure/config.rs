use crate::domain::configuration::WidgetConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub widget: WidgetSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    /// Scheme and host of the tenant serving the DataHub endpoints
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetSettings {
    #[serde(default = "default_container")]
    pub container: String,
    /// Configuration handed to the panels on startup
    #[serde(default)]
    pub initial: WidgetConfig,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            container: default_container(),
            initial: WidgetConfig::default(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_origin() -> String {
    "http://localhost:8111".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_container() -> String {
    "report-container".to_string()
}

/// Load settings from `config/widget.toml` (optional) and `PBIW__*` environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/widget").required(false))
        .add_source(config::Environment::with_prefix("PBIW").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Settings {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let settings = parse("");

        assert_eq!(settings.server.bind, "127.0.0.1:8080");
        assert_eq!(settings.backend.timeout_secs, 30);
        assert_eq!(settings.widget.container, "report-container");
        assert_eq!(settings.widget.initial, WidgetConfig::default());
    }

    #[test]
    fn test_initial_widget_config_uses_host_field_names() {
        let settings = parse(
            r#"
            [backend]
            origin = "https://tenant.example.com"

            [widget.initial]
            powerBIEndPoint = "/pbi"
            workspace = "w1"
            isFilterPaneEnabled = true

            [widget.initial.report]
            id = "r1"
            name = "Revenue"
            "#,
        );

        assert_eq!(settings.backend.origin, "https://tenant.example.com");
        let initial = settings.widget.initial;
        assert_eq!(initial.powerbi_endpoint, "/pbi");
        assert_eq!(initial.workspace.as_deref(), Some("w1"));
        assert_eq!(initial.report.unwrap().id, "r1");
        assert!(initial.filter_pane_enabled);
    }
}
