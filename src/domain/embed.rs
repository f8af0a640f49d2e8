// Embed configuration handed to the report embedding client
use serde::{Serialize, Serializer};

/// Token kinds understood by the embedding client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Aad,
    Embed,
}

impl Serialize for TokenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            TokenType::Aad => 0,
            TokenType::Embed => 1,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundType {
    Default,
    Transparent,
}

impl Serialize for BackgroundType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            BackgroundType::Default => 0,
            BackgroundType::Transparent => 1,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSettings {
    pub filter_pane_enabled: bool,
    pub nav_content_pane_enabled: bool,
    pub background: BackgroundType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedConfiguration {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub embed_url: String,
    pub token_type: TokenType,
    pub access_token: String,
    pub settings: EmbedSettings,
}

impl EmbedConfiguration {
    pub fn report(
        report_id: String,
        embed_url: String,
        access_token: String,
        filter_pane_enabled: bool,
        nav_pane_enabled: bool,
    ) -> Self {
        Self {
            kind: "report",
            id: report_id,
            embed_url,
            token_type: TokenType::Embed,
            access_token,
            settings: EmbedSettings {
                filter_pane_enabled,
                nav_content_pane_enabled: nav_pane_enabled,
                background: BackgroundType::Transparent,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_configuration_shape() {
        let config = EmbedConfiguration::report(
            "r1".to_string(),
            "https://app.powerbi.com/reportEmbed".to_string(),
            "tok".to_string(),
            true,
            false,
        );

        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "type": "report",
                "id": "r1",
                "embedUrl": "https://app.powerbi.com/reportEmbed",
                "tokenType": 1,
                "accessToken": "tok",
                "settings": {
                    "filterPaneEnabled": true,
                    "navContentPaneEnabled": false,
                    "background": 1
                }
            })
        );
    }
}
