// Widget descriptor registered with the host dashboard
use serde::Serialize;

pub const PREVIEW_IMAGE: &str = "/widget/preview.svg";
pub const PREVIEW_SVG: &str = include_str!("../../assets/preview.svg");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementOptions {
    pub no_device_target: bool,
    pub no_new_widgets: bool,
    pub device_target_not_required: bool,
    pub groups_selectable: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub preview_image: &'static str,
    pub component: &'static str,
    pub config_component: &'static str,
    pub options: PlacementOptions,
}

impl WidgetDescriptor {
    pub fn powerbi() -> Self {
        Self {
            id: "powerbi.widget",
            label: "Power BI Widget",
            description: "Display Power BI Reports created from DataHub",
            preview_image: PREVIEW_IMAGE,
            component: "embedding-panel",
            config_component: "config-panel",
            options: PlacementOptions {
                no_device_target: true,
                no_new_widgets: false,
                device_target_not_required: true,
                groups_selectable: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_serializes_placement_options() {
        let value = serde_json::to_value(WidgetDescriptor::powerbi()).unwrap();

        assert_eq!(value["id"], "powerbi.widget");
        assert_eq!(value["configComponent"], "config-panel");
        assert_eq!(value["options"]["noDeviceTarget"], true);
        assert_eq!(value["options"]["noNewWidgets"], false);
        assert_eq!(value["options"]["groupsSelectable"], true);
    }
}
