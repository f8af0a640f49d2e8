// Domain layer - Widget configuration and Power BI models
pub mod configuration;
pub mod embed;
pub mod powerbi;
pub mod widget;
