// Application layer - Data service, panels and the seams to external collaborators
pub mod alerts;
pub mod config_panel;
pub mod embed_client;
pub mod embed_panel;
pub mod error;
pub mod form;
pub mod powerbi_service;
pub mod transport;

#[cfg(test)]
pub mod testing;
