// Errors raised while talking to the Power BI backend
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PowerBiError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} responded with status {status}")]
    Http { url: String, status: u16 },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("could not load token (status {status})")]
    TokenUnavailable { status: String },

    #[error("Report or Workspace not set")]
    SelectionMissing,
}
