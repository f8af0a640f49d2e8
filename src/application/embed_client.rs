// Embedding client seam - The vendor SDK that renders a report into a container
use crate::domain::embed::EmbedConfiguration;
use std::sync::Arc;
use thiserror::Error;

pub type ErrorHandler = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("cannot embed into container {container}: {message}")]
    Rejected { container: String, message: String },
}

/// Handle to one embedded report instance.
pub trait EmbeddedReport: Send + Sync {
    /// Remove every registered error handler
    fn off_error(&self);

    fn on_error(&self, handler: ErrorHandler);
}

pub trait EmbedClient: Send + Sync {
    /// Tear down whatever is currently embedded in `container`
    fn reset(&self, container: &str);

    fn embed(
        &self,
        container: &str,
        config: &EmbedConfiguration,
    ) -> Result<Arc<dyn EmbeddedReport>, EmbedError>;
}
