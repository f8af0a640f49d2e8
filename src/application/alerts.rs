// Alert surface - Transient user-visible error banners
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

pub const PATH_NOT_FOUND: &str = "Cannot find the Path";
pub const NO_WORKSPACES: &str = "Cannot select report because no workspaces are available.";
pub const REPORT_LOAD_FAILED: &str = "Failed to load report.";
pub const TOKEN_FETCH_FAILED: &str = "Failed to fetch embedding token.";
pub const EMBED_FAILED: &str = "Failed to embed report.";

/// Supplied by the host; receives every failure the panels surface.
pub trait AlertService: Send + Sync {
    fn danger(&self, message: &str);
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// In-memory alert log drained by the host UI.
#[derive(Default)]
pub struct AlertLog {
    alerts: Mutex<Vec<Alert>>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending alert, oldest first.
    pub fn drain(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.alerts.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl AlertService for AlertLog {
    fn danger(&self, message: &str) {
        tracing::warn!("Alert: {}", message);
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Alert {
                message: message.to_string(),
                raised_at: Utc::now(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_log() {
        let log = AlertLog::new();
        log.danger(PATH_NOT_FOUND);
        log.danger(EMBED_FAILED);

        let drained = log.drain();
        assert_eq!(
            drained.iter().map(|a| a.message.as_str()).collect::<Vec<_>>(),
            vec![PATH_NOT_FOUND, EMBED_FAILED]
        );
        assert!(drained[0].raised_at <= drained[1].raised_at);
        assert!(log.drain().is_empty());
    }
}
