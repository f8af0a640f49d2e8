// Test doubles for the transport, alert surface and embedding client
use crate::application::alerts::AlertService;
use crate::application::embed_client::{EmbedClient, EmbedError, EmbeddedReport, ErrorHandler};
use crate::application::error::PowerBiError;
use crate::application::transport::JsonTransport;
use crate::domain::embed::EmbedConfiguration;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

/// Scripted transport keyed by `path?param=value&...`. Queued responses are
/// consumed in order and the last one repeats; unknown keys answer 404.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, PowerBiError>>>>,
    calls: Mutex<Vec<Call>>,
    prefix: Mutex<String>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, key: &str, value: Value) -> Self {
        self.push(key, Ok(value));
        self
    }

    pub fn fail(self, key: &str, error: PowerBiError) -> Self {
        self.push(key, Err(error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.path == path).count()
    }

    pub fn prefix(&self) -> String {
        self.prefix.lock().unwrap().clone()
    }

    fn push(&self, key: &str, response: Result<Value, PowerBiError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(response);
    }

    fn answer(&self, call: Call) -> Result<Value, PowerBiError> {
        let key = if call.params.is_empty() {
            call.path.clone()
        } else {
            let query: Vec<String> = call.params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{}?{}", call.path, query.join("&"))
        };
        self.calls.lock().unwrap().push(call);

        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(PowerBiError::Http { url: key, status: 404 }),
        }
    }
}

#[async_trait]
impl JsonTransport for FakeTransport {
    fn set_prefix(&self, prefix: &str) {
        *self.prefix.lock().unwrap() = prefix.to_string();
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, PowerBiError> {
        self.answer(Call {
            method: "GET",
            path: path.to_string(),
            params: params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: None,
            timeout: None,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, PowerBiError> {
        self.answer(Call {
            method: "POST",
            path: path.to_string(),
            params: Vec::new(),
            body: Some(body.clone()),
            timeout: None,
        })
    }

    async fn delete(&self, path: &str, timeout: Option<Duration>) -> Result<Value, PowerBiError> {
        self.answer(Call {
            method: "DELETE",
            path: path.to_string(),
            params: Vec::new(),
            body: None,
            timeout,
        })
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages().iter().filter(|m| m.as_str() == message).count()
    }
}

impl AlertService for RecordingAlerts {
    fn danger(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingReport {
    handlers: Mutex<Vec<ErrorHandler>>,
    offs: Mutex<usize>,
}

impl RecordingReport {
    pub fn fire_error(&self, detail: &str) {
        let handlers = self.handlers.lock().unwrap().clone();
        for handler in handlers {
            handler(detail);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }

    pub fn off_count(&self) -> usize {
        *self.offs.lock().unwrap()
    }
}

impl EmbeddedReport for RecordingReport {
    fn off_error(&self) {
        *self.offs.lock().unwrap() += 1;
        self.handlers.lock().unwrap().clear();
    }

    fn on_error(&self, handler: ErrorHandler) {
        self.handlers.lock().unwrap().push(handler);
    }
}

#[derive(Default)]
pub struct RecordingEmbedClient {
    pub resets: Mutex<Vec<String>>,
    pub embeds: Mutex<Vec<(String, EmbedConfiguration)>>,
    pub reports: Mutex<Vec<Arc<RecordingReport>>>,
    pub reject: bool,
}

impl RecordingEmbedClient {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    pub fn last_report(&self) -> Option<Arc<RecordingReport>> {
        self.reports.lock().unwrap().last().cloned()
    }

    pub fn embed_count(&self) -> usize {
        self.embeds.lock().unwrap().len()
    }
}

impl EmbedClient for RecordingEmbedClient {
    fn reset(&self, container: &str) {
        self.resets.lock().unwrap().push(container.to_string());
    }

    fn embed(
        &self,
        container: &str,
        config: &EmbedConfiguration,
    ) -> Result<Arc<dyn EmbeddedReport>, EmbedError> {
        if self.reject {
            return Err(EmbedError::Rejected {
                container: container.to_string(),
                message: "container detached".to_string(),
            });
        }
        self.embeds
            .lock()
            .unwrap()
            .push((container.to_string(), config.clone()));
        let report = Arc::new(RecordingReport::default());
        self.reports.lock().unwrap().push(report.clone());
        Ok(report)
    }
}
