// Page embed client - Hosts each embedded report in a generated HTML page
use crate::application::embed_client::{EmbedClient, EmbedError, EmbeddedReport, ErrorHandler};
use crate::domain::embed::EmbedConfiguration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const POWERBI_CLIENT_SCRIPT: &str =
    "https://cdn.jsdelivr.net/npm/powerbi-client@2.23.1/dist/powerbi.min.js";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Power BI report</title>
<style>html, body, #report-container { margin: 0; width: 100%; height: 100%; }</style>
<script src="__SCRIPT__"></script>
</head>
<body>
<div id="report-container" data-container="__CONTAINER__"></div>
<script>
const embedConfig = __CONFIG__;
const element = document.getElementById("report-container");
powerbi.reset(element);
const report = powerbi.embed(element, embedConfig);
report.off("error");
report.on("error", (event) => {
  fetch("__ERROR_URL__", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ detail: event.detail }),
  });
});
</script>
</body>
</html>
"#;

pub struct EmbeddedPage {
    config: EmbedConfiguration,
    handlers: Mutex<Vec<ErrorHandler>>,
}

impl EmbeddedPage {
    pub fn config(&self) -> &EmbedConfiguration {
        &self.config
    }

    /// Deliver an error event to the registered handlers. Returns how many ran.
    pub fn raise_error(&self, detail: &str) -> usize {
        let handlers = lock(&self.handlers).clone();
        for handler in &handlers {
            handler(detail);
        }
        handlers.len()
    }
}

impl EmbeddedReport for EmbeddedPage {
    fn off_error(&self) {
        lock(&self.handlers).clear();
    }

    fn on_error(&self, handler: ErrorHandler) {
        lock(&self.handlers).push(handler);
    }
}

/// Embedding client that keeps one page per container. The page loads the
/// vendor script and posts error events back to `/embed/{container}/error`.
#[derive(Default)]
pub struct PageEmbedClient {
    pages: Mutex<HashMap<String, Arc<EmbeddedPage>>>,
}

impl PageEmbedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, container: &str) -> Option<Arc<EmbeddedPage>> {
        lock(&self.pages).get(container).cloned()
    }

    /// Render the HTML page for `container`, if a report is embedded there.
    pub fn render(&self, container: &str) -> Option<String> {
        let page = self.page(container)?;
        let config = serde_json::to_string(page.config())
            .ok()?
            .replace("</", "<\\/");
        let error_url = format!("/embed/{}/error", urlencoding::encode(container));

        Some(
            PAGE_TEMPLATE
                .replace("__SCRIPT__", POWERBI_CLIENT_SCRIPT)
                .replace("__CONTAINER__", &escape_html(container))
                .replace("__ERROR_URL__", &error_url)
                .replace("__CONFIG__", &config),
        )
    }

    /// Relay an error event raised by the page. Returns false if nothing is embedded there.
    pub fn report_error(&self, container: &str, detail: &str) -> bool {
        match self.page(container) {
            Some(page) => {
                let delivered = page.raise_error(detail);
                tracing::debug!("Delivered embed error to {} handlers in {}", delivered, container);
                true
            }
            None => false,
        }
    }
}

impl EmbedClient for PageEmbedClient {
    fn reset(&self, container: &str) {
        if lock(&self.pages).remove(container).is_some() {
            tracing::debug!("Reset embed container {}", container);
        }
    }

    fn embed(
        &self,
        container: &str,
        config: &EmbedConfiguration,
    ) -> Result<Arc<dyn EmbeddedReport>, EmbedError> {
        if container.is_empty() {
            return Err(EmbedError::Rejected {
                container: container.to_string(),
                message: "container id is empty".to_string(),
            });
        }
        let page = Arc::new(EmbeddedPage {
            config: config.clone(),
            handlers: Mutex::new(Vec::new()),
        });
        lock(&self.pages).insert(container.to_string(), page.clone());
        Ok(page)
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
