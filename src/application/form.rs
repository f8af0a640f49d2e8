// Form controls with explicit change subscriptions
use crate::domain::configuration::{ConnectionSettings, WidgetConfig};
use crate::domain::powerbi::{Report, Workspace};
use serde::Serialize;

pub type Subscriber<T> = Box<dyn Fn(&T) + Send + Sync>;

/// A single form field. Every `set_value` notifies the subscribers registered
/// so far; values set before a subscription are not replayed.
pub struct FormControl<T> {
    value: T,
    validator: Option<fn(&T) -> bool>,
    subscribers: Vec<Subscriber<T>>,
}

impl<T> FormControl<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            validator: None,
            subscribers: Vec::new(),
        }
    }

    pub fn required(value: T, validator: fn(&T) -> bool) -> Self {
        Self {
            value,
            validator: Some(validator),
            subscribers: Vec::new(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn set_value(&mut self, value: T) {
        self.value = value;
        for subscriber in &self.subscribers {
            subscriber(&self.value);
        }
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&T) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn is_valid(&self) -> bool {
        self.validator.is_none_or(|valid| valid(&self.value))
    }
}

/// The configuration panel form: connection group, pane toggles, workspace and report.
pub struct ConfigForm {
    pub connection: FormControl<ConnectionSettings>,
    pub is_filter_enabled: FormControl<bool>,
    pub is_nav_pane_enabled: FormControl<bool>,
    pub workspace: FormControl<Option<Workspace>>,
    pub report: FormControl<Option<Report>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    pub connection: ConnectionSettings,
    pub is_filter_enabled: bool,
    pub is_nav_pane_enabled: bool,
    pub workspace: Option<Workspace>,
    pub report: Option<Report>,
}

impl ConfigForm {
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            connection: FormControl::required(config.connection(), ConnectionSettings::is_complete),
            is_filter_enabled: FormControl::new(config.filter_pane_enabled),
            is_nav_pane_enabled: FormControl::new(config.nav_pane_enabled),
            workspace: FormControl::required(None, Option::is_some),
            report: FormControl::required(None, Option::is_some),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.connection.is_valid()
            && self.is_filter_enabled.is_valid()
            && self.is_nav_pane_enabled.is_valid()
            && self.workspace.is_valid()
            && self.report.is_valid()
    }

    pub fn values(&self) -> FormValues {
        FormValues {
            connection: self.connection.value().clone(),
            is_filter_enabled: *self.is_filter_enabled.value(),
            is_nav_pane_enabled: *self.is_nav_pane_enabled.value(),
            workspace: self.workspace.value().clone(),
            report: self.report.value().clone(),
        }
    }
}
