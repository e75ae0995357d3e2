use std::any::Any;
use std::sync::Arc;

use super::{Extension, ExtensionKind};

/// `(category, action, label, value)`
pub type EventFn = Arc<dyn Fn(&str, &str, &str, i32) + Send + Sync>;
/// `(category, message)`
pub type MessageFn = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Forwards usage events from a frontend to caller-provided sinks.
pub struct TelemetryExtension {
    event_category: String,
    on_event: Option<EventFn>,
    on_error: Option<MessageFn>,
    on_stack_trace: Option<MessageFn>,
}

impl TelemetryExtension {
    pub fn new(event_category: impl Into<String>) -> Self {
        Self {
            event_category: event_category.into(),
            on_event: None,
            on_error: None,
            on_stack_trace: None,
        }
    }

    pub fn on_event(mut self, f: impl Fn(&str, &str, &str, i32) + Send + Sync + 'static) -> Self {
        self.on_event = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn on_stack_trace(mut self, f: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.on_stack_trace = Some(Arc::new(f));
        self
    }

    pub fn event_category(&self) -> &str {
        &self.event_category
    }

    pub fn send_event(&self, action: &str, label: &str, value: i32) {
        if let Some(f) = &self.on_event {
            f(&self.event_category, action, label, value);
        }
    }

    pub fn send_error(&self, message: &str) {
        if let Some(f) = &self.on_error {
            f(&self.event_category, message);
        }
    }

    pub fn send_stack_trace(&self, message: &str) {
        if let Some(f) = &self.on_stack_trace {
            f(&self.event_category, message);
        }
    }
}

impl Extension for TelemetryExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Telemetry
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
