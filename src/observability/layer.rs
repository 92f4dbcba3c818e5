//! Bridge from the `tracing` facade to a [`CloudLoggingHandler`].
//!
//! Each event becomes one [`Record`]: the `message` field is the record
//! message, every other field an attribute, and the callsite metadata the
//! caller info. Events emitted by this crate are never forwarded.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::handler::CloudLoggingHandler;
use crate::record::{Attr, Caller, Level, Record};

const INTERNAL_TARGET: &str = env!("CARGO_CRATE_NAME");

/// `tracing` layer forwarding events through a handler.
#[derive(Debug, Clone)]
pub struct CloudLoggingLayer {
    handler: CloudLoggingHandler,
}

impl CloudLoggingLayer {
    pub fn new(handler: CloudLoggingHandler) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &CloudLoggingHandler {
        &self.handler
    }
}

fn is_internal(target: &str) -> bool {
    target
        .strip_prefix(INTERNAL_TARGET)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
}

impl<S> Layer<S> for CloudLoggingLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_internal(metadata.target()) {
            return;
        }

        let level = Level::from(*metadata.level());
        if !self.handler.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let caller = Caller {
            function: metadata.module_path().map(str::to_string),
            file: metadata.file().map(str::to_string),
            line: metadata.line(),
        };
        let record = Record::new(level, visitor.message.unwrap_or_default())
            .with_caller(caller)
            .with_attrs(visitor.attrs);

        if let Err(e) = self.handler.handle(record) {
            tracing::warn!(error = %e, target_name = metadata.target(), "Failed to forward event");
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    attrs: Vec<Attr>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, attr: impl FnOnce(&'static str) -> Attr) {
        self.attrs.push(attr(field.name()));
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.push(field, |key| Attr::string(key, text));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push(field, |key| Attr::string(key, value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, |key| Attr::int(key, value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, |key| Attr::new(key, value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, |key| Attr::new(key, value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, |key| Attr::bool(key, value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, |key| Attr::string(key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_targets() {
        assert!(is_internal("cloud_log_handler"));
        assert!(is_internal("cloud_log_handler::handler"));
        assert!(!is_internal("cloud_log_handler_ext"));
        assert!(!is_internal("my_app::db"));
    }
}
