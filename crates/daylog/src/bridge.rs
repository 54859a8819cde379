//! Forward host `tracing` events into a facade category.

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::category::Category;
use crate::facade::LogFacade;
use crate::value::LogValue;

const OWN_TARGET: &str = "daylog";

/// A tracing Layer that logs every host event through a [`LogFacade`].
///
/// The event target becomes the scope and its fields become structured
/// data. Events emitted by this crate itself are skipped so the facade's
/// diagnostics never end up in category files.
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tracing_subscriber::prelude::*;
///
/// let facade = Arc::new(daylog::LogFacade::new()?);
/// tracing_subscriber::registry()
///     .with(daylog::FacadeLayer::new(facade.clone(), "default"))
///     .init();
/// ```
pub struct FacadeLayer {
    facade: Arc<LogFacade>,
    category: Category,
}

impl FacadeLayer {
    pub fn new(facade: Arc<LogFacade>, category: impl Into<Category>) -> Self {
        Self {
            facade,
            category: category.into(),
        }
    }
}

impl<S> Layer<S> for FacadeLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();
        if target == OWN_TARGET || target.starts_with("daylog::") {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut values = vec![LogValue::Str(visitor.message.unwrap_or_default())];
        if !visitor.fields.is_empty() {
            values.push(LogValue::Map(visitor.fields));
        }

        self.facade.log(self.category.clone(), target, values);
    }
}

/// Splits an event into its message and the remaining fields.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut buf = String::new();
        let _ = write!(&mut buf, "{:?}", value);
        self.record_str(field, &buf);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), Value::Bool(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields
                .insert(field.name().to_string(), Value::Number(n));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FacadeConfig;
    use crate::sink::CaptureBuffer;
    use std::fs;
    use tempfile::tempdir;
    use tracing_subscriber::prelude::*;

    fn facade(dir: &std::path::Path, buffer: &CaptureBuffer) -> Arc<LogFacade> {
        let config = FacadeConfig::default()
            .with_base_dir(dir.join("logs"))
            .with_color(false)
            .with_console_capture(buffer.clone());
        Arc::new(LogFacade::with_config(config).unwrap())
    }

    #[test]
    fn test_host_events_reach_category_file() {
        let dir = tempdir().unwrap();
        let buffer = CaptureBuffer::new();
        let facade = facade(dir.path(), &buffer);
        facade.register_file_sink("events").unwrap();

        let subscriber =
            tracing_subscriber::registry().with(FacadeLayer::new(facade.clone(), "events"));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "checkout", order = 7, paid = true, "payment captured");
        });

        let contents = fs::read_to_string(facade.log_dir().join("events.log")).unwrap();
        assert!(contents.contains(r#"[INFO] [checkout] payment captured {"order":7,"paid":true}"#));
        assert!(buffer.contents().contains("payment captured"));
    }

    #[test]
    fn test_own_diagnostics_are_not_forwarded() {
        let dir = tempdir().unwrap();
        let buffer = CaptureBuffer::new();
        let facade = facade(dir.path(), &buffer);

        let subscriber =
            tracing_subscriber::registry().with(FacadeLayer::new(facade.clone(), "default"));
        tracing::subscriber::with_default(subscriber, || {
            facade.register_file_sink("audit").unwrap();
        });

        let contents = fs::read_to_string(facade.log_dir().join("default.log")).unwrap();
        assert!(contents.is_empty());
        assert!(buffer.contents().is_empty());
    }
}
