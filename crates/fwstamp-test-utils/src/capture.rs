//! In-memory capture of `tracing` events.
//!
//! Install a [`LogCapture`] as the thread-default subscriber to assert on
//! exactly what an operation logged.

use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// A single captured log entry.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    /// The formatted message.
    pub message: String,
}

/// A `tracing` layer that records every event it sees.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the default subscriber for the current thread.
    ///
    /// Events are captured until the returned guard is dropped.
    pub fn install() -> (LogReader, DefaultGuard) {
        let capture = Self::new();
        let reader = capture.reader();
        let guard = tracing_subscriber::registry().with(capture).set_default();
        (reader, guard)
    }

    pub fn reader(&self) -> LogReader {
        LogReader {
            events: Arc::clone(&self.events),
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *metadata.level(),
                target: metadata.target().to_string(),
                message: visitor.message,
            });
        }
    }
}

/// A read handle for captured events.
#[derive(Debug, Clone)]
pub struct LogReader {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogReader {
    /// Snapshot of all captured events.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Messages logged at `level`, in order.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

/// Visitor that extracts the `message` field from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_levels_and_messages() {
        let (reader, _guard) = LogCapture::install();

        tracing::info!("hello from test");
        tracing::warn!(code = 3, "a warning");

        let events = reader.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, Level::INFO);
        assert_eq!(events[0].message, "hello from test");
        assert_eq!(reader.messages_at(Level::WARN), vec!["a warning".to_string()]);
    }
}
