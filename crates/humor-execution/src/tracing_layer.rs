//! Custom tracing layer for streaming voting events to the terminal UI
//!
//! Events emitted by the voting controller are captured and forwarded
//! through a tokio channel so the interactive loop can show them as notices.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Target prefix of the events this layer forwards.
pub const VOTING_TARGET_PREFIX: &str = "humor_application";

/// Event data sent to the UI
#[derive(Debug, Clone, serde::Serialize)]
pub struct VotingLogEvent {
    /// Event target (e.g., "humor_application::voting::controller")
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    /// Human-readable message
    pub message: String,
    /// Structured fields from the event (user_id, caption_id, epoch, ...)
    pub fields: HashMap<String, Value>,
    pub timestamp: String,
}

impl VotingLogEvent {
    /// Returns a string field, if present.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    pub fn is_warning(&self) -> bool {
        self.level == Level::WARN.as_str() || self.level == Level::ERROR.as_str()
    }
}

/// A tracing layer that sends voting events to a channel
pub struct VotingEventLayer {
    sender: mpsc::UnboundedSender<VotingLogEvent>,
    max_level: Level,
}

impl VotingEventLayer {
    /// Forwards INFO and above.
    pub fn new(sender: mpsc::UnboundedSender<VotingLogEvent>) -> Self {
        Self {
            sender,
            max_level: Level::INFO,
        }
    }

    /// Creates a layer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<VotingLogEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Forwards events up to `level` in verbosity.
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }
}

impl<S> Layer<S> for VotingEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(VOTING_TARGET_PREFIX) || *metadata.level() > self.max_level {
            return;
        }

        let mut fields = HashMap::new();
        let mut visitor = FieldVisitor(&mut fields);
        event.record(&mut visitor);

        let message = fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let voting_event = VotingLogEvent {
            target: metadata.target().to_string(),
            level: metadata.level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // The UI may have gone away; dropping the event is fine.
        let _ = self.sender.send(voting_event);
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // `?text` fields arrive quoted.
        let rendered = format!("{:?}", value);
        let rendered = rendered
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .map(str::to_string)
            .unwrap_or(rendered);
        self.0.insert(field.name().to_string(), serde_json::json!(rendered));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture<F: FnOnce()>(layer: VotingEventLayer, f: F) {
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_forwards_voting_events_with_fields() {
        let (layer, mut rx) = VotingEventLayer::channel();

        capture(layer, || {
            tracing::info!(
                target: "humor_application::voting::controller",
                caption_id = "cap-1",
                position = 2u64,
                "Vote recorded"
            );
        });

        let event = rx.try_recv().unwrap();
        assert_eq!(event.message, "Vote recorded");
        assert_eq!(event.level, "INFO");
        assert_eq!(event.field_str("caption_id"), Some("cap-1"));
        assert_eq!(event.fields["position"], 2);
        assert!(!event.fields.contains_key("message"));
        assert!(!event.is_warning());
    }

    #[test]
    fn test_ignores_other_targets_and_verbose_levels() {
        let (layer, mut rx) = VotingEventLayer::channel();

        capture(layer, || {
            tracing::info!(target: "humor_infrastructure::supabase", "Fetched captions");
            tracing::debug!(target: "humor_application::voting", "Loading");
            tracing::warn!(target: "humor_application::voting", "Vote failed");
        });

        let event = rx.try_recv().unwrap();
        assert_eq!(event.message, "Vote failed");
        assert!(event.is_warning());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_display_fields_are_unquoted() {
        let (layer, mut rx) = VotingEventLayer::channel();
        let user = String::from("user-7");

        capture(layer.with_max_level(Level::DEBUG), || {
            tracing::debug!(target: "humor_application::voting", user_id = %user, "Loading captions");
        });

        let event = rx.try_recv().unwrap();
        assert_eq!(event.field_str("user_id"), Some("user-7"));
    }
}
