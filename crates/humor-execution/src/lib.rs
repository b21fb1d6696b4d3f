//! Runtime wiring for tracing.
//!
//! - `logging`: Subscriber initialisation (console, JSON, rolling file)
//! - `tracing_layer`: Forwards voting events to a channel for the UI

pub mod logging;
pub mod tracing_layer;

pub use logging::{LoggingGuard, TracingSetup};
pub use tracing_layer::{VotingEventLayer, VotingLogEvent};
