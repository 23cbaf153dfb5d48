#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Log stream plumbing for the SDK.
//!
//! Every crate in the workspace logs through `tracing`. This crate turns
//! those events into [`LogEntry`] values and hands them to a caller-supplied
//! [`LogStream`], dropping entries below the configured [`LevelFilter`].

use std::fmt::{self, Write as _};
use std::sync::Arc;

use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use types::{LevelFilter, LogEntry};

/// Errors raised while installing a log stream
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber is already installed in this process
    #[error("log stream already created")]
    AlreadyInitialized,
}

/// Receiver of SDK log lines.
///
/// `log` is called from whichever thread emitted the event, possibly from
/// several threads at once. Implementations must return promptly.
pub trait LogStream: Send + Sync {
    /// Handle one log entry.
    fn log(&self, l: LogEntry);
}

/// `tracing` layer forwarding events to a [`LogStream`].
pub struct LogStreamLayer {
    listener: Arc<dyn LogStream>,
    filter: LevelFilter,
}

impl LogStreamLayer {
    /// Create a layer forwarding entries that pass `filter` to `listener`.
    pub fn new(listener: Arc<dyn LogStream>, filter: LevelFilter) -> Self {
        Self { listener, filter }
    }
}

impl<S: Subscriber> Layer<S> for LogStreamLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = event.metadata().level().as_str();
        if !self.filter.allows(level) {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.listener.log(LogEntry { line: visitor.finish(), level: level.to_string() });
    }
}

/// Collects the event message followed by its other fields as `key=value`.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}

/// Install `listener` as the process-wide log stream.
///
/// Only one subscriber can be installed per process; later calls return
/// [`LoggingError::AlreadyInitialized`].
pub fn init_log_stream(
    listener: Arc<dyn LogStream>,
    filter: LevelFilter,
) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(LogStreamLayer::new(listener, filter))
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
