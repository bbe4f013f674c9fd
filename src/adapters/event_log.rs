//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each controller event as one line,
//! `<ISO-8601 UTC with milliseconds> <event>`, through the `log` facade,
//! then handing the same line to the notification dispatcher.  Recording
//! never blocks and never fails the controller.

use chrono::{DateTime, SecondsFormat, Utc};
use log::info;

use crate::app::events::AlarmEvent;
use crate::app::ports::EventSink;

use super::notify::NotifyDispatcher;

/// Format one event line.
pub fn format_line(event: &AlarmEvent, at: DateTime<Utc>) -> String {
    format!("{} {event}", at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Adapter that logs every [`AlarmEvent`] and forwards it to the backends.
pub struct EventLog {
    dispatcher: Option<NotifyDispatcher>,
}

impl EventLog {
    /// Log-only sink.
    pub fn new() -> Self {
        Self { dispatcher: None }
    }

    /// Log and forward to `dispatcher`.
    pub fn with_dispatcher(dispatcher: NotifyDispatcher) -> Self {
        Self {
            dispatcher: Some(dispatcher),
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventLog {
    fn record(&mut self, event: &AlarmEvent, at: DateTime<Utc>) {
        let line = format_line(event, at);
        info!(target: "quietguard::events", "{line}");
        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.dispatch(line);
        }
    }
}
