//! Diagnostic channel for fatal protocol failures.
//!
//! When a session hits a fatal condition it raises its [`AlertSink`] before
//! returning the error, so the failure is visible even if the caller drops
//! the `Result`. A supervisor decides what to do next: stop, reset the
//! module, or abort.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::error;

/// Receives fatal diagnostics from a session.
pub trait AlertSink: Send {
    /// Report a fatal condition.
    fn raise(&mut self, message: &str);
}

/// Emits alerts as `error` level tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlert;

impl AlertSink for LogAlert {
    fn raise(&mut self, message: &str) {
        error!("### S.O.S. ### {}", message);
    }
}

/// Collects alerts in memory, shareable with the code that inspects them.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlert {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingAlert {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages raised so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Number of messages raised so far.
    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

impl AlertSink for RecordingAlert {
    fn raise(&mut self, message: &str) {
        error!("### S.O.S. ### {}", message);
        self.messages.lock().push(message.to_string());
    }
}
