//! Transient user notifications raised by the gateway.
//!
//! The gateway reports every failed request here before handing the error
//! back to the caller. Front ends pick the implementation that fits how they
//! surface messages.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::warn;

/// Receives user-facing error messages.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Writes notifications to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        warn!(message, "Request failed");
    }
}

/// Buffers notifications until a front end drains them.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    messages: Mutex<VecDeque<String>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every pending message, oldest first
    pub fn drain(&self) -> Vec<String> {
        let mut messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        messages.drain(..).collect()
    }
}

impl Notifier for NotificationQueue {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(message.to_string());
    }
}
