//! Outbound notification transport.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("recipient rejected: {0}")]
    Rejected(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Delivers one rendered message. Implementations may block.
pub trait NotificationSink: Send + Sync {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotificationError>;
}

/// Writes each notification as a log event instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotificationError> {
        info!(to, subject, body_len = html_body.len(), "notification sent");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Keeps everything it is asked to send. Recipients marked with
/// [`fail_for`](Self::fail_for) get a transport error instead.
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    sent: Mutex<Vec<SentNotification>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, recipient: impl Into<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(recipient.into());
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn recipients(&self) -> Vec<String> {
        let mut to: Vec<String> = self.sent().into_iter().map(|n| n.to).collect();
        to.sort();
        to
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotificationError> {
        let fails = self
            .failing
            .lock()
            .map(|failing| failing.contains(to))
            .unwrap_or(false);
        if fails {
            return Err(NotificationError::Transport(format!("mailbox {to} unavailable")));
        }

        self.sent
            .lock()
            .map_err(|_| NotificationError::Transport("recorder poisoned".to_string()))?
            .push(SentNotification {
                to: to.to_string(),
                subject: subject.to_string(),
                html_body: html_body.to_string(),
            });
        Ok(())
    }
}
