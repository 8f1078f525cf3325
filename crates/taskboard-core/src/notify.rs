/*
[INPUT]:  Failure and success events from the synchronizer and workflows
[OUTPUT]: User-visible notifications over an unbounded channel
[POS]:    Reporting layer - the only path by which backend errors reach the user
[UPDATE]: When notification levels or payload fields change
*/

use std::fmt;

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

/// Sending half handed to every component that reports to the user.
///
/// Cheap to clone. Sends never fail: with no receiver the notification is
/// only logged.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notification>>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A notifier that only logs
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn error(&self, title: impl Into<String>, description: impl fmt::Display) {
        let title = title.into();
        let description = description.to_string();
        tracing::warn!(title = %title, "{description}");
        self.send(NotificationLevel::Error, title, description);
    }

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
        let title = title.into();
        tracing::info!(title = %title, "notified");
        self.send(NotificationLevel::Success, title, description.into());
    }

    fn send(&self, level: NotificationLevel, title: String, description: String) {
        let Some(tx) = &self.tx else {
            return;
        };
        let notification = Notification {
            level,
            title,
            description,
        };
        if tx.send(notification).is_err() {
            tracing::debug!("notification receiver dropped");
        }
    }
}
