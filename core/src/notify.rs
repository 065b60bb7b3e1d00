//! Transient failure notifications.
//!
//! Building the notification value is pure; delivering it is the
//! [`NotificationSink`]'s business. The two are composed only by
//! [`crate::client::RequestPipeline::fail`], and only for calls that
//! declared a failure message. Delivery is fire-and-forget: it never
//! blocks and never alters the error returned to the caller.

use std::time::Duration;

use uuid::Uuid;

use crate::error::ClientError;

/// How long a failure toast stays on screen.
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

/// One transient user-facing alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Fresh per notification, so concurrent failures never coalesce.
    pub id: Uuid,
    /// The failure message the call site declared.
    pub title: String,
    /// The normalized error's notification message.
    pub message: String,
    pub duration: Duration,
}

impl Notification {
    pub fn for_failure(title: &str, error: &ClientError) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            message: error.value.message_for_notification.clone(),
            duration: NOTIFICATION_DURATION,
        }
    }
}

/// Where failure notifications go. The application plugs its toast layer
/// in here; tests record, [`LogSink`] just logs.
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// Sink that emits notifications as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        tracing::error!(
            id = %notification.id,
            title = %notification.title,
            "{}",
            notification.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{normalize, FailureCause};

    #[test]
    fn notification_carries_title_message_and_duration() {
        let error = normalize(FailureCause::Network);
        let notification = Notification::for_failure("Failed to load projects", &error);
        assert_eq!(notification.title, "Failed to load projects");
        assert_eq!(notification.message, "Network error");
        assert_eq!(notification.duration, Duration::from_secs(3));
    }

    #[test]
    fn identifiers_are_fresh_per_notification() {
        let error = normalize(FailureCause::Network);
        let a = Notification::for_failure("t", &error);
        let b = Notification::for_failure("t", &error);
        assert_ne!(a.id, b.id);
    }
}
