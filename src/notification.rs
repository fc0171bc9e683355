//! Desktop notification sink.

use crate::Result;
use std::time::Duration;

/// Sink for short-lived desktop notifications
pub trait Notifier: Send + Sync {
    /// Show a notification and return once it has been handed to the backend
    ///
    /// # Errors
    ///
    /// Returns an error if the notification backend is unavailable
    fn notify(&self, title: &str, message: &str, timeout: Duration) -> Result<()>;
}

/// Notifications through the platform notification service
#[cfg(feature = "desktop")]
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

#[cfg(feature = "desktop")]
impl DesktopNotifier {
    #[must_use]
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[cfg(feature = "desktop")]
impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str, timeout: Duration) -> Result<()> {
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);

        notify_rust::Notification::new()
            .appname(&self.app_name)
            .summary(title)
            .body(message)
            .timeout(notify_rust::Timeout::Milliseconds(timeout_ms))
            .show()
            .map_err(|e| crate::Error::Notification(e.to_string()))?;

        Ok(())
    }
}
