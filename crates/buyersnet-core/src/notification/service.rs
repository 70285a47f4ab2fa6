//! Presentation-side collaborator traits.

use async_trait::async_trait;

use super::model::{NotificationPermission, OsNotification, Toast};
use crate::error::Result;

/// Shows in-app toasts.
pub trait Toaster: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Platform notification API.
#[async_trait]
pub trait OsNotifier: Send + Sync {
    /// Returns the current permission without prompting.
    fn permission(&self) -> NotificationPermission;

    /// Prompts the member for permission and returns their answer.
    async fn request_permission(&self) -> Result<NotificationPermission>;

    /// Returns true while the app window is visible and focused.
    fn is_document_visible(&self) -> bool;

    /// Raises a notification, replacing any open one with the same tag.
    fn show(&self, notification: OsNotification) -> Result<()>;

    /// Closes the notification with `tag`, if still open.
    fn close(&self, tag: &str);
}

/// Routing collaborator.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);

    fn focus_window(&self);
}
