use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;

/// OS-level notification permission, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationPermission {
    /// The member has not decided yet; prompting is allowed.
    #[default]
    Default,
    Granted,
    Denied,
}

/// Button attached to an in-app toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastAction {
    pub label: String,
    /// Route navigated to when the action is clicked.
    pub path: String,
}

/// In-app toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub action: Option<ToastAction>,
    pub duration: Duration,
}

/// OS-level notification raised while the app is in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Notifications sharing a tag replace each other.
    pub tag: String,
    /// Route navigated to when the notification is clicked.
    pub path: String,
    pub auto_dismiss: Duration,
}
