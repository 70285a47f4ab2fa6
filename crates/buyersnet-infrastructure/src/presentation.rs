//! Tracing-backed presentation adapters.
//!
//! Used when the notifier runs without a UI (CLI, background workers):
//! toasts, navigation and OS notifications are written to the log.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use buyersnet_core::error::Result;
use buyersnet_core::notification::{
    Navigator, NotificationPermission, OsNotification, OsNotifier, Toast, Toaster,
};

#[derive(Debug, Default)]
pub struct TracingToaster;

impl Toaster for TracingToaster {
    fn show(&self, toast: Toast) {
        tracing::info!(
            target: "toast",
            action = toast.action.as_ref().map(|a| a.path.as_str()),
            "{}: {}",
            toast.title,
            toast.description
        );
    }
}

#[derive(Debug, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(target: "navigation", "Navigate to {}", path);
    }

    fn focus_window(&self) {
        tracing::debug!(target: "navigation", "Focus window");
    }
}

/// Simulated platform notification API.
///
/// Keeps the permission state and the set of open notifications, and closes
/// each notification after its `auto_dismiss` delay unless it was replaced
/// (same tag) or closed in the meantime.
pub struct TracingOsNotifier {
    permission: Mutex<NotificationPermission>,
    prompt_answer: NotificationPermission,
    visible: AtomicBool,
    prompts: AtomicUsize,
    generation: AtomicU64,
    open: Arc<Mutex<HashMap<String, u64>>>,
}

impl TracingOsNotifier {
    /// `prompt_answer` is what the member answers when prompted.
    pub fn new(permission: NotificationPermission, prompt_answer: NotificationPermission) -> Self {
        Self {
            permission: Mutex::new(permission),
            prompt_answer,
            visible: AtomicBool::new(true),
            prompts: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            open: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn set_document_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    /// How many times the member was prompted.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Tags of the notifications currently on screen.
    pub fn open_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = lock(&self.open).keys().cloned().collect();
        tags.sort();
        tags
    }
}

#[async_trait]
impl OsNotifier for TracingOsNotifier {
    fn permission(&self) -> NotificationPermission {
        *lock(&self.permission)
    }

    async fn request_permission(&self) -> Result<NotificationPermission> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let mut permission = lock(&self.permission);
        if *permission == NotificationPermission::Default {
            *permission = self.prompt_answer;
        }
        tracing::info!(target: "os_notification", "Permission prompt answered: {}", *permission);
        Ok(*permission)
    }

    fn is_document_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn show(&self, notification: OsNotification) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.open).insert(notification.tag.clone(), generation);
        tracing::info!(
            target: "os_notification",
            tag = %notification.tag,
            "{}: {}",
            notification.title,
            notification.body
        );

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let open = Arc::clone(&self.open);
                let tag = notification.tag;
                let delay = notification.auto_dismiss;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    let mut open = lock(&open);
                    if open.get(&tag) == Some(&generation) {
                        open.remove(&tag);
                        tracing::debug!(target: "os_notification", tag = %tag, "Auto-dismissed");
                    }
                });
            }
            Err(_) => {
                tracing::debug!(
                    target: "os_notification",
                    "No runtime, notification stays until closed"
                );
            }
        }
        Ok(())
    }

    fn close(&self, tag: &str) {
        if lock(&self.open).remove(tag).is_some() {
            tracing::debug!(target: "os_notification", tag, "Closed");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
