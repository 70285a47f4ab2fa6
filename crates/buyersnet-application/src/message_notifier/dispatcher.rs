//! Turns incoming messages into toasts and OS notifications.

use std::sync::Arc;

use buyersnet_core::config::NotifierConfig;
use buyersnet_core::messaging::{ConversationId, Message};
use buyersnet_core::notification::{
    NotificationPermission, OsNotification, OsNotifier, Toast, ToastAction, Toaster,
};
use tokio::sync::watch;

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The member is viewing the message's conversation.
    Suppressed,
    /// A toast was shown; `os_notification` tells whether an OS
    /// notification was raised as well.
    Toasted { os_notification: bool },
}

/// Truncates `content` to `limit` characters, appending `...` when cut.
pub fn preview(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Route of the conversation view for `conversation_id`.
pub fn conversation_path(messages_route: &str, conversation_id: &str) -> String {
    format!("{}?conversation={}", messages_route, conversation_id)
}

/// Tag under which OS notifications for one conversation coalesce.
pub fn notification_tag(conversation_id: &str) -> String {
    format!("message-{}", conversation_id)
}

pub struct NotificationDispatcher {
    toaster: Arc<dyn Toaster>,
    os: Arc<dyn OsNotifier>,
    active_conversation: watch::Receiver<Option<ConversationId>>,
    config: NotifierConfig,
}

impl NotificationDispatcher {
    pub fn new(
        toaster: Arc<dyn Toaster>,
        os: Arc<dyn OsNotifier>,
        active_conversation: watch::Receiver<Option<ConversationId>>,
        config: NotifierConfig,
    ) -> Self {
        Self {
            toaster,
            os,
            active_conversation,
            config,
        }
    }

    /// Notifies the member about `message` unless they are already looking
    /// at its conversation.
    ///
    /// The active conversation is read from the watch channel at call time,
    /// so a conversation opened after the subscription started is honoured.
    pub fn dispatch(&self, message: &Message) -> DispatchOutcome {
        let is_active = self
            .active_conversation
            .borrow()
            .as_deref()
            .is_some_and(|active| active == message.conversation_id);
        if is_active {
            tracing::debug!(
                target: "message_notifier",
                conversation_id = %message.conversation_id,
                "Suppressing notification for the open conversation"
            );
            return DispatchOutcome::Suppressed;
        }

        let body = preview(&message.content, self.config.preview_limit);
        let path = conversation_path(&self.config.messages_route, &message.conversation_id);

        self.toaster.show(Toast {
            title: message.sender_name.clone(),
            description: body.clone(),
            action: Some(ToastAction {
                label: "View".to_string(),
                path: path.clone(),
            }),
            duration: self.config.toast_duration,
        });

        let os_notification = self.raise_os_notification(message, body, path);
        DispatchOutcome::Toasted { os_notification }
    }

    fn raise_os_notification(&self, message: &Message, body: String, path: String) -> bool {
        if self.os.permission() != NotificationPermission::Granted
            || self.os.is_document_visible()
        {
            return false;
        }

        let notification = OsNotification {
            title: message.sender_name.clone(),
            body,
            icon: self.config.icon.clone(),
            tag: notification_tag(&message.conversation_id),
            path,
            auto_dismiss: self.config.os_auto_dismiss,
        };

        match self.os.show(notification) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    target: "message_notifier",
                    "OS notification unavailable, toast only: {}",
                    e
                );
                false
            }
        }
    }
}
