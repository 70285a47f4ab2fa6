use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use buyersnet_core::config::NotifierConfig;
use buyersnet_core::messaging::{
    ConversationId, ConversationUpdate, Message, MessagingService, Subscription,
};
use buyersnet_core::notification::{
    Navigator, NotificationPermission, OsNotification, OsNotifier, ToastAction, Toaster,
};
use buyersnet_core::user::{Session, UserId};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::dispatcher::{DispatchOutcome, NotificationDispatcher};

/// External collaborators of the notifier.
#[derive(Clone)]
pub struct NotifierDeps {
    pub messaging: Arc<dyn MessagingService>,
    pub toaster: Arc<dyn Toaster>,
    pub os: Arc<dyn OsNotifier>,
    pub navigator: Arc<dyn Navigator>,
}

/// Subscriptions and listener task bound to one signed-in identity.
struct IdentityListener {
    user_id: UserId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Tracks unread messages and notifies the member about new ones.
///
/// The unread count is always a snapshot fetched from the messaging
/// backend, never adjusted locally. Subscriptions live in a listener task
/// scoped to the signed-in identity; [`set_user`](Self::set_user) tears the
/// old task down completely before the next identity's subscriptions open.
pub struct MessageNotifier {
    deps: NotifierDeps,
    config: NotifierConfig,
    unread: Arc<watch::Sender<u32>>,
    active_conversation: watch::Sender<Option<ConversationId>>,
    listener: Mutex<Option<IdentityListener>>,
    permission_prompted: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

impl MessageNotifier {
    /// Creates the notifier and schedules the one automatic OS permission
    /// prompt. Must be called inside a tokio runtime.
    pub fn new(deps: NotifierDeps, config: NotifierConfig) -> Arc<Self> {
        let (unread, _) = watch::channel(0);
        let (active_conversation, _) = watch::channel(None);
        let notifier = Arc::new(Self {
            deps,
            config,
            unread: Arc::new(unread),
            active_conversation,
            listener: Mutex::new(None),
            permission_prompted: Arc::new(AtomicBool::new(false)),
            shutdown: CancellationToken::new(),
        });
        notifier.schedule_permission_prompt();
        notifier
    }

    // ============================================================================
    // Unread count
    // ============================================================================

    pub fn unread_count(&self) -> u32 {
        *self.unread.borrow()
    }

    pub fn subscribe_unread_count(&self) -> watch::Receiver<u32> {
        self.unread.subscribe()
    }

    /// Re-fetches the unread count for the signed-in member.
    ///
    /// On failure the last known count is kept.
    pub async fn refresh_unread_count(&self) {
        let listener = self.listener.lock().await;
        if let Some(listener) = listener.as_ref() {
            recount(self.deps.messaging.as_ref(), &listener.user_id, &self.unread).await;
        }
    }

    // ============================================================================
    // Active conversation
    // ============================================================================

    /// Records the conversation the member is viewing. Written by routing.
    pub fn set_active_conversation(&self, conversation_id: Option<ConversationId>) {
        self.active_conversation.send_replace(conversation_id);
    }

    pub fn active_conversation(&self) -> Option<ConversationId> {
        self.active_conversation.borrow().clone()
    }

    /// Updates the active conversation from a route change.
    ///
    /// Inside the messages area the focused conversation becomes active;
    /// anywhere else it is cleared.
    pub fn on_route_change(&self, path: &str, conversation_id: Option<&str>) {
        let in_messages = path == self.config.messages_route
            || path
                .strip_prefix(self.config.messages_route.as_str())
                .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'));
        let active = if in_messages {
            conversation_id.map(str::to_string)
        } else {
            None
        };
        self.set_active_conversation(active);
    }

    // ============================================================================
    // Identity lifecycle
    // ============================================================================

    /// Binds the notifier to the signed-in member, or to nobody.
    ///
    /// Subscriptions for the previous identity are closed before anything is
    /// opened for the new one. Any identity change resets the unread count
    /// to zero before the new member's count is fetched.
    pub async fn set_user(&self, user_id: Option<UserId>) {
        let mut listener = self.listener.lock().await;
        let current = listener.as_ref().map(|l| l.user_id.as_str());
        if current == user_id.as_deref() {
            return;
        }

        if let Some(previous) = listener.take() {
            Self::teardown(previous).await;
        }
        self.unread.send_replace(0);

        let Some(user_id) = user_id else {
            tracing::info!(target: "message_notifier", "Signed out, notifications stopped");
            return;
        };

        if self.shutdown.is_cancelled() {
            return;
        }

        recount(self.deps.messaging.as_ref(), &user_id, &self.unread).await;
        *listener = Some(self.spawn_listener(user_id).await);
    }

    /// Follows session changes until the session channel closes.
    pub fn follow_session(self: &Arc<Self>, mut sessions: watch::Receiver<Session>) -> JoinHandle<()> {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let user_id = sessions.borrow_and_update().user_id.clone();
                notifier.set_user(user_id).await;
                tokio::select! {
                    _ = notifier.shutdown.cancelled() => break,
                    changed = sessions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }

    /// Stops every task and releases the current subscriptions.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        if let Some(previous) = self.listener.lock().await.take() {
            Self::teardown(previous).await;
        }
    }

    // ============================================================================
    // Click handling
    // ============================================================================

    pub fn on_toast_action(&self, action: &ToastAction) {
        self.deps.navigator.navigate(&action.path);
    }

    /// Focuses the app, opens the conversation and closes the notification.
    pub fn on_os_notification_click(&self, notification: &OsNotification) {
        self.deps.navigator.focus_window();
        self.deps.navigator.navigate(&notification.path);
        self.deps.os.close(&notification.tag);
    }

    // ============================================================================
    // Internals
    // ============================================================================

    async fn spawn_listener(&self, user_id: UserId) -> IdentityListener {
        let messaging = self.deps.messaging.clone();

        let updates = match messaging.subscribe_conversation_updates(&user_id).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                tracing::warn!(
                    target: "message_notifier",
                    "Conversation updates unavailable for {}: {}",
                    user_id,
                    e
                );
                None
            }
        };
        let messages = match messaging.subscribe_new_messages(&user_id).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                tracing::warn!(
                    target: "message_notifier",
                    "New message feed unavailable for {}: {}",
                    user_id,
                    e
                );
                None
            }
        };

        let dispatcher = NotificationDispatcher::new(
            self.deps.toaster.clone(),
            self.deps.os.clone(),
            self.active_conversation.subscribe(),
            self.config.clone(),
        );
        let cancel = self.shutdown.child_token();
        let task = ListenerTask {
            user_id: user_id.clone(),
            messaging,
            unread: self.unread.clone(),
            dispatcher,
        };
        let handle = tokio::spawn(task.run(updates, messages, cancel.clone()));

        tracing::info!(target: "message_notifier", "Listening for messages to {}", user_id);
        IdentityListener {
            user_id,
            cancel,
            handle,
        }
    }

    async fn teardown(listener: IdentityListener) {
        listener.cancel.cancel();
        if let Err(e) = listener.handle.await {
            tracing::warn!(
                target: "message_notifier",
                "Listener for {} ended abnormally: {}",
                listener.user_id,
                e
            );
        }
        tracing::debug!(
            target: "message_notifier",
            "Released subscriptions for {}",
            listener.user_id
        );
    }

    fn schedule_permission_prompt(&self) {
        let os = self.deps.os.clone();
        let prompted = self.permission_prompted.clone();
        let delay = self.config.permission_prompt_delay;
        let cancel = self.shutdown.child_token();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if os.permission() != NotificationPermission::Default {
                return;
            }
            if prompted.swap(true, Ordering::SeqCst) {
                return;
            }
            match os.request_permission().await {
                Ok(permission) => tracing::info!(
                    target: "message_notifier",
                    "Notification permission: {}",
                    permission
                ),
                Err(e) => tracing::warn!(
                    target: "message_notifier",
                    "Notification permission prompt unavailable: {}",
                    e
                ),
            }
        });
    }
}

/// Body of the per-identity listener.
struct ListenerTask {
    user_id: UserId,
    messaging: Arc<dyn MessagingService>,
    unread: Arc<watch::Sender<u32>>,
    dispatcher: NotificationDispatcher,
}

impl ListenerTask {
    async fn run(
        self,
        mut updates: Option<Subscription<ConversationUpdate>>,
        mut messages: Option<Subscription<Message>>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                message = next_event(&mut messages) => match message {
                    Some(message) => {
                        if let DispatchOutcome::Toasted { os_notification } =
                            self.dispatcher.dispatch(&message)
                        {
                            tracing::debug!(
                                target: "message_notifier",
                                message_id = %message.id,
                                os_notification,
                                "Notified about new message"
                            );
                        }
                    }
                    None => {
                        tracing::warn!(target: "message_notifier", "New message feed closed");
                        messages = None;
                    }
                },
                update = next_event(&mut updates) => match update {
                    Some(update) => {
                        tracing::debug!(
                            target: "message_notifier",
                            conversation_id = %update.conversation_id,
                            "Conversation updated, recounting"
                        );
                        recount(self.messaging.as_ref(), &self.user_id, &self.unread).await;
                    }
                    None => {
                        tracing::warn!(target: "message_notifier", "Conversation update feed closed");
                        updates = None;
                    }
                },
            }
        }
        // Subscriptions drop here, closing both feeds.
    }
}

async fn next_event<T>(subscription: &mut Option<Subscription<T>>) -> Option<T> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

async fn recount(messaging: &dyn MessagingService, user_id: &str, unread: &watch::Sender<u32>) {
    match messaging.unread_count(user_id).await {
        Ok(count) => {
            unread.send_replace(count);
        }
        Err(e) => {
            tracing::warn!(
                target: "message_notifier",
                "Failed to fetch unread count for {}, keeping {}: {}",
                user_id,
                *unread.borrow(),
                e
            );
        }
    }
}
