//! In-memory messaging backend with realtime fan-out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use buyersnet_core::BuyersNetError;
use buyersnet_core::error::Result;
use buyersnet_core::messaging::{
    ConversationId, ConversationUpdate, Message, MessagingService, Subscription,
};
use buyersnet_core::user::UserId;
use tokio::sync::mpsc;

type Subscribers<T> = HashMap<UserId, Vec<(u64, mpsc::UnboundedSender<T>)>>;

#[derive(Default)]
struct Inner {
    conversations: HashMap<ConversationId, Vec<UserId>>,
    /// Unread messages per (recipient, conversation).
    unread: HashMap<(UserId, ConversationId), u32>,
    message_subscribers: Subscribers<Message>,
    update_subscribers: Subscribers<ConversationUpdate>,
    next_subscriber_id: u64,
    closed_subscriptions: usize,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_subscriber_id += 1;
        self.next_subscriber_id
    }

    fn notify_update(&mut self, user_id: &str, conversation_id: &str) {
        if let Some(senders) = self.update_subscribers.get_mut(user_id) {
            senders.retain(|(_, tx)| {
                tx.send(ConversationUpdate {
                    conversation_id: conversation_id.to_string(),
                })
                .is_ok()
            });
        }
    }
}

/// Messaging backend held in memory.
///
/// Mirrors the hosted backend's behaviour closely enough for end-to-end
/// runs: per-recipient unread counts, a new-message feed per recipient and
/// a conversation-update feed for every participant.
#[derive(Default)]
pub struct InMemoryMessagingService {
    inner: Arc<Mutex<Inner>>,
    offline: AtomicBool,
}

impl InMemoryMessagingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a conversation between `participants` and returns its id.
    pub fn start_conversation(&self, participants: &[&str]) -> ConversationId {
        let id = uuid::Uuid::new_v4().to_string();
        let mut inner = lock(&self.inner);
        inner.conversations.insert(
            id.clone(),
            participants.iter().map(|p| p.to_string()).collect(),
        );
        id
    }

    /// Stores a message and pushes it to every other participant.
    pub fn send_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        sender_name: &str,
        content: &str,
    ) -> Result<Message> {
        let mut inner = lock(&self.inner);
        let participants = inner
            .conversations
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| BuyersNetError::not_found("Conversation", conversation_id))?;

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            sender_name: sender_name.to_string(),
            content: content.to_string(),
            created_at: chrono::Utc::now(),
        };

        for recipient in participants.iter().filter(|p| p.as_str() != sender_id) {
            *inner
                .unread
                .entry((recipient.clone(), conversation_id.to_string()))
                .or_insert(0) += 1;
            if let Some(senders) = inner.message_subscribers.get_mut(recipient) {
                senders.retain(|(_, tx)| tx.send(message.clone()).is_ok());
            }
        }
        for participant in &participants {
            inner.notify_update(participant, conversation_id);
        }

        tracing::debug!(
            conversation_id,
            sender_id,
            "Delivered message to {} participant(s)",
            participants.len().saturating_sub(1)
        );
        Ok(message)
    }

    /// Marks every message in the conversation as read for `user_id`.
    pub fn mark_read(&self, conversation_id: &str, user_id: &str) {
        let mut inner = lock(&self.inner);
        inner
            .unread
            .remove(&(user_id.to_string(), conversation_id.to_string()));
        inner.notify_update(user_id, conversation_id);
    }

    /// Number of open subscriptions (both feeds) for `user_id`.
    pub fn active_subscriptions(&self, user_id: &str) -> usize {
        let inner = lock(&self.inner);
        inner.message_subscribers.get(user_id).map_or(0, Vec::len)
            + inner.update_subscribers.get(user_id).map_or(0, Vec::len)
    }

    /// Number of subscriptions closed by their holders so far.
    pub fn closed_subscriptions(&self) -> usize {
        lock(&self.inner).closed_subscriptions
    }

    /// Makes every call fail, simulating a network outage.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(BuyersNetError::provider("Messaging backend unreachable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MessagingService for InMemoryMessagingService {
    async fn unread_count(&self, user_id: &str) -> Result<u32> {
        self.ensure_online()?;
        let inner = lock(&self.inner);
        Ok(inner
            .unread
            .iter()
            .filter(|((recipient, _), _)| recipient == user_id)
            .map(|(_, count)| *count)
            .sum())
    }

    async fn subscribe_conversation_updates(
        &self,
        user_id: &str,
    ) -> Result<Subscription<ConversationUpdate>> {
        self.ensure_online()
            .map_err(|e| BuyersNetError::subscription(e.to_string()))?;
        Ok(subscribe(&self.inner, user_id, |inner| {
            &mut inner.update_subscribers
        }))
    }

    async fn subscribe_new_messages(&self, user_id: &str) -> Result<Subscription<Message>> {
        self.ensure_online()
            .map_err(|e| BuyersNetError::subscription(e.to_string()))?;
        Ok(subscribe(&self.inner, user_id, |inner| {
            &mut inner.message_subscribers
        }))
    }
}

fn subscribe<T: Send + 'static>(
    shared: &Arc<Mutex<Inner>>,
    user_id: &str,
    subscribers: fn(&mut Inner) -> &mut Subscribers<T>,
) -> Subscription<T> {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = {
        let mut inner = lock(shared);
        let id = inner.next_id();
        subscribers(&mut inner)
            .entry(user_id.to_string())
            .or_default()
            .push((id, tx));
        id
    };

    let shared = Arc::clone(shared);
    let user_id = user_id.to_string();
    Subscription::new(rx, move || {
        let mut inner = lock(&shared);
        if let Some(senders) = subscribers(&mut inner).get_mut(&user_id) {
            senders.retain(|(sid, _)| *sid != id);
        }
        inner.closed_subscriptions += 1;
    })
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unread_counts_per_recipient() {
        let service = InMemoryMessagingService::new();
        let conversation = service.start_conversation(&["alice", "bob"]);

        service
            .send_message(&conversation, "alice", "Alice", "hi bob")
            .unwrap();
        service
            .send_message(&conversation, "alice", "Alice", "are you there?")
            .unwrap();

        assert_eq!(service.unread_count("bob").await.unwrap(), 2);
        assert_eq!(service.unread_count("alice").await.unwrap(), 0);

        service.mark_read(&conversation, "bob");
        assert_eq!(service.unread_count("bob").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_new_messages_reach_recipient_only() {
        let service = InMemoryMessagingService::new();
        let conversation = service.start_conversation(&["alice", "bob"]);
        let mut bob = service.subscribe_new_messages("bob").await.unwrap();
        let mut alice = service.subscribe_new_messages("alice").await.unwrap();

        let sent = service
            .send_message(&conversation, "alice", "Alice", "hello")
            .unwrap();

        assert_eq!(bob.recv().await, Some(sent));
        let nothing =
            tokio::time::timeout(std::time::Duration::from_millis(20), alice.recv()).await;
        assert!(nothing.is_err(), "sender should not receive their own message");
    }

    #[tokio::test]
    async fn test_updates_reach_every_participant() {
        let service = InMemoryMessagingService::new();
        let conversation = service.start_conversation(&["alice", "bob"]);
        let mut alice = service.subscribe_conversation_updates("alice").await.unwrap();
        let mut bob = service.subscribe_conversation_updates("bob").await.unwrap();

        service
            .send_message(&conversation, "alice", "Alice", "hello")
            .unwrap();

        assert_eq!(alice.recv().await.unwrap().conversation_id, conversation);
        assert_eq!(bob.recv().await.unwrap().conversation_id, conversation);
    }

    #[tokio::test]
    async fn test_dropping_subscription_unsubscribes() {
        let service = InMemoryMessagingService::new();
        let messages = service.subscribe_new_messages("bob").await.unwrap();
        let updates = service.subscribe_conversation_updates("bob").await.unwrap();
        assert_eq!(service.active_subscriptions("bob"), 2);

        drop(messages);
        updates.close();

        assert_eq!(service.active_subscriptions("bob"), 0);
        assert_eq!(service.closed_subscriptions(), 2);
    }

    #[tokio::test]
    async fn test_offline_backend_fails() {
        let service = InMemoryMessagingService::new();
        service.set_offline(true);

        assert!(service.unread_count("bob").await.is_err());
        let err = service.subscribe_new_messages("bob").await.unwrap_err();
        assert!(matches!(err, BuyersNetError::Subscription(_)));
    }

    #[test]
    fn test_unknown_conversation() {
        let service = InMemoryMessagingService::new();
        let err = service
            .send_message("missing", "alice", "Alice", "hello")
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
