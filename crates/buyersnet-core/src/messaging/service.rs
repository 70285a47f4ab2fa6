//! Messaging backend trait.

use async_trait::async_trait;

use super::model::{ConversationUpdate, Message};
use super::subscription::Subscription;
use crate::error::Result;

/// Storage and realtime API for direct messages.
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Returns the number of unread messages addressed to `user_id`.
    async fn unread_count(&self, user_id: &str) -> Result<u32>;

    /// Subscribes to changes of any conversation `user_id` takes part in.
    async fn subscribe_conversation_updates(
        &self,
        user_id: &str,
    ) -> Result<Subscription<ConversationUpdate>>;

    /// Subscribes to every new message addressed to `user_id`.
    async fn subscribe_new_messages(&self, user_id: &str) -> Result<Subscription<Message>>;
}
