use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use buyersnet_application::{MessageNotifier, NotifierDeps};
use buyersnet_core::config::NotifierConfig;
use buyersnet_core::notification::NotificationPermission;
use buyersnet_infrastructure::{
    InMemoryMessagingService, TracingNavigator, TracingOsNotifier, TracingToaster,
};
use serde_json::json;

pub struct NotifyArgs {
    pub user: String,
    pub from: String,
    pub message: String,
    pub open: bool,
    pub background: bool,
}

/// Delivers one message to `user` through an in-memory backend. Toasts and
/// OS notifications are written to the log.
pub async fn run(config: &NotifierConfig, args: NotifyArgs) -> Result<()> {
    let sender_id = sender_id(&args.from, &args.user)?;
    let messaging = Arc::new(InMemoryMessagingService::new());
    let os = Arc::new(TracingOsNotifier::new(
        NotificationPermission::Granted,
        NotificationPermission::Granted,
    ));
    os.set_document_visible(!args.background);

    let notifier = MessageNotifier::new(
        NotifierDeps {
            messaging: messaging.clone(),
            toaster: Arc::new(TracingToaster),
            os: os.clone(),
            navigator: Arc::new(TracingNavigator),
        },
        config.clone(),
    );

    let conversation = messaging.start_conversation(&[args.user.as_str(), sender_id.as_str()]);
    notifier.set_user(Some(args.user.clone())).await;
    if args.open {
        notifier.on_route_change(&config.messages_route, Some(conversation.as_str()));
    }

    messaging.send_message(&conversation, &sender_id, &args.from, &args.message)?;

    let mut unread = notifier.subscribe_unread_count();
    if tokio::time::timeout(Duration::from_secs(1), unread.wait_for(|count| *count > 0))
        .await
        .is_err()
    {
        tracing::warn!("Unread count did not update within 1s");
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "conversation_id": conversation,
            "unread_count": notifier.unread_count(),
            "active_conversation": notifier.active_conversation(),
            "os_notifications": os.open_tags(),
        }))?
    );

    notifier.shutdown().await;
    Ok(())
}

/// Id of the simulated sender. Senders never receive their own messages, so
/// a sender equal to the member would deliver nothing.
fn sender_id(from: &str, user: &str) -> Result<String> {
    let sender_id = from.to_lowercase();
    if sender_id == user {
        bail!(
            "--from {:?} resolves to the member {:?}; pick a different sender",
            from,
            user
        );
    }
    Ok(sender_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_id_is_lowercased_name() {
        assert_eq!(sender_id("Alice", "bob").unwrap(), "alice");
    }

    #[test]
    fn test_sender_equal_to_member_is_rejected() {
        let err = sender_id("Alice", "alice").unwrap_err();
        assert!(err.to_string().contains("resolves to the member"));
    }
}
