use std::sync::{Arc, Mutex};
use std::time::Duration;

use buyersnet_application::{MessageNotifier, NotifierDeps, SessionAuthProvider};
use buyersnet_core::access::Role;
use buyersnet_core::config::NotifierConfig;
use buyersnet_core::notification::{
    Navigator, NotificationPermission, OsNotification, Toast, Toaster,
};
use buyersnet_core::user::{Profile, User};
use buyersnet_infrastructure::{InMemoryMessagingService, InMemoryProfileStore, TracingOsNotifier};

#[derive(Default)]
struct RecordingToaster {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingToaster {
    fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

impl Toaster for RecordingToaster {
    fn show(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

#[derive(Default)]
struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
    focused: Mutex<usize>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }

    fn focus_window(&self) {
        *self.focused.lock().unwrap() += 1;
    }
}

struct Harness {
    messaging: Arc<InMemoryMessagingService>,
    toaster: Arc<RecordingToaster>,
    navigator: Arc<RecordingNavigator>,
    os: Arc<TracingOsNotifier>,
    notifier: Arc<MessageNotifier>,
}

fn harness(permission: NotificationPermission) -> Harness {
    let messaging = Arc::new(InMemoryMessagingService::new());
    let toaster = Arc::new(RecordingToaster::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let os = Arc::new(TracingOsNotifier::new(
        permission,
        NotificationPermission::Granted,
    ));
    let notifier = MessageNotifier::new(
        NotifierDeps {
            messaging: messaging.clone(),
            toaster: toaster.clone(),
            os: os.clone(),
            navigator: navigator.clone(),
        },
        NotifierConfig::default(),
    );
    Harness {
        messaging,
        toaster,
        navigator,
        os,
        notifier,
    }
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "condition not reached in time");
}

async fn wait_for_unread(notifier: &MessageNotifier, expected: u32) {
    let mut unread = notifier.subscribe_unread_count();
    let reached =
        tokio::time::timeout(Duration::from_secs(2), unread.wait_for(|c| *c == expected))
            .await
            .is_ok_and(|r| r.is_ok());
    assert!(
        reached,
        "unread count never reached {}, last {}",
        expected,
        notifier.unread_count()
    );
}

#[tokio::test]
async fn test_open_conversation_is_not_notified() {
    let h = harness(NotificationPermission::Default);
    let with_alice = h.messaging.start_conversation(&["bob", "alice"]);
    let with_carol = h.messaging.start_conversation(&["bob", "carol"]);
    h.notifier.set_user(Some("bob".to_string())).await;

    // Opened after the listener started; must still be honoured.
    h.notifier
        .on_route_change("/messages", Some(with_alice.as_str()));

    h.messaging
        .send_message(&with_alice, "alice", "Alice", "in the open thread")
        .unwrap();
    h.messaging
        .send_message(&with_carol, "carol", "Carol", "somewhere else")
        .unwrap();

    eventually(|| !h.toaster.toasts().is_empty()).await;
    let toasts = h.toaster.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Carol");
    assert_eq!(toasts[0].description, "somewhere else");
    let action = toasts[0].action.clone().unwrap();
    assert_eq!(action.label, "View");
    assert_eq!(action.path, format!("/messages?conversation={}", with_carol));

    h.notifier.on_toast_action(&action);
    assert_eq!(*h.navigator.paths.lock().unwrap(), vec![action.path]);

    h.notifier.shutdown().await;
}

#[tokio::test]
async fn test_leaving_messages_clears_active_conversation() {
    let h = harness(NotificationPermission::Default);
    h.notifier.on_route_change("/messages", Some("c-1"));
    assert_eq!(h.notifier.active_conversation().as_deref(), Some("c-1"));

    h.notifier.on_route_change("/briefs", Some("c-1"));
    assert_eq!(h.notifier.active_conversation(), None);

    h.notifier.on_route_change("/messagesboard", Some("c-1"));
    assert_eq!(h.notifier.active_conversation(), None);
}

#[tokio::test]
async fn test_unread_count_follows_backend() {
    let h = harness(NotificationPermission::Default);
    let conversation = h.messaging.start_conversation(&["bob", "alice"]);
    h.messaging
        .send_message(&conversation, "alice", "Alice", "first")
        .unwrap();

    h.notifier.set_user(Some("bob".to_string())).await;
    assert_eq!(h.notifier.unread_count(), 1);

    h.messaging
        .send_message(&conversation, "alice", "Alice", "second")
        .unwrap();
    wait_for_unread(&h.notifier, 2).await;

    h.messaging.mark_read(&conversation, "bob");
    wait_for_unread(&h.notifier, 0).await;

    h.notifier.shutdown().await;
}

#[tokio::test]
async fn test_failed_recount_keeps_last_count() {
    let h = harness(NotificationPermission::Default);
    let conversation = h.messaging.start_conversation(&["bob", "alice"]);
    h.messaging
        .send_message(&conversation, "alice", "Alice", "hello")
        .unwrap();
    h.notifier.set_user(Some("bob".to_string())).await;
    assert_eq!(h.notifier.unread_count(), 1);

    h.messaging.set_offline(true);
    h.notifier.refresh_unread_count().await;
    assert_eq!(h.notifier.unread_count(), 1);

    h.notifier.shutdown().await;
}

#[tokio::test]
async fn test_switching_identity_releases_previous_subscriptions() {
    let h = harness(NotificationPermission::Default);
    let alice_and_carol = h.messaging.start_conversation(&["alice", "carol"]);

    h.notifier.set_user(Some("alice".to_string())).await;
    assert_eq!(h.messaging.active_subscriptions("alice"), 2);

    h.notifier.set_user(Some("bob".to_string())).await;
    assert_eq!(h.messaging.closed_subscriptions(), 2);
    assert_eq!(h.messaging.active_subscriptions("alice"), 0);
    assert_eq!(h.messaging.active_subscriptions("bob"), 2);

    h.messaging
        .send_message(&alice_and_carol, "carol", "Carol", "for alice only")
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.toaster.toasts().is_empty());
    assert_eq!(h.notifier.unread_count(), 0);

    h.notifier.shutdown().await;
    assert_eq!(h.messaging.active_subscriptions("bob"), 0);
}

#[tokio::test]
async fn test_switch_with_failed_fetch_does_not_show_previous_count() {
    let h = harness(NotificationPermission::Default);
    let conversation = h.messaging.start_conversation(&["alice", "carol"]);
    for text in ["one", "two", "three"] {
        h.messaging
            .send_message(&conversation, "carol", "Carol", text)
            .unwrap();
    }
    h.notifier.set_user(Some("alice".to_string())).await;
    assert_eq!(h.notifier.unread_count(), 3);

    h.messaging.set_offline(true);
    h.notifier.set_user(Some("bob".to_string())).await;

    assert_eq!(h.notifier.unread_count(), 0);
    h.notifier.shutdown().await;
}

#[tokio::test]
async fn test_same_identity_keeps_subscriptions() {
    let h = harness(NotificationPermission::Default);
    h.notifier.set_user(Some("bob".to_string())).await;
    h.notifier.set_user(Some("bob".to_string())).await;

    assert_eq!(h.messaging.active_subscriptions("bob"), 2);
    assert_eq!(h.messaging.closed_subscriptions(), 0);

    h.notifier.shutdown().await;
}

#[tokio::test]
async fn test_sign_out_resets_unread_count() {
    let h = harness(NotificationPermission::Default);
    let conversation = h.messaging.start_conversation(&["bob", "alice"]);
    h.messaging
        .send_message(&conversation, "alice", "Alice", "hello")
        .unwrap();
    h.notifier.set_user(Some("bob".to_string())).await;
    assert_eq!(h.notifier.unread_count(), 1);

    h.notifier.set_user(None).await;
    assert_eq!(h.notifier.unread_count(), 0);
    assert_eq!(h.messaging.active_subscriptions("bob"), 0);
}

#[tokio::test]
async fn test_subscription_failure_degrades_quietly() {
    let h = harness(NotificationPermission::Default);
    h.messaging.set_offline(true);

    h.notifier.set_user(Some("bob".to_string())).await;
    assert_eq!(h.notifier.unread_count(), 0);
    assert_eq!(h.messaging.active_subscriptions("bob"), 0);

    h.notifier.shutdown().await;
}

#[tokio::test]
async fn test_background_message_raises_os_notification() {
    let h = harness(NotificationPermission::Granted);
    h.os.set_document_visible(false);
    let conversation = h.messaging.start_conversation(&["bob", "alice"]);
    h.notifier.set_user(Some("bob".to_string())).await;

    h.messaging
        .send_message(&conversation, "alice", "Alice", &"x".repeat(80))
        .unwrap();

    let tag = format!("message-{}", conversation);
    eventually(|| h.os.open_tags() == vec![tag.clone()]).await;
    assert_eq!(
        h.toaster.toasts()[0].description,
        format!("{}...", "x".repeat(60))
    );

    let path = format!("/messages?conversation={}", conversation);
    h.notifier.on_os_notification_click(&OsNotification {
        title: "Alice".to_string(),
        body: String::new(),
        icon: "/favicon.ico".to_string(),
        tag,
        path: path.clone(),
        auto_dismiss: Duration::from_secs(5),
    });

    assert!(h.os.open_tags().is_empty());
    assert_eq!(*h.navigator.focused.lock().unwrap(), 1);
    assert_eq!(*h.navigator.paths.lock().unwrap(), vec![path]);

    h.notifier.shutdown().await;
}

#[tokio::test]
async fn test_visible_document_gets_toast_only() {
    let h = harness(NotificationPermission::Granted);
    let conversation = h.messaging.start_conversation(&["bob", "alice"]);
    h.notifier.set_user(Some("bob".to_string())).await;

    h.messaging
        .send_message(&conversation, "alice", "Alice", "hello")
        .unwrap();

    eventually(|| h.toaster.toasts().len() == 1).await;
    assert!(h.os.open_tags().is_empty());

    h.notifier.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_permission_prompt_once_after_delay() {
    let h = harness(NotificationPermission::Default);

    tokio::time::sleep(Duration::from_millis(4900)).await;
    assert_eq!(h.os.prompt_count(), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.os.prompt_count(), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.os.prompt_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_prompt_once_decided() {
    let denied = harness(NotificationPermission::Denied);
    let granted = harness(NotificationPermission::Granted);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(denied.os.prompt_count(), 0);
    assert_eq!(granted.os.prompt_count(), 0);
}

#[tokio::test]
async fn test_follows_session_changes() {
    let h = harness(NotificationPermission::Default);
    let store = Arc::new(InMemoryProfileStore::new());
    store
        .upsert(Profile::new("bob", Role::VerifiedProfessional))
        .await;
    let auth = SessionAuthProvider::new(store);
    let following = h.notifier.follow_session(auth.subscribe_session());

    auth.sign_in(User::new("bob")).await;
    eventually(|| h.messaging.active_subscriptions("bob") == 2).await;

    auth.sign_out();
    eventually(|| h.messaging.active_subscriptions("bob") == 0).await;
    assert_eq!(h.notifier.unread_count(), 0);

    h.notifier.shutdown().await;
    following.await.unwrap();
}
