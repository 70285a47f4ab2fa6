//! Unread counter and new-message notifications.
//!
//! # Module Structure
//!
//! - `dispatcher`: Per-message toast and OS notification decisions
//! - `notifier`: Identity-scoped subscriptions and the unread count

mod dispatcher;
mod notifier;

pub use dispatcher::{
    DispatchOutcome, NotificationDispatcher, conversation_path, notification_tag, preview,
};
pub use notifier::{MessageNotifier, NotifierDeps};
