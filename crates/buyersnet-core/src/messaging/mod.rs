//! Direct messaging domain module.
//!
//! # Module Structure
//!
//! - `model`: Message and conversation update events
//! - `subscription`: Realtime subscription handle
//! - `service`: Messaging backend trait

mod model;
mod service;
mod subscription;

pub use model::{ConversationId, ConversationUpdate, Message};
pub use service::MessagingService;
pub use subscription::Subscription;
