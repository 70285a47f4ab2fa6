//! Application layer for BuyersNet.
//!
//! This crate coordinates the domain model with external collaborators:
//! the access gate for protected views, the session-backed auth provider
//! and the message notifier.

pub mod access_gate;
pub mod message_notifier;
pub mod session_auth_provider;

pub use access_gate::{AccessGate, GateView};
pub use message_notifier::{MessageNotifier, NotifierDeps};
pub use session_auth_provider::SessionAuthProvider;
