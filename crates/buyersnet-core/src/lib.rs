//! Domain layer for BuyersNet.
//!
//! Holds the role/permission model, the identity and messaging data the
//! access gate and message notifier read, and the traits through which the
//! application layer talks to external collaborators.

pub mod access;
pub mod config;
pub mod error;
pub mod messaging;
pub mod notification;
pub mod user;

// Re-export common error type
pub use error::BuyersNetError;
