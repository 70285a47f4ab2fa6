//! Collaborator traits for identity and profile data.

use async_trait::async_trait;
use tokio::sync::watch;

use super::model::{AuthSnapshot, Profile};
use crate::error::Result;

/// The auth/session provider the gate and notifier read from.
///
/// Implementations own the session lifecycle and the cached profile; the
/// core never writes either.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the current user, cached profile and loading flag.
    fn snapshot(&self) -> AuthSnapshot;

    /// Returns a receiver tracking the initial auth-loading flag.
    ///
    /// The value is `true` while the provider is still resolving the session.
    fn loading_signal(&self) -> watch::Receiver<bool>;

    /// Re-fetches the profile and replaces the cached copy.
    ///
    /// On error the cached profile is left untouched.
    async fn refresh_profile(&self) -> Result<()>;
}

/// Server-side source of truth for member profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile>;
}
