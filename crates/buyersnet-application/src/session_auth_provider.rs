//! Auth provider that caches the member profile client-side.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use buyersnet_core::BuyersNetError;
use buyersnet_core::error::Result;
use buyersnet_core::user::{AuthProvider, AuthSnapshot, Profile, ProfileStore, Session, User};
use tokio::sync::watch;

/// Session holder with a cached, possibly stale, profile.
///
/// The profile is fetched from the [`ProfileStore`] on sign-in and only
/// replaced again by [`AuthProvider::refresh_profile`]. Session changes are
/// published on a `watch` channel so the message notifier can follow the
/// signed-in identity.
pub struct SessionAuthProvider {
    store: Arc<dyn ProfileStore>,
    snapshot: RwLock<AuthSnapshot>,
    loading: watch::Sender<bool>,
    session: watch::Sender<Session>,
}

impl SessionAuthProvider {
    /// Creates a provider that is still resolving the initial session.
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        let (loading, _) = watch::channel(true);
        let (session, _) = watch::channel(Session::default());
        Self {
            store,
            snapshot: RwLock::new(AuthSnapshot {
                loading: true,
                ..AuthSnapshot::default()
            }),
            loading,
            session,
        }
    }

    /// Finishes the initial load with the session restored from storage.
    pub async fn restore(&self, user: Option<User>) {
        match user {
            Some(user) => self.sign_in(user).await,
            None => self.sign_out(),
        }
    }

    /// Signs `user` in and caches their profile.
    ///
    /// A failed profile fetch leaves the member signed in without a profile,
    /// which the permission evaluator treats as holding no permissions.
    pub async fn sign_in(&self, user: User) {
        let profile = match self.store.fetch_profile(&user.id).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!("Failed to load profile for {}: {}", user.id, e);
                None
            }
        };

        tracing::info!("Signed in as {}", user.id);
        {
            let mut snapshot = self.write();
            snapshot.user = Some(user);
            snapshot.profile = profile;
            snapshot.loading = false;
        }
        self.publish();
    }

    pub fn sign_out(&self) {
        {
            let mut snapshot = self.write();
            snapshot.user = None;
            snapshot.profile = None;
            snapshot.loading = false;
        }
        tracing::info!("Signed out");
        self.publish();
    }

    /// Returns a receiver that observes every session change.
    pub fn subscribe_session(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.read().profile.clone()
    }

    fn publish(&self) {
        let session = self.read().session();
        self.loading.send_replace(false);
        self.session.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                *current = session;
                true
            }
        });
    }

    fn read(&self) -> RwLockReadGuard<'_, AuthSnapshot> {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthSnapshot> {
        self.snapshot.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AuthProvider for SessionAuthProvider {
    fn snapshot(&self) -> AuthSnapshot {
        self.read().clone()
    }

    fn loading_signal(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    async fn refresh_profile(&self) -> Result<()> {
        let user_id = self
            .read()
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or_else(|| BuyersNetError::provider("No signed-in user to refresh"))?;

        let profile = self.store.fetch_profile(&user_id).await?;

        let mut snapshot = self.write();
        // The member may have signed out while the fetch was in flight.
        if snapshot.user.as_ref().is_some_and(|u| u.id == user_id) {
            tracing::debug!("Refreshed profile for {}: role={}", user_id, profile.role);
            snapshot.profile = Some(profile);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buyersnet_core::access::Role;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock ProfileStore for testing
    struct MockProfileStore {
        profiles: Mutex<HashMap<String, Profile>>,
    }

    impl MockProfileStore {
        fn with(profile: Profile) -> Self {
            let mut profiles = HashMap::new();
            profiles.insert(profile.user_id.clone(), profile);
            Self {
                profiles: Mutex::new(profiles),
            }
        }

        fn set_role(&self, user_id: &str, role: Role) {
            if let Some(profile) = self.profiles.lock().unwrap().get_mut(user_id) {
                profile.role = role;
            }
        }
    }

    #[async_trait]
    impl ProfileStore for MockProfileStore {
        async fn fetch_profile(&self, user_id: &str) -> Result<Profile> {
            self.profiles
                .lock()
                .unwrap()
                .get(user_id)
                .cloned()
                .ok_or_else(|| BuyersNetError::not_found("Profile", user_id))
        }
    }

    #[tokio::test]
    async fn test_starts_loading() {
        let provider =
            SessionAuthProvider::new(Arc::new(MockProfileStore::with(Profile::new("u-1", Role::Guest))));
        assert!(provider.snapshot().loading);
        assert!(*provider.loading_signal().borrow());
    }

    #[tokio::test]
    async fn test_sign_in_caches_profile_until_refresh() {
        let store = Arc::new(MockProfileStore::with(Profile::new("u-1", Role::PendingProfessional)));
        let provider = SessionAuthProvider::new(store.clone());
        provider.restore(Some(User::new("u-1"))).await;

        assert!(!*provider.loading_signal().borrow());
        assert_eq!(provider.snapshot().role(), Some(Role::PendingProfessional));

        // Admin approves the member server-side; the cache is stale.
        store.set_role("u-1", Role::VerifiedProfessional);
        assert_eq!(provider.snapshot().role(), Some(Role::PendingProfessional));

        provider.refresh_profile().await.unwrap();
        assert_eq!(provider.snapshot().role(), Some(Role::VerifiedProfessional));
    }

    #[tokio::test]
    async fn test_refresh_without_user_fails() {
        let provider =
            SessionAuthProvider::new(Arc::new(MockProfileStore::with(Profile::new("u-1", Role::Guest))));
        provider.restore(None).await;
        assert!(provider.refresh_profile().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_profile_signs_in_without_role() {
        let provider =
            SessionAuthProvider::new(Arc::new(MockProfileStore::with(Profile::new("u-1", Role::Guest))));
        provider.sign_in(User::new("someone-else")).await;

        let snapshot = provider.snapshot();
        assert!(snapshot.session().is_authenticated);
        assert!(snapshot.profile.is_none());
    }

    #[tokio::test]
    async fn test_session_changes_are_published() {
        let provider =
            SessionAuthProvider::new(Arc::new(MockProfileStore::with(Profile::new("u-1", Role::Guest))));
        let mut sessions = provider.subscribe_session();

        provider.sign_in(User::new("u-1")).await;
        assert!(sessions.has_changed().unwrap());
        assert_eq!(sessions.borrow_and_update().user_id.as_deref(), Some("u-1"));

        provider.sign_out();
        assert!(sessions.has_changed().unwrap());
        assert!(sessions.borrow_and_update().user_id.is_none());
    }
}
