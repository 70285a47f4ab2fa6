//! In-memory profile backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use buyersnet_core::BuyersNetError;
use buyersnet_core::access::{ApprovalStatus, Role};
use buyersnet_core::error::Result;
use buyersnet_core::user::{Profile, ProfileStore};
use tokio::sync::RwLock;

/// Profiles held in memory, standing in for the hosted profiles table.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
    offline: AtomicBool,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, profile: Profile) {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.user_id.clone(), profile);
    }

    /// Promotes a pending professional, as an admin review would.
    pub async fn approve(&self, user_id: &str) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| BuyersNetError::not_found("Profile", user_id))?;
        profile.approval_status = ApprovalStatus::Approved;
        if profile.role == Role::PendingProfessional {
            profile.role = Role::VerifiedProfessional;
        }
        Ok(())
    }

    pub async fn set_role(&self, user_id: &str, role: Role) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| BuyersNetError::not_found("Profile", user_id))?;
        profile.role = role;
        Ok(())
    }

    /// Makes every fetch fail, simulating a network outage.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BuyersNetError::provider("Profile store unreachable"));
        }
        let profiles = self.profiles.read().await;
        profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| BuyersNetError::not_found("Profile", user_id))
    }
}
