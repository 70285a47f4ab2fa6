//! Identity and profile domain models.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::access::{AccessContext, ApprovalStatus, Role};

/// Identifier of a network member as issued by the auth backend.
pub type UserId = String;

/// The authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// Subscription plan attached to a profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Basic,
    Premium,
}

/// Client-side cached member profile.
///
/// May lag behind the server, e.g. after an admin approves a member who is
/// already signed in. Only an explicit refresh through the auth provider
/// replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub role: Role,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub subscription_tier: SubscriptionTier,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Profile {
    pub fn new(user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            approval_status: ApprovalStatus::default(),
            subscription_tier: SubscriptionTier::default(),
            full_name: None,
        }
    }

    pub fn with_approval_status(mut self, status: ApprovalStatus) -> Self {
        self.approval_status = status;
        self
    }
}

/// Session facts read by the core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<UserId>,
    pub is_authenticated: bool,
}

/// Point-in-time view of the auth provider's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub profile: Option<Profile>,
    pub loading: bool,
}

impl AuthSnapshot {
    pub fn session(&self) -> Session {
        Session {
            user_id: self.user.as_ref().map(|u| u.id.clone()),
            is_authenticated: self.user.is_some(),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    /// Builds the context handed to the permission evaluator.
    pub fn access_context(&self) -> AccessContext {
        AccessContext {
            is_authenticated: self.user.is_some(),
            role: self.role(),
            approval_status: self.profile.as_ref().map(|p| p.approval_status),
            user_id: self.user.as_ref().map(|u| u.id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_out_snapshot() {
        let snapshot = AuthSnapshot::default();
        let session = snapshot.session();
        assert!(!session.is_authenticated);
        assert!(session.user_id.is_none());
        assert_eq!(snapshot.access_context(), AccessContext::anonymous());
    }

    #[test]
    fn test_access_context_from_profile() {
        let snapshot = AuthSnapshot {
            user: Some(User::new("u-1")),
            profile: Some(
                Profile::new("u-1", Role::PendingProfessional)
                    .with_approval_status(ApprovalStatus::Pending),
            ),
            loading: false,
        };
        let ctx = snapshot.access_context();
        assert!(ctx.is_authenticated);
        assert_eq!(ctx.role, Some(Role::PendingProfessional));
        assert_eq!(ctx.approval_status, Some(ApprovalStatus::Pending));
        assert_eq!(ctx.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn test_profile_deserializes_with_defaults() {
        let profile: Profile =
            serde_json::from_str(r#"{"user_id":"u-2","role":"verified_professional"}"#).unwrap();
        assert_eq!(profile.role, Role::VerifiedProfessional);
        assert_eq!(profile.approval_status, ApprovalStatus::Pending);
        assert_eq!(profile.subscription_tier, SubscriptionTier::Free);
    }
}
