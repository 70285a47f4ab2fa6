//! Named capabilities and the static role → permission table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::role::{ApprovalStatus, Role};

/// Fine-grained capability, derived solely from a member's [`Role`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Permission {
    CanViewDirectory,
    CanViewProperties,
    CanSubmitProperty,
    CanViewBriefs,
    CanCreateBrief,
    CanPostInForum,
    CanSendMessages,
    CanViewNotifications,
    CanManageSubscription,
    CanApproveProfessionals,
    CanManageUsers,
    CanAccessAdminDashboard,
}

use Permission::*;

const ADMIN_PERMISSIONS: &[Permission] = &[
    CanViewDirectory,
    CanViewProperties,
    CanSubmitProperty,
    CanViewBriefs,
    CanCreateBrief,
    CanPostInForum,
    CanSendMessages,
    CanViewNotifications,
    CanManageSubscription,
    CanApproveProfessionals,
    CanManageUsers,
    CanAccessAdminDashboard,
];

const VERIFIED_PROFESSIONAL_PERMISSIONS: &[Permission] = &[
    CanViewDirectory,
    CanViewProperties,
    CanSubmitProperty,
    CanViewBriefs,
    CanCreateBrief,
    CanPostInForum,
    CanSendMessages,
    CanViewNotifications,
    CanManageSubscription,
];

const PENDING_PROFESSIONAL_PERMISSIONS: &[Permission] = &[
    CanViewDirectory,
    CanViewProperties,
    CanViewNotifications,
    CanManageSubscription,
];

const GUEST_PERMISSIONS: &[Permission] = &[];

/// The role → permission table, one entry per role.
///
/// Never mutated; `permissions_for` matches on the role exhaustively, so a
/// new role cannot be added without deciding its permission set.
pub const ROLE_PERMISSIONS: &[(Role, &[Permission])] = &[
    (Role::Admin, ADMIN_PERMISSIONS),
    (Role::VerifiedProfessional, VERIFIED_PROFESSIONAL_PERMISSIONS),
    (Role::PendingProfessional, PENDING_PROFESSIONAL_PERMISSIONS),
    (Role::Guest, GUEST_PERMISSIONS),
];

/// Returns the permission set granted to `role`.
///
/// A missing role yields the empty set.
pub fn permissions_for(role: Option<Role>) -> &'static [Permission] {
    match role {
        Some(Role::Admin) => ADMIN_PERMISSIONS,
        Some(Role::VerifiedProfessional) => VERIFIED_PROFESSIONAL_PERMISSIONS,
        Some(Role::PendingProfessional) => PENDING_PROFESSIONAL_PERMISSIONS,
        Some(Role::Guest) | None => GUEST_PERMISSIONS,
    }
}

/// Identity facts the permission evaluator reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessContext {
    pub is_authenticated: bool,
    pub role: Option<Role>,
    pub approval_status: Option<ApprovalStatus>,
    pub user_id: Option<String>,
}

impl AccessContext {
    /// Context for a visitor that is not signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Returns true if the context grants `permission`.
///
/// Unauthenticated contexts and contexts without a role hold no permissions.
pub fn has_permission(context: &AccessContext, permission: Permission) -> bool {
    if !context.is_authenticated {
        return false;
    }
    match context.role {
        Some(role) => permissions_for(Some(role)).contains(&permission),
        None => false,
    }
}

/// Returns true if the context grants at least one of `permissions`.
pub fn has_any_permission(context: &AccessContext, permissions: &[Permission]) -> bool {
    permissions.iter().any(|p| has_permission(context, *p))
}

/// Returns true if the context grants every one of `permissions`.
///
/// An empty list is granted only to authenticated contexts with a role.
pub fn has_all_permissions(context: &AccessContext, permissions: &[Permission]) -> bool {
    context.is_authenticated
        && context.role.is_some()
        && permissions.iter().all(|p| has_permission(context, *p))
}
