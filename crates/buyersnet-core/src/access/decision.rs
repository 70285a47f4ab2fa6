//! Access decisions derived from a requirement and the current identity.

use serde::{Deserialize, Serialize};

use super::permission::{AccessContext, Permission, permissions_for};
use super::role::Role;

/// What a protected view demands of the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRequirement {
    #[serde(default)]
    pub required_role: Option<Role>,
    #[serde(default)]
    pub required_permission: Option<Permission>,
}

impl GateRequirement {
    /// A requirement that only demands a signed-in member.
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
            required_permission: None,
        }
    }

    pub fn permission(permission: Permission) -> Self {
        Self {
            required_role: None,
            required_permission: Some(permission),
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.required_permission = Some(permission);
        self
    }
}

/// Outcome of checking a [`GateRequirement`] against a member's role.
///
/// Derived on every evaluation and never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub role_check_failed: bool,
    pub permission_check_failed: bool,
    pub access_denied: bool,
}

impl AccessDecision {
    /// Evaluates `requirement` for a member holding `role`.
    ///
    /// Authentication is not considered here; callers deal with signed-out
    /// visitors before asking for a decision.
    pub fn evaluate(requirement: &GateRequirement, role: Option<Role>) -> Self {
        let role_check_failed = match (requirement.required_role, role) {
            (None, _) => false,
            (Some(required), Some(actual)) => !actual.satisfies(required),
            (Some(_), None) => true,
        };
        let permission_check_failed = requirement
            .required_permission
            .is_some_and(|permission| !permissions_for(role).contains(&permission));

        Self {
            role_check_failed,
            permission_check_failed,
            access_denied: role_check_failed || permission_check_failed,
        }
    }

    /// Evaluates `requirement` against a full access context.
    pub fn for_context(requirement: &GateRequirement, context: &AccessContext) -> Self {
        Self::evaluate(requirement, context.role)
    }

    pub fn is_allowed(&self) -> bool {
        !self.access_denied
    }
}
