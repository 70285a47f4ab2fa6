//! Role and approval status domain models.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Coarse privilege tier of a network member.
///
/// Roles are not totally ordered. The only implied relationship is that
/// `Admin` satisfies any specific required role (see [`Role::satisfies`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// Platform administrator
    Admin,
    /// Buyers agent whose credentials were approved
    VerifiedProfessional,
    /// Buyers agent awaiting approval
    PendingProfessional,
    /// Signed-in member without a professional account
    Guest,
}

impl Role {
    /// Returns true if a member holding `self` passes a gate requiring `required`.
    pub fn satisfies(self, required: Role) -> bool {
        self == required || self == Role::Admin
    }
}

/// Review state of a professional's application.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}
