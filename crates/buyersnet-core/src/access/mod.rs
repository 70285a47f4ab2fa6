//! Access control domain module.
//!
//! # Module Structure
//!
//! - `role`: Role and approval status
//! - `permission`: Permission enum, the static role table and the evaluator
//! - `decision`: Gate requirements and the derived access decision

mod decision;
mod permission;
mod role;

pub use decision::{AccessDecision, GateRequirement};
pub use permission::{
    AccessContext, Permission, ROLE_PERMISSIONS, has_all_permissions, has_any_permission,
    has_permission, permissions_for,
};
pub use role::{ApprovalStatus, Role};
