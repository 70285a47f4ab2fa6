//! User domain module.
//!
//! This module contains the signed-in identity, the cached profile and the
//! collaborator traits that supply them.
//!
//! # Module Structure
//!
//! - `model`: User, Profile and session snapshot models
//! - `service`: Auth provider and profile store traits

mod model;
mod service;

pub use model::{AuthSnapshot, Profile, Session, SubscriptionTier, User, UserId};
pub use service::{AuthProvider, ProfileStore};
