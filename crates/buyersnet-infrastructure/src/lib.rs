//! Infrastructure layer for BuyersNet.
//!
//! Config storage on disk, in-memory implementations of the profile and
//! messaging backends, and tracing-backed presentation adapters for
//! headless runs.

pub mod config_storage;
pub mod in_memory_messaging;
pub mod in_memory_profile_store;
pub mod paths;
pub mod presentation;

pub use crate::config_storage::TomlConfigStorage;
pub use crate::in_memory_messaging::InMemoryMessagingService;
pub use crate::in_memory_profile_store::InMemoryProfileStore;
pub use crate::paths::BuyersNetPaths;
pub use crate::presentation::{TracingNavigator, TracingOsNotifier, TracingToaster};
