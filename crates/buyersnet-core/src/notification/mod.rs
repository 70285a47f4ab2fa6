//! User-facing notification module.
//!
//! # Module Structure
//!
//! - `model`: Toasts, OS notifications and the OS permission state
//! - `service`: Toaster, OS notification and navigation traits

mod model;
mod service;

pub use model::{NotificationPermission, OsNotification, Toast, ToastAction};
pub use service::{Navigator, OsNotifier, Toaster};
