//! Error types for BuyersNet.

use thiserror::Error;

/// A shared error type for every BuyersNet crate.
///
/// Collaborator failures (auth provider, messaging backend, notification
/// APIs) are reported through this type so that callers can log them and
/// degrade instead of aborting the flow that triggered them.
#[derive(Error, Debug, Clone)]
pub enum BuyersNetError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// An external provider call failed (profile refresh, unread count, ...)
    #[error("Provider error: {0}")]
    Provider(String),

    /// A realtime subscription could not be opened
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// A platform capability (OS notifications, ...) is unavailable
    #[error("Capability unavailable: {0}")]
    Unavailable(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BuyersNetError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Creates a Subscription error
    pub fn subscription(message: impl Into<String>) -> Self {
        Self::Subscription(message.into())
    }

    /// Creates an Unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error came from an external collaborator.
    ///
    /// These are the failures the gate and the notifier swallow after
    /// logging: provider calls, subscriptions and missing capabilities.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::Subscription(_) | Self::Unavailable(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for BuyersNetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for BuyersNetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for BuyersNetError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for BuyersNetError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, BuyersNetError>`.
pub type Result<T> = std::result::Result<T, BuyersNetError>;
