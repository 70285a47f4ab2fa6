//! Configuration models.
//!
//! Durations are stored as whole milliseconds so the TOML file stays
//! readable (`initial_check_timeout_ms = 1000`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            gate: GateConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings for protected views.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Upper bound on the wait for the auth provider's initial load.
    #[serde(
        rename = "initial_check_timeout_ms",
        with = "duration_ms",
        default = "default_initial_check_timeout"
    )]
    pub initial_check_timeout: Duration,
    /// Where signed-out visitors are sent.
    #[serde(default = "default_sign_in_route")]
    pub sign_in_route: String,
    /// Where denied members are sent when no forbidden view is requested.
    #[serde(default = "default_route")]
    pub default_route: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            initial_check_timeout: default_initial_check_timeout(),
            sign_in_route: default_sign_in_route(),
            default_route: default_route(),
        }
    }
}

fn default_initial_check_timeout() -> Duration {
    Duration::from_millis(1000)
}

fn default_sign_in_route() -> String {
    "/auth".to_string()
}

fn default_route() -> String {
    "/".to_string()
}

/// Settings for message notifications.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Characters of message content shown before truncation.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
    #[serde(
        rename = "toast_duration_ms",
        with = "duration_ms",
        default = "default_dismiss_after"
    )]
    pub toast_duration: Duration,
    #[serde(
        rename = "os_auto_dismiss_ms",
        with = "duration_ms",
        default = "default_dismiss_after"
    )]
    pub os_auto_dismiss: Duration,
    /// Delay before the one automatic OS permission prompt.
    #[serde(
        rename = "permission_prompt_delay_ms",
        with = "duration_ms",
        default = "default_permission_prompt_delay"
    )]
    pub permission_prompt_delay: Duration,
    #[serde(default = "default_messages_route")]
    pub messages_route: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            preview_limit: default_preview_limit(),
            toast_duration: default_dismiss_after(),
            os_auto_dismiss: default_dismiss_after(),
            permission_prompt_delay: default_permission_prompt_delay(),
            messages_route: default_messages_route(),
            icon: default_icon(),
        }
    }
}

fn default_preview_limit() -> usize {
    60
}

fn default_dismiss_after() -> Duration {
    Duration::from_millis(5000)
}

fn default_permission_prompt_delay() -> Duration {
    Duration::from_millis(5000)
}

fn default_messages_route() -> String {
    "/messages".to_string()
}

fn default_icon() -> String {
    "/favicon.ico".to_string()
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
