// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File model for `sempro.toml`.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so typos are reported
//! at load time instead of being ignored.

use serde::{Deserialize, Serialize};

use sempro_core::{MenuItem, StatusBarStyle};

/// Top-level Sempro configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SemproConfig {
    /// Identity and credential settings.
    #[serde(default)]
    pub session: SessionSection,

    /// Conversation screen cosmetics.
    #[serde(default)]
    pub ui: UiSection,

    /// Push notification integration.
    #[serde(default)]
    pub notifications: NotificationsSection,

    /// Offline send behavior.
    #[serde(default)]
    pub offline: OfflineSection,

    /// Credential renewal.
    #[serde(default)]
    pub auth: AuthSection,

    /// Tracing output.
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    /// App id from the Sempro web portal.
    #[serde(default)]
    pub app_id: String,

    /// Auth code from the Sempro API, for static-credential sessions.
    #[serde(default)]
    pub auth_code: Option<String>,

    /// Region token, e.g. `eu-1`. Unset means the default region.
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UiSection {
    #[serde(default = "default_accent_color")]
    pub accent_color: String,

    #[serde(default = "default_user_message_text_color")]
    pub user_message_text_color: String,

    #[serde(default)]
    pub status_bar_style: StatusBarStyle,

    /// Menu item tokens. An empty list hides the menu button.
    #[serde(default = "default_allowed_menu_items")]
    pub allowed_menu_items: Option<Vec<String>>,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            accent_color: default_accent_color(),
            user_message_text_color: default_user_message_text_color(),
            status_bar_style: StatusBarStyle::default(),
            allowed_menu_items: default_allowed_menu_items(),
        }
    }
}

fn default_accent_color() -> String {
    "#00B0FF".to_string()
}

fn default_user_message_text_color() -> String {
    "#FFFFFF".to_string()
}

fn default_allowed_menu_items() -> Option<Vec<String>> {
    Some(MenuItem::ALL.iter().map(|item| item.to_string()).collect())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsSection {
    /// Seconds an in-app notification stays up; 0 keeps it until dismissed.
    #[serde(default = "default_display_time_secs")]
    pub display_time_secs: u64,

    #[serde(default = "default_true")]
    pub enable_app_delegate_swizzling: bool,

    #[serde(default = "default_true")]
    pub enable_user_notification_center_override: bool,

    #[serde(default = "default_true")]
    pub request_push_permission_on_first_message: bool,
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            display_time_secs: default_display_time_secs(),
            enable_app_delegate_swizzling: true,
            enable_user_notification_center_override: true,
            request_push_permission_on_first_message: true,
        }
    }
}

fn default_display_time_secs() -> u64 {
    8
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OfflineSection {
    /// Accept sends while disconnected and queue them for retry.
    #[serde(default)]
    pub allow_offline_usage: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// Upper bound on one authentication delegate renewal.
    #[serde(default = "default_renewal_timeout_secs")]
    pub renewal_timeout_secs: u64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            renewal_timeout_secs: default_renewal_timeout_secs(),
        }
    }
}

fn default_renewal_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
