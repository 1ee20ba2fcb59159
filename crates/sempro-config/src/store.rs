// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session configuration store.
//!
//! `app_id`, `auth_code`, `region` and `authentication_delegate` are
//! write-once: the first write wins and every later write fails with
//! [`ConfigError::AlreadySet`]. They are backed by [`OnceLock`], so the rule
//! holds even when the configuration is shared behind an `Arc`. Every other
//! field is an ordinary mutator.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use sempro_core::{AuthenticationDelegate, ConfigError, MenuItem, StatusBarStyle};
use tracing::debug;

use crate::color::Color;
use crate::diagnostic::suggest_key;
use crate::model::SemproConfig;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "default";

/// Default in-app notification display time.
pub const DEFAULT_NOTIFICATION_DISPLAY_TIME: Duration = Duration::from_secs(8);

/// Default bound on a single credential renewal.
pub const DEFAULT_RENEWAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default conversation accent color (`#00B0FF`).
pub const DEFAULT_ACCENT_COLOR: Color = Color::rgb(0x00, 0xB0, 0xFF);

/// Default user message text color (`#FFFFFF`).
pub const DEFAULT_USER_MESSAGE_TEXT_COLOR: Color = Color::rgb(0xFF, 0xFF, 0xFF);

/// Validated configuration for one SDK session.
pub struct SessionConfiguration {
    app_id: OnceLock<String>,
    auth_code: OnceLock<String>,
    region: OnceLock<String>,
    authentication_delegate: OnceLock<Weak<dyn AuthenticationDelegate>>,

    accent_color: Color,
    user_message_text_color: Color,
    status_bar_style: StatusBarStyle,
    allowed_menu_items: Vec<MenuItem>,
    allow_offline_usage: bool,
    notification_display_time: Duration,
    enable_app_delegate_swizzling: bool,
    enable_user_notification_center_override: bool,
    request_push_permission_on_first_message: bool,
    renewal_timeout: Duration,
}

impl SessionConfiguration {
    /// Create a configuration for `app_id`, optionally authenticating with a
    /// static auth code. An empty auth code counts as absent.
    pub fn create(app_id: &str, auth_code: Option<&str>) -> Result<Self, ConfigError> {
        if app_id.trim().is_empty() {
            return Err(ConfigError::EmptyAppId);
        }

        let config = Self {
            app_id: OnceLock::new(),
            auth_code: OnceLock::new(),
            region: OnceLock::new(),
            authentication_delegate: OnceLock::new(),
            accent_color: DEFAULT_ACCENT_COLOR,
            user_message_text_color: DEFAULT_USER_MESSAGE_TEXT_COLOR,
            status_bar_style: StatusBarStyle::default(),
            allowed_menu_items: MenuItem::ALL.to_vec(),
            allow_offline_usage: false,
            notification_display_time: DEFAULT_NOTIFICATION_DISPLAY_TIME,
            enable_app_delegate_swizzling: true,
            enable_user_notification_center_override: true,
            request_push_permission_on_first_message: true,
            renewal_timeout: DEFAULT_RENEWAL_TIMEOUT,
        };
        config.set_app_id(app_id)?;
        if let Some(code) = auth_code.filter(|c| !c.is_empty()) {
            config.set_auth_code(code)?;
        }
        Ok(config)
    }

    /// Build the runtime store from a loaded (and validated) file model.
    pub fn from_config(file: &SemproConfig) -> Result<Self, ConfigError> {
        let mut config = Self::create(&file.session.app_id, file.session.auth_code.as_deref())?;
        if let Some(region) = &file.session.region {
            config.set_region(region)?;
        }
        config.set_accent_color(file.ui.accent_color.parse()?);
        config.set_user_message_text_color(file.ui.user_message_text_color.parse()?);
        config.set_status_bar_style(file.ui.status_bar_style);
        config.set_allowed_menu_items(file.ui.allowed_menu_items.as_deref())?;
        config.set_allow_offline_usage(file.offline.allow_offline_usage);
        config.set_notification_display_time(Duration::from_secs(
            file.notifications.display_time_secs,
        ));
        config.set_enable_app_delegate_swizzling(file.notifications.enable_app_delegate_swizzling);
        config.set_enable_user_notification_center_override(
            file.notifications.enable_user_notification_center_override,
        );
        config.set_request_push_permission_on_first_message(
            file.notifications.request_push_permission_on_first_message,
        );
        config.set_renewal_timeout(Duration::from_secs(file.auth.renewal_timeout_secs));
        Ok(config)
    }

    // --- write-once fields ---

    pub fn app_id(&self) -> &str {
        self.app_id.get().map(String::as_str).unwrap_or_default()
    }

    /// Always fails after [`create`](Self::create), which sets the app id.
    pub fn set_app_id(&self, app_id: &str) -> Result<(), ConfigError> {
        if self.app_id.get().is_some() {
            return Err(ConfigError::AlreadySet { field: "app_id" });
        }
        if app_id.trim().is_empty() {
            return Err(ConfigError::EmptyAppId);
        }
        self.app_id
            .set(app_id.to_string())
            .map_err(|_| ConfigError::AlreadySet { field: "app_id" })
    }

    pub fn auth_code(&self) -> Option<&str> {
        self.auth_code.get().map(String::as_str)
    }

    pub fn set_auth_code(&self, code: &str) -> Result<(), ConfigError> {
        self.auth_code
            .set(code.to_string())
            .map_err(|_| ConfigError::AlreadySet { field: "auth_code" })
    }

    /// The configured region, or [`DEFAULT_REGION`].
    pub fn region(&self) -> &str {
        self.region
            .get()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REGION)
    }

    /// Set the region. Values are opaque and forwarded to the transport.
    pub fn set_region(&self, region: &str) -> Result<(), ConfigError> {
        if self.region.get().is_some() {
            return Err(ConfigError::AlreadySet { field: "region" });
        }
        if region.trim().is_empty() {
            return Err(ConfigError::EmptyRegion);
        }
        self.region
            .set(region.to_string())
            .map_err(|_| ConfigError::AlreadySet { field: "region" })
    }

    /// Register the authentication delegate. Only a weak reference is kept.
    pub fn set_authentication_delegate(
        &self,
        delegate: &Arc<dyn AuthenticationDelegate>,
    ) -> Result<(), ConfigError> {
        self.authentication_delegate
            .set(Arc::downgrade(delegate))
            .map_err(|_| ConfigError::AlreadySet {
                field: "authentication_delegate",
            })
    }

    /// Whether a delegate was ever registered, even if it has since been dropped.
    pub fn has_authentication_delegate(&self) -> bool {
        self.authentication_delegate.get().is_some()
    }

    /// The delegate, if registered and still alive.
    pub fn authentication_delegate(&self) -> Option<Arc<dyn AuthenticationDelegate>> {
        self.authentication_delegate.get().and_then(Weak::upgrade)
    }

    // --- ordinary mutators ---

    pub fn accent_color(&self) -> Color {
        self.accent_color
    }

    pub fn set_accent_color(&mut self, color: Color) {
        self.accent_color = color;
    }

    pub fn user_message_text_color(&self) -> Color {
        self.user_message_text_color
    }

    pub fn set_user_message_text_color(&mut self, color: Color) {
        self.user_message_text_color = color;
    }

    pub fn status_bar_style(&self) -> StatusBarStyle {
        self.status_bar_style
    }

    pub fn set_status_bar_style(&mut self, style: StatusBarStyle) {
        self.status_bar_style = style;
    }

    /// Effective menu items. Empty means the menu button is hidden.
    pub fn allowed_menu_items(&self) -> &[MenuItem] {
        &self.allowed_menu_items
    }

    pub fn is_menu_hidden(&self) -> bool {
        self.allowed_menu_items.is_empty()
    }

    /// Replace the menu items from boundary string tokens.
    ///
    /// `None` or an empty list hides the menu. The whole list is rejected if
    /// any token is unknown, leaving the previous value in place. Duplicates
    /// are collapsed, keeping first-seen order.
    pub fn set_allowed_menu_items<S: AsRef<str>>(
        &mut self,
        items: Option<&[S]>,
    ) -> Result<(), ConfigError> {
        let mut parsed = Vec::new();
        for token in items.unwrap_or_default() {
            let token: &str = token.as_ref();
            let item = parse_menu_item(token)?;
            if !parsed.contains(&item) {
                parsed.push(item);
            }
        }
        debug!(items = ?parsed, "allowed menu items updated");
        self.allowed_menu_items = parsed;
        Ok(())
    }

    pub fn allow_offline_usage(&self) -> bool {
        self.allow_offline_usage
    }

    pub fn set_allow_offline_usage(&mut self, allow: bool) {
        self.allow_offline_usage = allow;
    }

    pub fn notification_display_time(&self) -> Duration {
        self.notification_display_time
    }

    /// How long in-app notifications stay up; `None` means until dismissed.
    pub fn notification_display(&self) -> Option<Duration> {
        if self.notification_display_time.is_zero() {
            None
        } else {
            Some(self.notification_display_time)
        }
    }

    pub fn set_notification_display_time(&mut self, time: Duration) {
        self.notification_display_time = time;
    }

    pub fn enable_app_delegate_swizzling(&self) -> bool {
        self.enable_app_delegate_swizzling
    }

    pub fn set_enable_app_delegate_swizzling(&mut self, enable: bool) {
        self.enable_app_delegate_swizzling = enable;
    }

    pub fn enable_user_notification_center_override(&self) -> bool {
        self.enable_user_notification_center_override
    }

    pub fn set_enable_user_notification_center_override(&mut self, enable: bool) {
        self.enable_user_notification_center_override = enable;
    }

    pub fn request_push_permission_on_first_message(&self) -> bool {
        self.request_push_permission_on_first_message
    }

    pub fn set_request_push_permission_on_first_message(&mut self, enable: bool) {
        self.request_push_permission_on_first_message = enable;
    }

    pub fn renewal_timeout(&self) -> Duration {
        self.renewal_timeout
    }

    pub fn set_renewal_timeout(&mut self, timeout: Duration) {
        self.renewal_timeout = timeout;
    }

    /// Whether the dispatcher should attach to platform push events at startup.
    pub fn auto_subscribe_platform_events(&self) -> bool {
        self.enable_app_delegate_swizzling || self.enable_user_notification_center_override
    }
}

impl fmt::Debug for SessionConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfiguration")
            .field("app_id", &self.app_id())
            .field("auth_code", &self.auth_code().map(|_| "<redacted>"))
            .field("region", &self.region())
            .field(
                "authentication_delegate",
                &self.has_authentication_delegate(),
            )
            .field("accent_color", &self.accent_color)
            .field("user_message_text_color", &self.user_message_text_color)
            .field("status_bar_style", &self.status_bar_style)
            .field("allowed_menu_items", &self.allowed_menu_items)
            .field("allow_offline_usage", &self.allow_offline_usage)
            .field("notification_display_time", &self.notification_display_time)
            .field(
                "enable_app_delegate_swizzling",
                &self.enable_app_delegate_swizzling,
            )
            .field(
                "enable_user_notification_center_override",
                &self.enable_user_notification_center_override,
            )
            .field(
                "request_push_permission_on_first_message",
                &self.request_push_permission_on_first_message,
            )
            .field("renewal_timeout", &self.renewal_timeout)
            .finish()
    }
}

/// Parse one menu token, suggesting the closest known token on failure.
pub fn parse_menu_item(token: &str) -> Result<MenuItem, ConfigError> {
    MenuItem::from_str(token).map_err(|_| ConfigError::UnknownMenuItem {
        item: token.to_string(),
        suggestion: suggest_key(token, &MenuItem::TOKENS),
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sempro_core::DelegateError;

    use super::*;

    struct StaticDelegate;

    #[async_trait]
    impl AuthenticationDelegate for StaticDelegate {
        async fn renew(&self) -> Result<String, DelegateError> {
            Ok("renewed".into())
        }
    }

    fn config() -> SessionConfiguration {
        SessionConfiguration::create("app-123", None).unwrap()
    }

    #[test]
    fn create_rejects_empty_app_id() {
        assert_eq!(
            SessionConfiguration::create("", None).unwrap_err(),
            ConfigError::EmptyAppId
        );
        assert_eq!(
            SessionConfiguration::create("   ", Some("code")).unwrap_err(),
            ConfigError::EmptyAppId
        );
    }

    #[test]
    fn defaults_follow_documented_values() {
        let c = config();
        assert_eq!(c.app_id(), "app-123");
        assert_eq!(c.auth_code(), None);
        assert_eq!(c.region(), DEFAULT_REGION);
        assert_eq!(c.allowed_menu_items(), &MenuItem::ALL);
        assert!(!c.allow_offline_usage());
        assert_eq!(c.notification_display(), Some(Duration::from_secs(8)));
        assert!(c.enable_app_delegate_swizzling());
        assert!(c.enable_user_notification_center_override());
        assert!(c.request_push_permission_on_first_message());
        assert_eq!(c.renewal_timeout(), Duration::from_secs(30));
        assert_eq!(c.accent_color().to_string(), "#00B0FF");
        assert_eq!(c.user_message_text_color().to_string(), "#FFFFFF");
        assert!(!c.has_authentication_delegate());
    }

    #[test]
    fn write_once_fields_reject_second_write() {
        let mut c = SessionConfiguration::create("app", Some("code-1")).unwrap();
        c.set_region("eu-1").unwrap();
        let delegate: Arc<dyn AuthenticationDelegate> = Arc::new(StaticDelegate);
        c.set_authentication_delegate(&delegate).unwrap();

        // Intervening ordinary mutations do not reopen the write-once fields.
        c.set_allow_offline_usage(true);
        c.set_allowed_menu_items(Some(&["camera"][..])).unwrap();

        assert_eq!(
            c.set_app_id("other").unwrap_err(),
            ConfigError::AlreadySet { field: "app_id" }
        );
        assert_eq!(
            c.set_auth_code("code-2").unwrap_err(),
            ConfigError::AlreadySet { field: "auth_code" }
        );
        assert_eq!(
            c.set_region("us-1").unwrap_err(),
            ConfigError::AlreadySet { field: "region" }
        );
        assert_eq!(
            c.set_authentication_delegate(&delegate).unwrap_err(),
            ConfigError::AlreadySet {
                field: "authentication_delegate"
            }
        );

        assert_eq!(c.app_id(), "app");
        assert_eq!(c.auth_code(), Some("code-1"));
        assert_eq!(c.region(), "eu-1");
    }

    #[test]
    fn auth_code_can_be_set_once_when_created_without_one() {
        let c = config();
        c.set_auth_code("late").unwrap();
        assert_eq!(c.auth_code(), Some("late"));
        assert!(c.set_auth_code("later").is_err());
    }

    #[test]
    fn empty_region_is_rejected() {
        let c = config();
        assert_eq!(c.set_region(" ").unwrap_err(), ConfigError::EmptyRegion);
        // A rejected write does not consume the slot.
        c.set_region("eu-1").unwrap();
        assert_eq!(c.region(), "eu-1");
    }

    #[test]
    fn delegate_is_held_weakly() {
        let c = config();
        let delegate: Arc<dyn AuthenticationDelegate> = Arc::new(StaticDelegate);
        c.set_authentication_delegate(&delegate).unwrap();
        assert!(c.authentication_delegate().is_some());

        drop(delegate);
        assert!(c.authentication_delegate().is_none());
        assert!(c.has_authentication_delegate());
    }

    #[test]
    fn unknown_menu_item_rejects_whole_list() {
        let mut c = config();
        let err = c
            .set_allowed_menu_items(Some(&["camera", "galery"][..]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownMenuItem {
                item: "galery".into(),
                suggestion: Some("gallery".into()),
            }
        );
        assert_eq!(c.allowed_menu_items(), &MenuItem::ALL);
    }

    #[test]
    fn empty_or_absent_menu_hides_it() {
        let mut c = config();
        c.set_allowed_menu_items::<&str>(Some(&[][..])).unwrap();
        assert!(c.is_menu_hidden());

        c.set_allowed_menu_items(Some(&["location"][..])).unwrap();
        assert_eq!(c.allowed_menu_items(), &[MenuItem::Location]);

        c.set_allowed_menu_items::<&str>(None).unwrap();
        assert!(c.is_menu_hidden());
        assert!(c.allowed_menu_items().is_empty());
    }

    #[test]
    fn duplicate_menu_items_collapse() {
        let mut c = config();
        c.set_allowed_menu_items(Some(&["document", "camera", "document"][..]))
            .unwrap();
        assert_eq!(
            c.allowed_menu_items(),
            &[MenuItem::Document, MenuItem::Camera]
        );
    }

    #[test]
    fn zero_display_time_stays_until_dismissed() {
        let mut c = config();
        c.set_notification_display_time(Duration::ZERO);
        assert_eq!(c.notification_display(), None);
    }

    #[test]
    fn auto_subscribe_follows_either_flag() {
        let mut c = config();
        assert!(c.auto_subscribe_platform_events());
        c.set_enable_app_delegate_swizzling(false);
        assert!(c.auto_subscribe_platform_events());
        c.set_enable_user_notification_center_override(false);
        assert!(!c.auto_subscribe_platform_events());
    }

    #[test]
    fn debug_redacts_auth_code() {
        let c = SessionConfiguration::create("app", Some("very-secret")).unwrap();
        let rendered = format!("{c:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("app"));
    }
}
