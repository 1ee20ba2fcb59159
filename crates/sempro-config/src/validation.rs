// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of `sempro.toml`.
//!
//! Collects every problem instead of stopping at the first one.

use sempro_core::ConfigError;

use crate::color::Color;
use crate::diagnostic::LoadError;
use crate::model::SemproConfig;
use crate::store::parse_menu_item;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &SemproConfig) -> Result<(), Vec<LoadError>> {
    let mut errors = Vec::new();

    if config.session.app_id.trim().is_empty() {
        errors.push(LoadError::Contract(ConfigError::EmptyAppId));
    }

    if let Some(region) = &config.session.region {
        if region.trim().is_empty() {
            errors.push(LoadError::Contract(ConfigError::EmptyRegion));
        }
    }

    for value in [&config.ui.accent_color, &config.ui.user_message_text_color] {
        if let Err(err) = value.parse::<Color>() {
            errors.push(LoadError::Contract(err));
        }
    }

    for token in config.ui.allowed_menu_items.iter().flatten() {
        if let Err(err) = parse_menu_item(token) {
            errors.push(LoadError::Contract(err));
        }
    }

    if config.auth.renewal_timeout_secs == 0 {
        errors.push(LoadError::Validation {
            message: "auth.renewal_timeout_secs must be at least 1".to_string(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(LoadError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
