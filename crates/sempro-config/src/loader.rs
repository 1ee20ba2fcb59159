// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/sempro/sempro.toml`
//! 3. `~/.config/sempro/sempro.toml`
//! 4. `./sempro.toml`
//! 5. `SEMPRO_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SemproConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/sempro/sempro.toml";
pub const LOCAL_CONFIG_PATH: &str = "sempro.toml";

/// Per-user config file path, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sempro").join("sempro.toml"))
}

/// The full layered figment, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(SemproConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<SemproConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the compiled defaults.
pub fn load_config_from_str(toml_content: &str) -> Result<SemproConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SemproConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file plus env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SemproConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SemproConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// `SEMPRO_SESSION_APP_ID` maps to `session.app_id`.
///
/// Section names are mapped explicitly because keys contain underscores,
/// which rules out `Env::split("_")`.
fn env_provider() -> Env {
    Env::prefixed("SEMPRO_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 6] = ["session", "ui", "notifications", "offline", "auth", "logging"];
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
