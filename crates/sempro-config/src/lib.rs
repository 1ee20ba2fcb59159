// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Sempro messaging SDK.
//!
//! Two layers live here:
//!
//! - [`SessionConfiguration`], the runtime store handed to every component.
//!   Identity fields are write-once; cosmetic and feature fields are plain
//!   mutators.
//! - [`SemproConfig`], the `sempro.toml` file model, loaded through Figment
//!   with XDG lookup and `SEMPRO_*` env overrides, validated, and rendered as
//!   miette diagnostics on failure.
//!
//! # Usage
//!
//! ```no_run
//! use sempro_config::{SessionConfiguration, load_and_validate};
//!
//! let file = load_and_validate().expect("config errors");
//! let config = SessionConfiguration::from_config(&file).expect("invalid session");
//! println!("region: {}", config.region());
//! ```

pub mod color;
pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod store;
pub mod validation;

pub use color::Color;
pub use diagnostic::{LoadError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::SemproConfig;
pub use store::{DEFAULT_REGION, SessionConfiguration};

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<SemproConfig, Vec<LoadError>> {
    let config = loader::load_config().map_err(diagnostic::figment_to_load_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SemproConfig, Vec<LoadError>> {
    let config =
        loader::load_config_from_str(toml_content).map_err(diagnostic::figment_to_load_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}
