// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup for hosts that do not install their own.

use sempro_config::SemproConfig;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber logging Sempro at `level` and everything else at
/// `warn`. `RUST_LOG` takes precedence when set.
///
/// Does nothing if the host already installed a global subscriber.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}

/// [`init_tracing`] at the level from the file's `[logging]` section.
pub fn init_tracing_from(config: &SemproConfig) {
    init_tracing(&config.logging.level);
}

fn default_directives(level: &str) -> String {
    format!("sempro={level},warn")
}
