// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Load-time diagnostics for `sempro.toml`.
//!
//! Figment errors are converted into miette diagnostics with "did you mean"
//! suggestions based on Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive triggers this lint

use miette::Diagnostic;
use thiserror::Error;

use sempro_core::ConfigError;

/// Minimum Jaro-Winkler score for a suggestion. Catches `camra` -> `camera`
/// and `regoin` -> `region` without suggesting unrelated keys.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration file problem, renderable with miette.
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(sempro::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(sempro::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(sempro::config::missing_key),
        help("add `{key} = <value>` to your sempro.toml")
    )]
    MissingKey { key: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(sempro::config::validation))]
    Validation { message: String },

    /// A session configuration contract violation.
    #[error(transparent)]
    #[diagnostic(code(sempro::config::contract))]
    Contract(#[from] ConfigError),

    #[error("configuration error: {0}")]
    #[diagnostic(code(sempro::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert every error inside a `figment::Error` into a [`LoadError`].
pub fn figment_to_load_errors(err: figment::Error) -> Vec<LoadError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path = error.path.join(".");
            match &error.kind {
                Kind::UnknownField(field, expected) => LoadError::UnknownKey {
                    key: qualified(&path, field),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                },
                Kind::MissingField(field) => LoadError::MissingKey {
                    key: qualified(&path, field),
                },
                Kind::InvalidType(actual, expected) => LoadError::InvalidType {
                    key: path,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                },
                _ => LoadError::Other(error.to_string()),
            }
        })
        .collect()
}

fn qualified(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else if path.ends_with(field) {
        path.to_string()
    } else {
        format!("{path}.{field}")
    }
}

/// The closest candidate to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &candidate in candidates {
        let score = strsim::jaro_winkler(unknown, candidate);
        if score > best_score {
            best_score = score;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[LoadError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        if handler.render_report(&mut buf, error).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_menu_token() {
        let tokens = &["camera", "gallery", "document", "location"];
        assert_eq!(suggest_key("camra", tokens), Some("camera".to_string()));
        assert_eq!(suggest_key("galery", tokens), Some("gallery".to_string()));
    }

    #[test]
    fn no_suggestion_for_unrelated_token() {
        let tokens = &["camera", "gallery", "document", "location"];
        assert_eq!(suggest_key("zzzzzz", tokens), None);
    }

    #[test]
    fn contract_errors_keep_their_message() {
        let err = LoadError::from(ConfigError::EmptyAppId);
        assert_eq!(err.to_string(), "app id must not be empty");
    }
}
