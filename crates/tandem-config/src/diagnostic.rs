// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean" suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with diagnostic context.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(tandem::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(tandem::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A configuration value could not be parsed for its field.
    #[error("invalid value for key `{key}`: {detail}")]
    #[diagnostic(code(tandem::config::invalid_value))]
    InvalidValue { key: String, detail: String },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(tandem::config::missing_key),
        help("add `{key} = <value>` to your tandem.toml")
    )]
    MissingKey { key: String },

    /// A value that parsed but breaks a semantic constraint.
    #[error("validation error: {message}")]
    #[diagnostic(code(tandem::config::validation))]
    Validation { message: String },

    /// Any other configuration error.
    #[error("configuration error: {0}")]
    #[diagnostic(code(tandem::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ConfigError::Validation {
            message: message.into(),
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

fn dotted_path(error: &figment::error::Error) -> String {
    error
        .path
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(".")
}

/// Converts every error inside a `figment::Error` into a [`ConfigError`].
///
/// `toml_sources` holds `(path, content)` pairs used to attach source spans
/// to unknown-key errors.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                let (span, src) = source_span(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, &valid_keys),
                    valid_keys: valid_keys.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.to_string(),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: dotted_path(&error),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.to_string(),
            },
            Kind::InvalidValue(actual, expected) => ConfigError::InvalidValue {
                key: dotted_path(&error),
                detail: format!("found {actual}, expected {expected}"),
            },
            Kind::UnknownVariant(variant, expected) => {
                let hint = suggest_key(variant, expected)
                    .map(|s| format!(" (did you mean `{s}`?)"))
                    .unwrap_or_default();
                ConfigError::InvalidValue {
                    key: dotted_path(&error),
                    detail: format!(
                        "unknown variant `{variant}`{hint}, expected one of: {}",
                        expected.join(", ")
                    ),
                }
            }
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Locates `field` in whichever TOML source produced `error`.
fn source_span(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline strings have no file origin; fall back to the only source.
    let source = match origin {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    let Some((path, content)) = source else {
        return (None, None);
    };
    let section: Vec<String> = error.path.clone();
    match find_key_offset(content, &section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` as a key inside the `[section]` named by `path`.
///
/// With an empty `path` the search covers the top-level table. The search
/// stops at the next table header.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let mut in_section = path.is_empty();
    let header = path.first().map(|s| format!("[{s}]"));
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            if in_section && !path.is_empty() {
                return None;
            }
            in_section = header.as_deref() == Some(trimmed.trim_end());
            if path.is_empty() {
                return None;
            }
        } else if in_section {
            if let Some(after) = trimmed.strip_prefix(field) {
                if after.starts_with([' ', '\t', '=']) {
                    return Some(offset + (line.len() - trimmed.len()));
                }
            }
        }
        offset += line.len();
    }

    None
}

/// Best Jaro-Winkler match for `unknown` among `valid_keys`, if any is
/// close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render `errors` to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
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
    fn suggest_naem_for_name() {
        let valid = &["name", "user_id", "log_level"];
        assert_eq!(suggest_key("naem", valid), Some("name".to_string()));
    }

    #[test]
    fn suggest_api_kye_for_api_key() {
        let valid = &["kind", "api_key", "model", "base_url"];
        assert_eq!(suggest_key("api_kye", valid), Some("api_key".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["name", "user_id", "log_level"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_in_section() {
        let content = "[agent]\nname = \"a\"\n\n[provider]\nnaem = \"test\"\n";
        let path = vec!["provider".to_string()];
        let offset = find_key_offset(content, &path, "naem").unwrap();
        assert_eq!(&content[offset..offset + 4], "naem");
    }

    #[test]
    fn find_key_offset_stays_inside_section() {
        let content = "[agent]\nname = \"a\"\n[provider]\nmodel = \"m\"\n";
        let path = vec!["agent".to_string()];
        assert_eq!(find_key_offset(content, &path, "model"), None);
    }

    #[test]
    fn find_key_offset_handles_crlf_and_indent() {
        let content = "[gateway]\r\n  prot = 80\r\n";
        let path = vec!["gateway".to_string()];
        let offset = find_key_offset(content, &path, "prot").unwrap();
        assert_eq!(&content[offset..offset + 4], "prot");
    }
}
