//! Errors raised while loading or checking the streamer configuration.

use std::path::PathBuf;

use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("No wavestream configuration at {}", .0.display())]
    FileNotFound(PathBuf),

    /// The merged configuration breaks one or more rules.
    #[error("Rejected streamer configuration:\n{}", render_issues(.0))]
    Validation(#[source] ValidationErrors),

    /// A layer could not be read or does not match the schema.
    #[error("Could not read streamer configuration: {0}")]
    Parsing(#[from] figment::Error),
}

impl ConfigError {
    /// Every validation failure as `path: code`, e.g. `timing.sample_rate_hz: range`.
    /// Empty for non-validation errors.
    pub fn issues(&self) -> Vec<String> {
        match self {
            ConfigError::Validation(errors) => {
                let mut issues = Vec::new();
                collect_issues("", errors, &mut issues);
                issues.sort();
                issues
            }
            _ => Vec::new(),
        }
    }
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

fn render_issues(errors: &ValidationErrors) -> String {
    let mut issues = Vec::new();
    collect_issues("", errors, &mut issues);
    issues.sort();
    issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Walks nested sections and node lists. Struct-level rules are reported
/// under the section they belong to.
fn collect_issues(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (key, kind) in errors.errors() {
        let path = match (prefix.is_empty(), key.as_ref()) {
            (true, "__all__") => "config".to_string(),
            (false, "__all__") => prefix.to_string(),
            (true, field) => field.to_string(),
            (false, field) => format!("{prefix}.{field}"),
        };
        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    let reason = failure
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| failure.code.to_string());
                    out.push(format!("{path}: {reason}"));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_issues(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_issues(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}
