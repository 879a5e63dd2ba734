use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::schema::FieldKind;

/// Errors raised while loading or resolving bot configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mandatory field is absent from both overrides and the persisted file.
    #[error("missing required config field `{field}` (set it in {location})")]
    MissingRequiredField { field: String, location: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {} as JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bots manifest not found at {}; run `tavern init` to create one", .0.display())]
    ManifestMissing(PathBuf),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfigError {
    /// Point a missing-field error at the file the operator should edit.
    pub fn at(self, path: &Path) -> Self {
        match self {
            ConfigError::MissingRequiredField { field, .. } => ConfigError::MissingRequiredField {
                field,
                location: format!("{} or the environment", path.display()),
            },
            other => other,
        }
    }
}

/// A persisted value of the wrong kind that was reset to its default.
///
/// Recovered locally; logged as a warning and never shown to chat users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed config field `{path}`: expected {expected}, found {found}; reset to default")]
pub struct MalformedField {
    /// Dotted path, e.g. `defaultColors.error`. Empty for the root object.
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl MalformedField {
    pub fn new(path: impl Into<String>, expected: &FieldKind, found: &'static str) -> Self {
        Self {
            path: path.into(),
            expected: expected.name(),
            found,
        }
    }
}
