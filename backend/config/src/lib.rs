//! `tavern-config`: per-bot configuration for tavern.
//!
//! Provides:
//! - Declarative schema with nested defaults
//! - Recursive resolution of persisted values plus overrides
//! - JSON read/write with atomic backup rotation
//! - Bots manifest with env-var token lookup
//! - Config redaction for safe logging
//! - Non-fatal validation warnings

pub mod env;
pub mod error;
pub mod io;
pub mod manifest;
pub mod redact;
pub mod resolve;
pub mod schema;
pub mod validation;

pub use env::{read_secret, read_secret_with};
pub use error::{ConfigError, MalformedField};
pub use io::{bot_config_path, config_dir, manifest_path, read_json, sanitize_bot_name, write_json};
pub use manifest::{BotEntry, BotsManifest, DEFAULT_TOKEN_VAR};
pub use redact::redact;
pub use resolve::{resolve, Resolution, ResolvedConfig};
pub use schema::{bot_schema, FieldKind, FieldSpec, Schema, DEFAULT_BOT_NAME};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use crate::resolve::apply_overrides;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of loading one bot's config.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ResolvedConfig,
    /// File the config was read from (or generated at).
    pub path: PathBuf,
    /// No file existed; a defaults file was written for the operator to edit.
    pub first_run: bool,
    pub malformed: Vec<MalformedField>,
}

/// Load, resolve, and persist the config for one bot.
///
/// The file lives at `<config_dir>/<sanitized name>.json`, where the name comes
/// from `overrides.name` or the default. On first run the defaults plus any
/// non-secret overrides are written out. Malformed fields are reset, logged,
/// and the normalized file written back.
pub async fn load_bot_config(
    config_dir: &Path,
    overrides: &Map<String, Value>,
    schema: &Schema,
) -> Result<LoadedConfig, ConfigError> {
    let name = overrides
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_BOT_NAME);
    let path = bot_config_path(config_dir, name);

    let persisted = read_json(&path).await?;
    let first_run = persisted.is_none();

    if first_run {
        write_json(&seed_config(overrides, schema), &path).await?;
        info!(path = %path.display(), "No bot config found, wrote defaults");
    }

    let resolution = resolve(overrides, schema, persisted.as_ref()).map_err(|e| e.at(&path))?;

    for field in &resolution.malformed {
        warn!(
            path = %path.display(),
            field = %field.path,
            expected = field.expected,
            found = field.found,
            "Malformed config field reset to default"
        );
    }

    if let Some(persisted) = &persisted {
        let normalized = Value::Object(resolution.normalized.clone());
        if &normalized != persisted {
            write_json(&normalized, &path).await?;
            info!(path = %path.display(), "Normalized config written back");
        }
    }

    let report = validate(&resolution.config);
    for warning in &report.warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }

    debug!(config = %redact(&resolution.config.to_value()), "Resolved bot config");

    Ok(LoadedConfig {
        config: resolution.config,
        path,
        first_run,
        malformed: resolution.malformed,
    })
}

/// Contents of a freshly generated config file: defaults plus non-secret overrides.
///
/// Overrides of the wrong kind are left out; `resolve` reports them.
pub fn seed_config(overrides: &Map<String, Value>, schema: &Schema) -> Value {
    let mut seed = match schema.defaults() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let public: Map<String, Value> = overrides
        .iter()
        .filter(|(key, _)| !schema.is_secret(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    apply_overrides(schema, &mut seed, &public, "", &mut Vec::new());
    Value::Object(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn first_run_writes_defaults_without_secret() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = map(json!({"name": "Keeper", "token": "s3cret"}));

        let loaded = load_bot_config(dir.path(), &overrides, &bot_schema()).await.unwrap();
        assert!(loaded.first_run);
        assert_eq!(loaded.path, dir.path().join("keeper.json"));
        assert_eq!(loaded.config.token(), Some("s3cret"));

        let on_disk = read_json(&loaded.path).await.unwrap().unwrap();
        assert_eq!(on_disk["name"], "Keeper");
        assert_eq!(on_disk["prefix"], "!");
        assert!(on_disk.get("token").is_none());
    }

    #[tokio::test]
    async fn first_run_without_token_fails_after_writing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bot_config(dir.path(), &Map::new(), &bot_schema())
            .await
            .unwrap_err();

        let path = dir.path().join("tavern.json");
        assert!(path.exists());
        match err {
            ConfigError::MissingRequiredField { field, location } => {
                assert_eq!(field, "token");
                assert!(location.contains("tavern.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_fields_are_written_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tavern.json");
        write_json(&json!({"token": "t", "prefix": 7, "motd": "hi"}), &path)
            .await
            .unwrap();

        let loaded = load_bot_config(dir.path(), &Map::new(), &bot_schema()).await.unwrap();
        assert!(!loaded.first_run);
        assert_eq!(loaded.malformed.len(), 1);
        assert_eq!(loaded.config.prefix(), "!");

        let on_disk = read_json(&path).await.unwrap().unwrap();
        assert_eq!(on_disk["prefix"], "!");
        assert_eq!(on_disk["motd"], "hi");
        assert_eq!(on_disk["defaultColors"]["success"], "#41b95f");
    }

    #[tokio::test]
    async fn override_token_does_not_replace_persisted_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tavern.json");
        let full = json!({
            "token": "file",
            "name": "tavern",
            "prefix": "!",
            "defaultColors": bot_schema().defaults()["defaultColors"].clone()
        });
        write_json(&full, &path).await.unwrap();

        let loaded = load_bot_config(dir.path(), &map(json!({"token": "env"})), &bot_schema())
            .await
            .unwrap();
        assert_eq!(loaded.config.token(), Some("env"));
        assert_eq!(read_json(&path).await.unwrap().unwrap()["token"], "file");
    }

    #[test]
    fn seed_skips_secret_overrides() {
        let seed = seed_config(&map(json!({"token": "x", "prefix": "?"})), &bot_schema());
        assert!(seed.get("token").is_none());
        assert_eq!(seed["prefix"], "?");
    }

    #[test]
    fn seed_drops_wrong_kind_and_merges_colors() {
        let seed = seed_config(
            &map(json!({"prefix": 5, "defaultColors": {"success": "#000000"}})),
            &bot_schema(),
        );
        assert_eq!(seed["prefix"], "!");
        assert_eq!(seed["defaultColors"]["success"], "#000000");
        assert_eq!(seed["defaultColors"]["error"], "#c63737");
    }

    #[tokio::test]
    async fn malformed_override_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_bot_config(
            dir.path(),
            &map(json!({"token": "t", "prefix": 5})),
            &bot_schema(),
        )
        .await
        .unwrap();
        assert_eq!(loaded.config.prefix(), "!");
        assert_eq!(loaded.malformed.len(), 1);
        assert_eq!(read_json(&loaded.path).await.unwrap().unwrap()["prefix"], "!");
    }
}
