//! Config file read/write with atomic backup rotation.

use crate::error::ConfigError;
use crate::schema::DEFAULT_BOT_NAME;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Name of the bots manifest within the config directory.
pub const MANIFEST_FILE_NAME: &str = "bots.json";

/// Number of rolling backups to keep per file.
const MAX_BACKUPS: usize = 3;

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex is valid"));

/// Resolve the tavern config directory.
/// Priority: `TAVERN_CONFIG_DIR` env > `~/.tavern/` > `./.tavern/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TAVERN_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tavern");
    }
    PathBuf::from(".tavern")
}

/// Path of the bots manifest inside `config_dir`.
pub fn manifest_path(config_dir: &Path) -> PathBuf {
    config_dir.join(MANIFEST_FILE_NAME)
}

/// Turn a display name into a file-system safe stem: `My Bot!` → `my_bot`.
pub fn sanitize_bot_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let replaced = UNSAFE_NAME_CHARS.replace_all(&lower, "_");
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        DEFAULT_BOT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Per-bot config file path, derived from the sanitized bot name.
pub fn bot_config_path(config_dir: &Path, bot_name: &str) -> PathBuf {
    config_dir.join(format!("{}.json", sanitize_bot_name(bot_name)))
}

/// Read and parse a JSON file.
///
/// Returns `Ok(None)` if the file doesn't exist (first run).
pub async fn read_json(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist");
        return Ok(None);
    }

    let raw = fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(Some(value))
}

/// Write JSON to disk atomically (write to temp file, rename).
///
/// Creates a rolling backup of the previous file before overwriting.
pub async fn write_json(value: &Value, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    if path.exists() {
        rotate_backups(path).await;
    }

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json.as_bytes()).await.map_err(write_err)?;
    fs::rename(&tmp_path, path).await.map_err(write_err)?;

    info!(path = %path.display(), "Wrote config file");
    Ok(())
}

/// Rotate backup files: x.json.bak.1 → .bak.2 → ... → .bak.N
async fn rotate_backups(path: &Path) {
    for i in (1..MAX_BACKUPS).rev() {
        let old = path.with_extension(format!("json.bak.{}", i));
        let new = path.with_extension(format!("json.bak.{}", i + 1));
        if old.exists() {
            if let Err(e) = fs::rename(&old, &new).await {
                warn!("Failed to rotate backup {}: {}", old.display(), e);
            }
        }
    }

    let bak = path.with_extension("json.bak.1");
    if let Err(e) = fs::copy(path, &bak).await {
        warn!("Failed to create backup {}: {}", bak.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_bot_name("Tavern Keeper"), "tavern_keeper");
        assert_eq!(sanitize_bot_name("  Dice--Bot!! "), "dice_bot");
        assert_eq!(sanitize_bot_name("!!!"), "tavern");
        assert_eq!(sanitize_bot_name("ßot"), "ot");
    }

    #[test]
    fn bot_path_uses_sanitized_name() {
        let path = bot_config_path(Path::new("/cfg"), "My Bot");
        assert_eq!(path, PathBuf::from("/cfg/my_bot.json"));
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_json(&dir.path().join("nope.json")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_then_read_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bot.json");

        write_json(&json!({"prefix": "!"}), &path).await.unwrap();
        write_json(&json!({"prefix": "?"}), &path).await.unwrap();

        assert_eq!(read_json(&path).await.unwrap().unwrap()["prefix"], "?");
        let backup = read_json(&path.with_extension("json.bak.1")).await.unwrap().unwrap();
        assert_eq!(backup["prefix"], "!");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_json(&path).await, Err(ConfigError::Parse { .. })));
    }
}
