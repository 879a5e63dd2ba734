//! Bots manifest: the list of bots one process runs.
//!
//! ```json
//! { "bots": [ { "name": "Tavern", "token": "TAVERN_TOKEN", "prefix": "?" } ] }
//! ```
//!
//! `token` names the environment variable holding the secret. Any other keys
//! become config overrides for that bot. Array position is the bot index.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::env::{is_env_var_name, read_secret, read_secret_with};
use crate::error::ConfigError;
use crate::io::read_json;
use crate::schema::DEFAULT_BOT_NAME;

/// Default env var for the first bot in a generated manifest.
pub const DEFAULT_TOKEN_VAR: &str = "TAVERN_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotsManifest {
    #[serde(default)]
    pub bots: Vec<BotEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotEntry {
    #[serde(default = "default_name")]
    pub name: String,
    /// Name of the environment variable holding this bot's token.
    #[serde(rename = "token")]
    pub token_var: String,
    /// Everything else in the entry; applied as config overrides.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_name() -> String {
    DEFAULT_BOT_NAME.to_string()
}

impl BotsManifest {
    /// Load the manifest at `path`. A missing file is an error: nothing to run.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let value = read_json(path)
            .await?
            .ok_or_else(|| ConfigError::ManifestMissing(path.to_path_buf()))?;
        let manifest: Self = serde_json::from_value(value).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        for entry in &manifest.bots {
            if !is_env_var_name(&entry.token_var) {
                warn!(
                    bot = %entry.name,
                    "Manifest `token` should name an environment variable, not hold the secret"
                );
            }
        }
        Ok(manifest)
    }

    /// A one-bot manifest used by `tavern init`.
    pub fn sample(name: &str, token_var: &str) -> Self {
        Self {
            bots: vec![BotEntry {
                name: name.to_string(),
                token_var: token_var.to_string(),
                extra: Map::new(),
            }],
        }
    }
}

impl BotEntry {
    /// Config overrides for this bot with the token read from the process environment.
    pub fn overrides(&self) -> Map<String, Value> {
        self.overrides_with_token(read_secret(&self.token_var))
    }

    /// Same as [`BotEntry::overrides`] but reading from a provided map.
    pub fn overrides_with(&self, env: &HashMap<String, String>) -> Map<String, Value> {
        self.overrides_with_token(read_secret_with(&self.token_var, env))
    }

    fn overrides_with_token(&self, token: Option<String>) -> Map<String, Value> {
        let mut overrides = self.extra.clone();
        overrides.insert("name".into(), Value::String(self.name.clone()));
        match token {
            Some(token) => {
                overrides.insert("token".into(), Value::String(token));
            }
            None => warn!(
                bot = %self.name,
                var = %self.token_var,
                "Token environment variable is not set"
            ),
        }
        overrides
    }
}
