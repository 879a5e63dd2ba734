use std::path::PathBuf;

/// Process-level settings for the `tavern` binary.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory for the rolling log file
    pub log_dir: String,
    /// Log level when `RUST_LOG` is unset
    pub log_level: String,
    /// Directory holding `bots.json` and per-bot configs
    pub config_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            log_level: "info".to_string(),
            config_dir: tavern_config::config_dir(),
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self {
            log_dir: std::env::var("TAVERN_LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            config_dir: tavern_config::config_dir(),
        }
    }

    /// `--config-dir` wins over the environment.
    pub fn config_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.config_dir.clone())
    }
}
