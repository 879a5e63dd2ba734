//! Config validation: non-fatal checks with operator-friendly messages.

use crate::resolve::ResolvedConfig;
use thiserror::Error;

/// A config validation finding with field path and message.
#[derive(Debug, Error)]
#[error("Config validation issue at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All findings from one pass. Nothing here stops a bot from starting.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Colour keys every bot is expected to define.
pub const COLOR_KEYS: [&str; 4] = ["success", "neutral", "warning", "error"];

/// Validate a resolved bot config.
pub fn validate(config: &ResolvedConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_prefix(config, &mut report);
    validate_colors(config, &mut report);
    report
}

fn validate_prefix(config: &ResolvedConfig, report: &mut ValidationReport) {
    let prefix = config.prefix();
    if prefix.is_empty() {
        report.warn("prefix", "Empty prefix; every message will be parsed as a command");
    } else if prefix.chars().any(char::is_whitespace) {
        report.warn("prefix", "Prefix contains whitespace; commands will never match");
    }
}

fn validate_colors(config: &ResolvedConfig, report: &mut ValidationReport) {
    for key in COLOR_KEYS {
        let path = format!("defaultColors.{key}");
        let raw = config.get_path(&path).and_then(|v| v.as_str()).unwrap_or("");
        if parse_hex_color(raw).is_none() {
            report.warn(&path, format!("'{raw}' is not a #rrggbb colour; embeds will be uncoloured"));
        }
    }
}

/// Parse `#rrggbb` (leading `#` optional) into 0xRRGGBB.
pub fn parse_hex_color(raw: &str) -> Option<u32> {
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use crate::schema::bot_schema;
    use serde_json::{json, Map};

    fn config(persisted: serde_json::Value) -> ResolvedConfig {
        resolve(&Map::new(), &bot_schema(), Some(&persisted)).unwrap().config
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#41b95f"), Some(0x41b95f));
        assert_eq!(parse_hex_color("C63737"), Some(0xc63737));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn defaults_are_clean() {
        let report = validate(&config(json!({"token": "t"})));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn warns_on_empty_prefix_and_bad_color() {
        let report = validate(&config(json!({
            "token": "t",
            "prefix": "",
            "defaultColors": {"error": "red"}
        })));
        let paths: Vec<_> = report.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["prefix", "defaultColors.error"]);
    }

    #[test]
    fn warns_on_whitespace_prefix() {
        let report = validate(&config(json!({"token": "t", "prefix": "hey bot"})));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("whitespace"));
    }
}
