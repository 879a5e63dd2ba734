//! Secret lookup from the process environment.
//!
//! The manifest names an environment variable per bot; the token itself never
//! appears in a config file written by tavern.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Conventional env var names: uppercase, digits, underscores.
static ENV_VAR_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").expect("static regex is valid"));

/// Read a secret from the process environment. Unset or blank reads as `None`.
pub fn read_secret(var_name: &str) -> Option<String> {
    lookup(var_name, |key| std::env::var(key).ok())
}

/// Read a secret from a provided map (useful for testing).
pub fn read_secret_with(var_name: &str, env: &HashMap<String, String>) -> Option<String> {
    lookup(var_name, |key| env.get(key).cloned())
}

fn lookup(var_name: &str, get: impl Fn(&str) -> Option<String>) -> Option<String> {
    get(var_name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Whether `s` looks like an env var name rather than a pasted secret.
pub fn is_env_var_name(s: &str) -> bool {
    ENV_VAR_NAME.is_match(s)
}
