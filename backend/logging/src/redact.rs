//! Log Redaction
//!
//! Scrubs platform bot tokens and authorization headers from free text.

use regex::Regex;
use std::sync::LazyLock;

// Discord tokens: base64 user id, timestamp, HMAC, dot separated.
static DISCORD_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_\-]{23,28}\.[A-Za-z0-9_\-]{6,7}\.[A-Za-z0-9_\-]{27,38}")
        .expect("static regex is valid")
});
static AUTH_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(authorization:\s*(?:Bot|Bearer))\s+[A-Za-z0-9\-\._~+/]+=*")
        .expect("static regex is valid")
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = AUTH_HEADER_RE.replace_all(input, "$1 [REDACTED_TOKEN]");
    DISCORD_TOKEN_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_discord_token() {
        let token = "MTA0NTY3ODkwMTIzNDU2Nzg5MA.GaBcDe.abcdefghijklmnopqrstuvwxyz0123456";
        let clean = redact_sensitive_data(&format!("login failed for {token}"));
        assert!(!clean.contains(token));
        assert!(clean.starts_with("login failed for "));
    }

    #[test]
    fn test_redacts_authorization_header() {
        let clean = redact_sensitive_data("Authorization: Bot abc.def.ghi");
        assert_eq!(clean, "Authorization: Bot [REDACTED_TOKEN]");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(redact_sensitive_data("rolled 3d6"), "rolled 3d6");
        assert_eq!(
            redact_sensitive_data("the bot lacks permission; Bearer of bad news"),
            "the bot lacks permission; Bearer of bad news"
        );
    }

    #[test]
    fn test_header_match_ignores_case() {
        let clean = redact_sensitive_data("authorization: bearer abc123==");
        assert_eq!(clean, "authorization: bearer [REDACTED_TOKEN]");
    }
}
