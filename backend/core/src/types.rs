use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform user as seen by commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            created_at,
            bot: false,
        }
    }
}

/// Identity of the connected bot account, reported on `ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    pub id: String,
    pub tag: String,
}

/// Render a timestamp in RFC 1123 form, e.g. `Tue, 15 Oct 2019 12:00:00 GMT`.
pub fn format_utc(ts: &DateTime<Utc>) -> String {
    ts.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_utc() {
        let ts = Utc.with_ymd_and_hms(2019, 10, 15, 12, 0, 0).unwrap();
        assert_eq!(format_utc(&ts), "Tue, 15 Oct 2019 12:00:00 GMT");
    }

    #[test]
    fn test_user_new_is_not_bot() {
        let user = User::new("1", "alice", Utc::now());
        assert!(!user.bot);
        assert_eq!(user.username, "alice");
    }
}
