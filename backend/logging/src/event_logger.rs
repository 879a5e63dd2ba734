//! Bot Event Logger
//!
//! Structured per-bot events (command dispatch, handler failure, lifecycle
//! changes) emitted under the `bot_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum BotEvent {
    CommandDispatched {
        command: String,
        args: usize,
    },
    HandlerFailed {
        command: String,
        error_msg: String,
    },
    StateChanged {
        from: String,
        to: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub bot: String,
    pub timestamp: DateTime<Utc>,
    pub event: BotEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Build the entry for `event`, scrubbing free-text fields.
    pub fn entry(bot: &str, mut event: BotEvent) -> EventLogEntry {
        if let BotEvent::HandlerFailed { error_msg, .. } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        EventLogEntry {
            bot: bot.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Log a bot's runtime event through tracing.
    pub fn log_event(bot: &str, event: BotEvent) {
        let entry = Self::entry(bot, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "bot_events", bot = %entry.bot, event = %json, "Bot event");
    }
}
