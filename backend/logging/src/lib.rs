//! Structured logging for tavern.
//!
//! Console plus rolling JSON file output, structured bot events, and secret
//! scrubbing for free-text log fields.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{BotEvent, EventLogEntry, EventLogger};
pub use logger::{init_logger, LOG_FILE_NAME};
pub use redact::redact_sensitive_data;
