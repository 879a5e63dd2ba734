//! Explicit bot lifecycle state machine.
//!
//! ```text
//! Unstarted → ConfigLoading → CommandsLoading → Connecting → Connected
//!                  │                  │             │         ⇅
//!                  ├→ AwaitingSetup   └→ FatalError ┘    Reconnecting
//!                  └→ FatalError
//! any live state → Disconnected → Connected | Reconnecting
//! ```

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use tavern_logging::{BotEvent, EventLogger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotState {
    Unstarted,
    ConfigLoading,
    CommandsLoading,
    Connecting,
    Connected,
    Reconnecting,
    Disconnected,
    /// First run: a config file was generated and needs editing.
    AwaitingSetup,
    /// Startup could not complete.
    FatalError(String),
}

impl BotState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::ConfigLoading => "config_loading",
            Self::CommandsLoading => "commands_loading",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Disconnected => "disconnected",
            Self::AwaitingSetup => "awaiting_setup",
            Self::FatalError(_) => "fatal_error",
        }
    }

    /// No further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AwaitingSetup | Self::FatalError(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FatalError(_))
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FatalError(reason) => write!(f, "fatal_error ({reason})"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("invalid lifecycle transition {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

/// Whether `from → to` is a legal step.
pub fn can_transition(from: &BotState, to: &BotState) -> bool {
    use BotState::*;

    if from.is_terminal() {
        return false;
    }
    match (from, to) {
        (Unstarted, Disconnected) => false,
        (_, Disconnected) => true,
        (Unstarted, ConfigLoading) => true,
        (ConfigLoading, CommandsLoading | AwaitingSetup | FatalError(_)) => true,
        (CommandsLoading, Connecting | FatalError(_)) => true,
        (Connecting, Connected | FatalError(_)) => true,
        (Connected, Reconnecting) => true,
        (Reconnecting | Disconnected, Connected | Reconnecting) => true,
        _ => false,
    }
}

/// Current state of one bot plus transition bookkeeping.
#[derive(Debug)]
pub struct Lifecycle {
    bot: String,
    state: BotState,
}

impl Lifecycle {
    pub fn new(bot: impl Into<String>) -> Self {
        Self {
            bot: bot.into(),
            state: BotState::Unstarted,
        }
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Rename once the resolved config is known.
    pub fn set_bot(&mut self, bot: impl Into<String>) {
        self.bot = bot.into();
    }

    /// Move to `to`. Re-entering the current state is a no-op.
    pub fn transition(&mut self, to: BotState) -> Result<(), LifecycleError> {
        if self.state == to {
            return Ok(());
        }
        if !can_transition(&self.state, &to) {
            let err = LifecycleError::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            };
            warn!(bot = %self.bot, error = %err, "Rejected lifecycle transition");
            return Err(err);
        }

        info!(bot = %self.bot, from = %self.state, to = %to, "Lifecycle transition");
        EventLogger::log_event(
            &self.bot,
            BotEvent::StateChanged {
                from: self.state.label().into(),
                to: to.label().into(),
            },
        );
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut lc = Lifecycle::new("tavern");
        for next in [
            BotState::ConfigLoading,
            BotState::CommandsLoading,
            BotState::Connecting,
            BotState::Connected,
            BotState::Reconnecting,
            BotState::Connected,
            BotState::Disconnected,
            BotState::Connected,
        ] {
            lc.transition(next.clone()).unwrap();
            assert_eq!(lc.state(), &next);
        }
    }

    #[test]
    fn test_cannot_skip_startup_steps() {
        let mut lc = Lifecycle::new("tavern");
        let err = lc.transition(BotState::Connecting).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: "unstarted".into(),
                to: "connecting".into()
            }
        );
        assert_eq!(lc.state(), &BotState::Unstarted);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut lc = Lifecycle::new("tavern");
        lc.transition(BotState::ConfigLoading).unwrap();
        lc.transition(BotState::FatalError("missing token".into())).unwrap();
        assert!(lc.state().is_fatal());
        assert!(lc.transition(BotState::Disconnected).is_err());
        assert!(lc.transition(BotState::ConfigLoading).is_err());
    }

    #[test]
    fn test_fatal_only_during_startup() {
        assert!(can_transition(&BotState::ConfigLoading, &BotState::FatalError("x".into())));
        assert!(!can_transition(&BotState::Connected, &BotState::FatalError("x".into())));
        assert!(can_transition(&BotState::ConfigLoading, &BotState::AwaitingSetup));
        assert!(!can_transition(&BotState::Connecting, &BotState::AwaitingSetup));
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut lc = Lifecycle::new("tavern");
        assert!(lc.transition(BotState::Unstarted).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(BotState::FatalError("bad".into()).to_string(), "fatal_error (bad)");
        assert_eq!(BotState::AwaitingSetup.to_string(), "awaiting_setup");
    }
}
