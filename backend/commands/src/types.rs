/// Command types shared by the registry and the dispatcher.
use std::fmt;
use std::sync::Arc;

use crate::dispatch::CommandHandler;

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// A named command and the handler that runs it.
#[derive(Clone)]
pub struct CommandDescriptor {
    /// Unique lowercase key (e.g. "dice").
    pub name: String,
    pub description: String,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            handler,
        }
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Parsed invocation
// ---------------------------------------------------------------------------

/// A prefixed message split into command name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Lowercased, prefix stripped.
    pub name: String,
    /// Remaining whitespace-separated tokens, in order.
    pub args: Vec<String>,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What the dispatcher did with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No prefix match; nothing happened.
    Ignored,
    /// Prefix matched but no such command. No reply is sent.
    NotFound(String),
    /// The handler (or the bypass trigger) ran to completion.
    Success,
    /// The handler failed or panicked; the user got the generic apology.
    HandlerError,
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => f.write_str("ignored"),
            Self::NotFound(name) => write!(f, "not-found ({name})"),
            Self::Success => f.write_str("success"),
            Self::HandlerError => f.write_str("handler-error"),
        }
    }
}
