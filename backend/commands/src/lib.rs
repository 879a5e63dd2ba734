//! Command registry, dispatcher, and the built-in tavern commands.

pub mod detection;
pub mod dice;
pub mod dispatch;
pub mod handlers;
pub mod registry;
pub mod types;

pub use detection::parse_invocation;
pub use dice::{evaluate as evaluate_dice, DiceError, DiceOutcome, DiceSpec};
pub use dispatch::{BotContext, BypassTrigger, CommandHandler, Dispatcher, HANDLER_ERROR_REPLY};
pub use handlers::{DiceCommand, HelpCommand, WhoisCommand};
pub use registry::{builtin_commands, CommandRegistry};
pub use types::{CommandDescriptor, CommandInvocation, DispatchOutcome};
