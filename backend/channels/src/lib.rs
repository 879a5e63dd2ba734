//! Platform adapters. Each one turns a platform connection into a stream of
//! [`tavern_core::PlatformEvent`]s and implements replies through
//! [`tavern_core::MessageSink`].

pub mod console;
pub mod discord;
pub mod discord_embeds;

pub use console::{ConsoleAdapter, ConsoleSink};
pub use discord::{DiscordAdapter, DiscordSink};
pub use tavern_core::ChannelAdapter;
