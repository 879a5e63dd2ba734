pub mod channel;
pub mod error;
pub mod event;
pub mod message;
pub mod sink;
pub mod traits;
pub mod types;

pub use channel::EventBus;
pub use error::TavernError;
pub use event::{EventKind, PlatformEvent};
pub use message::{Embed, EmbedField, IncomingMessage, OutgoingMessage};
pub use sink::{Delivery, DeliveryMode, MemorySink};
pub use traits::{ChannelAdapter, MessageSink};
pub use types::{format_utc, BotIdentity, User};
