pub mod lifecycle;
pub mod supervisor;

pub use lifecycle::{BotState, Lifecycle, LifecycleError};
pub use supervisor::{BotSpec, BotSupervisor};
