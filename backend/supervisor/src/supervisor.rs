use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use tavern_commands::{BotContext, CommandRegistry, Dispatcher};
use tavern_config::{bot_config_path, bot_schema, load_bot_config, BotEntry, Schema, DEFAULT_BOT_NAME};
use tavern_core::{ChannelAdapter, EventBus, PlatformEvent, TavernError};

use crate::lifecycle::{BotState, Lifecycle};

/// How long in-flight commands may keep running after the client stops.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Everything needed to start one bot.
#[derive(Debug, Clone)]
pub struct BotSpec {
    /// Position in the bots manifest.
    pub index: usize,
    /// Values known before the config file is read (name, token, extras).
    pub overrides: Map<String, Value>,
    pub config_dir: PathBuf,
}

impl BotSpec {
    pub fn new(index: usize, overrides: Map<String, Value>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            index,
            overrides,
            config_dir: config_dir.into(),
        }
    }

    /// Spec for manifest entry `index`, reading its token from the environment.
    pub fn from_entry(index: usize, entry: &BotEntry, config_dir: impl Into<PathBuf>) -> Self {
        Self::new(index, entry.overrides(), config_dir)
    }

    pub fn name(&self) -> &str {
        self.overrides
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_BOT_NAME)
    }

    pub fn config_path(&self) -> PathBuf {
        bot_config_path(&self.config_dir, self.name())
    }
}

/// Lifecycle controller for one bot: load config, load commands, connect,
/// then feed platform events through the dispatcher.
pub struct BotSupervisor {
    spec: BotSpec,
    schema: Schema,
    registry: CommandRegistry,
    lifecycle: Lifecycle,
    ever_connected: bool,
    /// One task per message being dispatched.
    inflight: JoinSet<()>,
    shutdown_grace: Duration,
}

impl BotSupervisor {
    pub fn new(spec: BotSpec) -> Self {
        let lifecycle = Lifecycle::new(spec.name());
        Self {
            spec,
            schema: bot_schema(),
            registry: CommandRegistry::with_builtins(),
            lifecycle,
            ever_connected: false,
            inflight: JoinSet::new(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Replace the command set loaded during startup.
    pub fn with_registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn state(&self) -> &BotState {
        self.lifecycle.state()
    }

    /// Run the bot until the adapter stops. Returns the final state.
    pub async fn run(mut self, adapter: Arc<dyn ChannelAdapter>) -> BotState {
        if let Some(context) = self.bootstrap().await {
            self.serve(context, adapter).await;
        }
        self.lifecycle.state().clone()
    }

    /// Startup phase: config then commands. `None` when the bot stopped in
    /// `AwaitingSetup` or `FatalError`.
    pub async fn bootstrap(&mut self) -> Option<Arc<BotContext>> {
        self.advance(BotState::ConfigLoading);

        let path = self.spec.config_path();
        let existed = path.exists();
        let loaded = match load_bot_config(&self.spec.config_dir, &self.spec.overrides, &self.schema).await {
            Ok(loaded) if !loaded.first_run => loaded,
            Ok(_) => {
                self.awaiting_setup(&path);
                return None;
            }
            Err(e) if !existed && path.exists() => {
                debug!(bot = %self.spec.name(), error = %e, "Config incomplete on first run");
                self.awaiting_setup(&path);
                return None;
            }
            Err(e) => {
                error!(bot = %self.spec.name(), error = %e, "Failed to load bot config");
                self.advance(BotState::FatalError(e.to_string()));
                return None;
            }
        };
        self.lifecycle.set_bot(loaded.config.name());

        self.advance(BotState::CommandsLoading);
        let registry = self.registry.clone();
        info!(bot = %loaded.config.name(), commands = registry.len(), "Loaded commands");

        Some(Arc::new(BotContext::new(self.spec.index, loaded.config, registry)))
    }

    fn awaiting_setup(&mut self, path: &std::path::Path) {
        warn!(
            bot = %self.spec.name(),
            path = %path.display(),
            "Generated a new bot config; edit it and restart"
        );
        self.advance(BotState::AwaitingSetup);
    }

    async fn serve(&mut self, context: Arc<BotContext>, adapter: Arc<dyn ChannelAdapter>) {
        self.advance(BotState::Connecting);

        let Some((tx, mut events)) = EventBus::new().into_parts() else {
            let err = TavernError::ChannelClosed("event bus receiver unavailable".into());
            self.advance(BotState::FatalError(err.to_string()));
            return;
        };

        let token = context.config.token().unwrap_or_default().to_string();
        info!(bot = %context.name, adapter = adapter.name(), "Connecting");
        let connection = tokio::spawn(async move { adapter.connect(&token, tx).await });

        let dispatcher = Arc::new(Dispatcher::new(context));
        while let Some(event) = events.recv().await {
            self.handle_event(&dispatcher, event);
            self.reap_finished();
        }

        let failure = match connection.await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(TavernError::PlatformConnection(format!("{e:#}"))),
            Err(join) => Some(TavernError::PlatformConnection(format!("adapter task failed: {join}"))),
        };

        match failure {
            Some(err) if !self.ever_connected => {
                error!(bot = %dispatcher.context().name, error = %err, "Could not connect");
                self.advance(BotState::FatalError(err.to_string()));
            }
            Some(err) => {
                error!(bot = %dispatcher.context().name, error = %err, "Client stopped");
                self.advance(BotState::Disconnected);
            }
            None => {
                info!(bot = %dispatcher.context().name, "Client stopped");
                self.advance(BotState::Disconnected);
            }
        }

        self.drain_inflight(&dispatcher.context().name).await;
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.inflight.try_join_next() {
            if let Err(e) = joined {
                warn!(error = %e, "Dispatch task failed");
            }
        }
    }

    /// Wait for running commands, then abort whatever outlives the grace period.
    async fn drain_inflight(&mut self, bot: &str) {
        if self.inflight.is_empty() {
            return;
        }
        let grace = self.shutdown_grace;
        let inflight = &mut self.inflight;
        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = inflight.join_next().await {
                if let Err(e) = joined {
                    warn!(bot, error = %e, "Dispatch task failed");
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!(bot, pending = self.inflight.len(), "Aborting commands still running at shutdown");
            self.inflight.abort_all();
        }
    }

    /// React to one platform event. Messages are dispatched on their own task
    /// so a slow command never holds up later events.
    pub fn handle_event(&mut self, dispatcher: &Arc<Dispatcher>, event: PlatformEvent) {
        let bot = dispatcher.context().name.clone();
        match event {
            PlatformEvent::Ready(identity) => {
                info!(bot = %bot, "Logged in as: {} (id: {})", identity.tag, identity.id);
                self.ever_connected = true;
                self.advance(BotState::Connected);
            }
            PlatformEvent::Message(message) => {
                let dispatcher = Arc::clone(dispatcher);
                self.inflight.spawn(async move {
                    let outcome = dispatcher.dispatch(&message).await;
                    debug!(bot = %bot, outcome = %outcome, "Message handled");
                });
            }
            PlatformEvent::Error(detail) => {
                let err = TavernError::PlatformConnection(detail);
                error!(bot = %bot, error = %err, "Client error");
            }
            PlatformEvent::Reconnecting => {
                info!(bot = %bot, "Reconnecting...");
                self.advance(BotState::Reconnecting);
            }
            PlatformEvent::Resumed => {
                info!(bot = %bot, "Session resumed");
                self.advance(BotState::Connected);
            }
            PlatformEvent::Disconnect { reason, code } => {
                let err = TavernError::PlatformDisconnect { reason, code };
                warn!(bot = %bot, "{err}");
                self.advance(BotState::Disconnected);
            }
        }
    }

    fn advance(&mut self, to: BotState) {
        // Rejections are logged by the lifecycle itself.
        let _ = self.lifecycle.transition(to);
    }
}
