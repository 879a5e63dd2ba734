//! Message dispatch: route prefixed messages to command handlers.
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use tavern_config::ResolvedConfig;
use tavern_core::{IncomingMessage, TavernError};
use tavern_logging::{BotEvent, EventLogger, redact_sensitive_data};

use crate::detection::parse_invocation;
use crate::registry::CommandRegistry;
use crate::types::DispatchOutcome;

/// The only text a user sees when a command fails.
pub const HANDLER_ERROR_REPLY: &str = "there was an error trying to execute that command!";

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Immutable per-bot state handed to every handler.
#[derive(Debug, Clone)]
pub struct BotContext {
    /// Position of this bot in the manifest.
    pub index: usize,
    pub name: String,
    pub config: ResolvedConfig,
    pub registry: CommandRegistry,
}

impl BotContext {
    pub fn new(index: usize, config: ResolvedConfig, registry: CommandRegistry) -> Self {
        Self {
            index,
            name: config.name().to_string(),
            config,
            registry,
        }
    }

    pub fn prefix(&self) -> &str {
        self.config.prefix()
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command. Replies go through `message`; an `Err` becomes the
    /// generic apology.
    async fn execute(&self, message: &IncomingMessage, args: &[String], ctx: &BotContext)
        -> Result<()>;
}

// ---------------------------------------------------------------------------
// Bypass trigger
// ---------------------------------------------------------------------------

/// Exact-match message answered before prefix handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassTrigger {
    pub token: String,
    pub response: String,
}

impl Default for BypassTrigger {
    fn default() -> Self {
        Self {
            token: "ping".into(),
            response: "pong".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    context: Arc<BotContext>,
    bypass: BypassTrigger,
}

impl Dispatcher {
    pub fn new(context: Arc<BotContext>) -> Self {
        Self {
            context,
            bypass: BypassTrigger::default(),
        }
    }

    pub fn with_bypass(mut self, bypass: BypassTrigger) -> Self {
        self.bypass = bypass;
        self
    }

    pub fn context(&self) -> &BotContext {
        &self.context
    }

    /// Handle one message. Never fails: handler errors and panics are logged
    /// and answered with [`HANDLER_ERROR_REPLY`].
    pub async fn dispatch(&self, message: &IncomingMessage) -> DispatchOutcome {
        let bot = self.context.name.as_str();

        if message.content == self.bypass.token {
            return match message.send(self.bypass.response.as_str()).await {
                Ok(()) => DispatchOutcome::Success,
                Err(e) => {
                    error!(bot, trigger = %self.bypass.token, error = %e, "Bypass reply failed");
                    DispatchOutcome::HandlerError
                }
            };
        }

        let Some(invocation) = parse_invocation(&message.content, self.context.prefix()) else {
            return DispatchOutcome::Ignored;
        };

        let Some(descriptor) = self.context.registry.get(&invocation.name) else {
            debug!(bot, command = %invocation.name, "Unknown command");
            return DispatchOutcome::NotFound(invocation.name);
        };

        info!(bot, command = %descriptor.name, author = %message.author.username, "Dispatching command");
        EventLogger::log_event(
            bot,
            BotEvent::CommandDispatched {
                command: descriptor.name.clone(),
                args: invocation.args.len(),
            },
        );

        let run = descriptor
            .handler
            .execute(message, &invocation.args, &self.context);
        let failure = match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(())) => return DispatchOutcome::Success,
            Ok(Err(e)) => format!("{e:#}"),
            Err(panic) => format!("handler panicked: {}", panic_message(panic.as_ref())),
        };

        let err = TavernError::HandlerExecution {
            command: descriptor.name.clone(),
            detail: failure,
        };
        error!(
            bot,
            command = %descriptor.name,
            error = %redact_sensitive_data(&err.to_string()),
            "Command handler failed"
        );
        EventLogger::log_event(
            bot,
            BotEvent::HandlerFailed {
                command: descriptor.name.clone(),
                error_msg: err.to_string(),
            },
        );

        if let Err(e) = message.reply(HANDLER_ERROR_REPLY).await {
            warn!(bot, command = %descriptor.name, error = %e, "Failed to send error reply");
        }
        DispatchOutcome::HandlerError
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommandDescriptor;
    use anyhow::bail;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tavern_config::{bot_schema, resolve};
    use tavern_core::{DeliveryMode, MemorySink, User};

    struct Failing;

    #[async_trait]
    impl CommandHandler for Failing {
        async fn execute(&self, _: &IncomingMessage, _: &[String], _: &BotContext) -> Result<()> {
            bail!("database exploded at /srv/secret/path")
        }
    }

    struct Panicking;

    #[async_trait]
    impl CommandHandler for Panicking {
        async fn execute(&self, _: &IncomingMessage, _: &[String], _: &BotContext) -> Result<()> {
            panic!("boom")
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        last_args: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandHandler for Counting {
        async fn execute(&self, _: &IncomingMessage, args: &[String], _: &BotContext) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_args.lock().unwrap() = args.to_vec();
            Ok(())
        }
    }

    fn context(registry: CommandRegistry) -> Arc<BotContext> {
        let overrides = json!({"token": "t", "name": "Keeper"});
        let config = resolve(overrides.as_object().unwrap(), &bot_schema(), None)
            .unwrap()
            .config;
        Arc::new(BotContext::new(0, config, registry))
    }

    fn message(content: &str, sink: &Arc<MemorySink>) -> IncomingMessage {
        IncomingMessage::new(content, User::new("1", "alice", Utc::now()), sink.clone())
    }

    fn registry_with(name: &str, handler: Arc<dyn CommandHandler>) -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register(CommandDescriptor::new(name, "test", handler));
        registry
    }

    #[tokio::test]
    async fn test_unprefixed_message_is_ignored() {
        let counting = Arc::new(Counting::default());
        let dispatcher = Dispatcher::new(context(registry_with("count", counting.clone())));
        let sink = Arc::new(MemorySink::new());

        for content in ["count", "hello there", "", "Ping", "ping "] {
            let outcome = dispatcher.dispatch(&message(content, &sink)).await;
            assert_eq!(outcome, DispatchOutcome::Ignored, "content {content:?}");
        }
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_is_silent() {
        let dispatcher = Dispatcher::new(context(CommandRegistry::with_builtins()));
        let sink = Arc::new(MemorySink::new());

        let outcome = dispatcher.dispatch(&message("!nope 1 2", &sink)).await;
        assert_eq!(outcome, DispatchOutcome::NotFound("nope".into()));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_known_command_receives_args() {
        let counting = Arc::new(Counting::default());
        let dispatcher = Dispatcher::new(context(registry_with("count", counting.clone())));
        let sink = Arc::new(MemorySink::new());

        let outcome = dispatcher.dispatch(&message("!COUNT a  b", &sink)).await;
        assert_eq!(outcome, DispatchOutcome::Success);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*counting.last_args.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_handler_error_sends_one_generic_reply() {
        let dispatcher = Dispatcher::new(context(registry_with("fail", Arc::new(Failing))));
        let sink = Arc::new(MemorySink::new());

        let outcome = dispatcher.dispatch(&message("!fail", &sink)).await;
        assert_eq!(outcome, DispatchOutcome::HandlerError);

        let deliveries = sink.take();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].mode, DeliveryMode::Reply);
        assert_eq!(deliveries[0].message.as_text(), Some(HANDLER_ERROR_REPLY));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    struct Leaky;

    #[async_trait]
    impl CommandHandler for Leaky {
        async fn execute(&self, _: &IncomingMessage, _: &[String], _: &BotContext) -> Result<()> {
            bail!("login rejected for {LEAKED_TOKEN}")
        }
    }

    const LEAKED_TOKEN: &str = "MTA0NTY3ODkwMTIzNDU2Nzg5MA.GaBcDe.abcdefghijklmnopqrstuvwxyz0123456";

    #[tokio::test]
    async fn test_handler_failure_is_logged_without_secrets() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let dispatcher = Dispatcher::new(context(registry_with("leak", Arc::new(Leaky))));
        let sink = Arc::new(MemorySink::new());
        let outcome = dispatcher.dispatch(&message("!leak", &sink)).await;
        assert_eq!(outcome, DispatchOutcome::HandlerError);

        let logs = captured.text();
        assert!(logs.contains("Command handler failed"), "logs: {logs}");
        assert!(logs.contains("HandlerFailed"), "logs: {logs}");
        assert!(logs.contains("[REDACTED_TOKEN]"), "logs: {logs}");
        assert!(!logs.contains(LEAKED_TOKEN), "logs: {logs}");
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let dispatcher = Dispatcher::new(context(registry_with("boom", Arc::new(Panicking))));
        let sink = Arc::new(MemorySink::new());

        let outcome = dispatcher.dispatch(&message("!boom", &sink)).await;
        assert_eq!(outcome, DispatchOutcome::HandlerError);
        assert_eq!(sink.take()[0].message.as_text(), Some(HANDLER_ERROR_REPLY));
    }

    #[tokio::test]
    async fn test_ping_bypasses_prefix() {
        let dispatcher = Dispatcher::new(context(CommandRegistry::new()));
        let sink = Arc::new(MemorySink::new());

        let outcome = dispatcher.dispatch(&message("ping", &sink)).await;
        assert_eq!(outcome, DispatchOutcome::Success);
        assert_eq!(sink.take()[0].message.as_text(), Some("pong"));
    }

    #[tokio::test]
    async fn test_custom_bypass() {
        let dispatcher = Dispatcher::new(context(CommandRegistry::new())).with_bypass(BypassTrigger {
            token: "hello".into(),
            response: "hi!".into(),
        });
        let sink = Arc::new(MemorySink::new());

        assert_eq!(
            dispatcher.dispatch(&message("ping", &sink)).await,
            DispatchOutcome::Ignored
        );
        assert_eq!(
            dispatcher.dispatch(&message("hello", &sink)).await,
            DispatchOutcome::Success
        );
    }

    #[test]
    fn test_context_takes_name_from_config() {
        let ctx = context(CommandRegistry::new());
        assert_eq!(ctx.name, "Keeper");
        assert_eq!(ctx.prefix(), "!");
    }
}
