use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::gateway::{ConnectionStage, ShardStageUpdateEvent};
use serenity::http::Http;
use serenity::model::channel::Message as DiscordMessage;
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, MessageId};
use serenity::model::user::User as DiscordUser;
use serenity::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use tavern_core::{
    BotIdentity, ChannelAdapter, IncomingMessage, MessageSink, OutgoingMessage, PlatformEvent,
    User,
};

use crate::discord_embeds::DiscordEmbeds;

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Replies to one Discord message.
pub struct DiscordSink {
    http: Arc<Http>,
    channel_id: ChannelId,
    message_id: MessageId,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>, channel_id: ChannelId, message_id: MessageId) -> Self {
        Self {
            http,
            channel_id,
            message_id,
        }
    }
}

#[async_trait]
impl MessageSink for DiscordSink {
    async fn send(&self, message: OutgoingMessage) -> anyhow::Result<()> {
        self.channel_id
            .send_message(&self.http, DiscordEmbeds::build_message(&message))
            .await
            .context("Discord send failed")?;
        Ok(())
    }

    async fn reply(&self, message: OutgoingMessage) -> anyhow::Result<()> {
        let builder = DiscordEmbeds::build_message(&message)
            .reference_message((self.channel_id, self.message_id));
        self.channel_id
            .send_message(&self.http, builder)
            .await
            .context("Discord reply failed")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Event handler
// ---------------------------------------------------------------------------

struct Handler {
    events: mpsc::Sender<PlatformEvent>,
}

impl Handler {
    async fn forward(&self, event: PlatformEvent) {
        let kind = event.kind();
        if self.events.send(event).await.is_err() {
            debug!(%kind, "Event receiver dropped; discarding Discord event");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: DiscordMessage) {
        if msg.author.bot {
            return;
        }

        debug!(channel_id = %msg.channel_id, author = %msg.author.name, "Received Discord message");

        let sink = Arc::new(DiscordSink::new(ctx.http.clone(), msg.channel_id, msg.id));
        let incoming = IncomingMessage::new(msg.content.clone(), to_user(&msg.author), sink)
            .with_ids(msg.id.to_string(), msg.channel_id.to_string())
            .with_mentions(msg.mentions.iter().map(to_user).collect())
            .with_created_at(timestamp(msg.timestamp.unix_timestamp()));

        self.forward(PlatformEvent::Message(incoming)).await;
    }

    async fn ready(&self, _: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        self.forward(PlatformEvent::Ready(BotIdentity {
            id: ready.user.id.to_string(),
            tag: ready.user.tag(),
        }))
        .await;
    }

    async fn resume(&self, _: Context, _: ResumedEvent) {
        self.forward(PlatformEvent::Resumed).await;
    }

    async fn shard_stage_update(&self, _: Context, event: ShardStageUpdateEvent) {
        if let Some(mapped) = stage_event(event.old, event.new) {
            self.forward(mapped).await;
        }
    }
}

/// Map a shard stage change onto a lifecycle event, if it is one.
pub fn stage_event(old: ConnectionStage, new: ConnectionStage) -> Option<PlatformEvent> {
    match new {
        ConnectionStage::Resuming => Some(PlatformEvent::Reconnecting),
        ConnectionStage::Connecting if old == ConnectionStage::Connected => {
            Some(PlatformEvent::Reconnecting)
        }
        ConnectionStage::Disconnected => Some(PlatformEvent::Disconnect {
            reason: "shard disconnected".into(),
            code: None,
        }),
        _ => None,
    }
}

fn to_user(user: &DiscordUser) -> User {
    User {
        id: user.id.to_string(),
        username: user.name.clone(),
        created_at: timestamp(user.id.created_at().unix_timestamp()),
        bot: user.bot,
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DiscordAdapter;

impl DiscordAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChannelAdapter for DiscordAdapter {
    fn name(&self) -> &str {
        "discord"
    }

    async fn connect(&self, token: &str, events: mpsc::Sender<PlatformEvent>) -> anyhow::Result<()> {
        info!("Starting Discord adapter");

        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = Client::builder(token, intents)
            .event_handler(Handler { events })
            .await
            .context("failed to build Discord client")?;

        if let Err(why) = client.start().await {
            error!("Client error: {:?}", why);
            anyhow::bail!("Discord client error: {why}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resuming_is_reconnecting() {
        let ev = stage_event(ConnectionStage::Connected, ConnectionStage::Resuming).unwrap();
        assert!(matches!(ev, PlatformEvent::Reconnecting));
    }

    #[test]
    fn test_reconnect_after_drop() {
        let ev = stage_event(ConnectionStage::Connected, ConnectionStage::Connecting).unwrap();
        assert!(matches!(ev, PlatformEvent::Reconnecting));
        assert!(stage_event(ConnectionStage::Disconnected, ConnectionStage::Connecting).is_none());
    }

    #[test]
    fn test_disconnected_stage() {
        let ev = stage_event(ConnectionStage::Connected, ConnectionStage::Disconnected).unwrap();
        assert!(matches!(ev, PlatformEvent::Disconnect { code: None, .. }));
    }

    #[test]
    fn test_timestamp_conversion() {
        assert_eq!(timestamp(0).timestamp(), 0);
        assert_eq!(timestamp(1_571_140_800).to_rfc2822(), "Tue, 15 Oct 2019 12:00:00 +0000");
    }
}
