/// Console adapter: stdin lines become messages from a local user, replies are
/// printed to stdout. Runs offline; the token is ignored.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use tavern_core::{
    BotIdentity, ChannelAdapter, IncomingMessage, MessageSink, OutgoingMessage, PlatformEvent,
    User,
};

const CONSOLE_CHANNEL: &str = "console";

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Prints deliveries for one console message.
pub struct ConsoleSink {
    author: String,
}

impl ConsoleSink {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
        }
    }

    /// Text shown for a channel send.
    pub fn render_send(message: &OutgoingMessage) -> String {
        match message {
            OutgoingMessage::Text { content } => content.clone(),
            OutgoingMessage::Embed(embed) => embed.to_plain_text(),
        }
    }

    /// Text shown for a reply: addressed to the author.
    pub fn render_reply(&self, message: &OutgoingMessage) -> String {
        format!("@{}, {}", self.author, Self::render_send(message))
    }
}

#[async_trait]
impl MessageSink for ConsoleSink {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        println!("{}", Self::render_send(&message));
        Ok(())
    }

    async fn reply(&self, message: OutgoingMessage) -> Result<()> {
        println!("{}", self.render_reply(&message));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct ConsoleAdapter {
    user: User,
    next_id: AtomicU64,
}

impl ConsoleAdapter {
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            user: User::new(username.clone(), username, Utc::now()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Forward every line of `reader` as a message until EOF, then report a disconnect.
    pub async fn forward_lines<R>(&self, reader: R, events: &mpsc::Sender<PlatformEvent>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim_end().to_string();
            if line.is_empty() {
                continue;
            }
            if events.send(PlatformEvent::Message(self.message(line))).await.is_err() {
                debug!("Event receiver dropped; stopping console input");
                return Ok(());
            }
        }

        let _ = events
            .send(PlatformEvent::Disconnect {
                reason: "console input closed".into(),
                code: None,
            })
            .await;
        Ok(())
    }

    /// Build a message from one input line. `@name` tokens become mentions.
    pub fn message(&self, line: String) -> IncomingMessage {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mentions = parse_mentions(&line, self.user.created_at);
        let sink = Arc::new(ConsoleSink::new(self.user.username.clone()));
        IncomingMessage::new(line, self.user.clone(), sink)
            .with_ids(id.to_string(), CONSOLE_CHANNEL)
            .with_mentions(mentions)
    }
}

fn parse_mentions(line: &str, created_at: DateTime<Utc>) -> Vec<User> {
    line.split_whitespace()
        .filter_map(|token| token.strip_prefix('@'))
        .filter(|name| !name.is_empty())
        .map(|name| User::new(name, name, created_at))
        .collect()
}

#[async_trait]
impl ChannelAdapter for ConsoleAdapter {
    fn name(&self) -> &str {
        "console"
    }

    async fn connect(&self, _token: &str, events: mpsc::Sender<PlatformEvent>) -> Result<()> {
        info!(user = %self.user.username, "Console adapter reading stdin");
        let _ = events
            .send(PlatformEvent::Ready(BotIdentity {
                id: CONSOLE_CHANNEL.into(),
                tag: format!("{}#console", self.user.username),
            }))
            .await;
        self.forward_lines(BufReader::new(tokio::io::stdin()), &events).await
    }
}
