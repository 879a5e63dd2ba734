use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::traits::MessageSink;
use crate::types::User;

/// An inbound chat message plus the capability to answer it.
///
/// The platform adapter owns the underlying event; commands only read the
/// fields and call [`IncomingMessage::send`] / [`IncomingMessage::reply`].
#[derive(Clone)]
pub struct IncomingMessage {
    pub id: String,
    pub channel_id: String,
    pub content: String,
    pub author: User,
    /// Mentioned users in the order the platform reported them.
    pub mentions: Vec<User>,
    pub created_at: DateTime<Utc>,
    sink: Arc<dyn MessageSink>,
}

impl IncomingMessage {
    pub fn new(content: impl Into<String>, author: User, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            id: String::new(),
            channel_id: String::new(),
            content: content.into(),
            author,
            mentions: Vec::new(),
            created_at: Utc::now(),
            sink,
        }
    }

    pub fn with_ids(mut self, id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        self.id = id.into();
        self.channel_id = channel_id.into();
        self
    }

    pub fn with_mentions(mut self, mentions: Vec<User>) -> Self {
        self.mentions = mentions;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// First mentioned user, if any.
    pub fn first_mention(&self) -> Option<&User> {
        self.mentions.first()
    }

    /// Post to the channel the message came from.
    pub async fn send(&self, message: impl Into<OutgoingMessage>) -> Result<()> {
        self.sink.send(message.into()).await
    }

    /// Answer the author directly.
    pub async fn reply(&self, message: impl Into<OutgoingMessage>) -> Result<()> {
        self.sink.reply(message.into()).await
    }
}

impl fmt::Debug for IncomingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingMessage")
            .field("id", &self.id)
            .field("channel_id", &self.channel_id)
            .field("content", &self.content)
            .field("author", &self.author)
            .field("mentions", &self.mentions)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Something the bot sends back: plain text or a structured embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    Text { content: String },
    Embed(Embed),
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Plain text body, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            Self::Embed(_) => None,
        }
    }

    pub fn as_embed(&self) -> Option<&Embed> {
        match self {
            Self::Embed(embed) => Some(embed),
            Self::Text { .. } => None,
        }
    }
}

impl From<&str> for OutgoingMessage {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for OutgoingMessage {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<Embed> for OutgoingMessage {
    fn from(value: Embed) -> Self {
        Self::Embed(value)
    }
}

/// Platform-neutral rich message: title, optional colour, named fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    /// 0xRRGGBB
    pub color: Option<u32>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn color(mut self, color: Option<u32>) -> Self {
        self.color = color;
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }

    /// Render as plain text for adapters without rich formatting.
    pub fn to_plain_text(&self) -> String {
        let mut lines = vec![format!("== {} ==", self.title)];
        for field in &self.fields {
            lines.push(format!("{}: {}", field.name, field.value));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{DeliveryMode, MemorySink};

    fn author() -> User {
        User::new("42", "alice", Utc::now())
    }

    #[tokio::test]
    async fn test_send_and_reply_reach_sink() {
        let sink = Arc::new(MemorySink::new());
        let msg = IncomingMessage::new("hello", author(), sink.clone());

        msg.send("to channel").await.unwrap();
        msg.reply(Embed::new("Title")).await.unwrap();

        let deliveries = sink.deliveries();
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].mode, DeliveryMode::Send);
        assert_eq!(deliveries[0].message.as_text(), Some("to channel"));
        assert_eq!(deliveries[1].mode, DeliveryMode::Reply);
        assert_eq!(deliveries[1].message.as_embed().unwrap().title, "Title");
    }

    #[test]
    fn test_first_mention_preserves_order() {
        let sink = Arc::new(MemorySink::new());
        let bob = User::new("2", "bob", Utc::now());
        let carol = User::new("3", "carol", Utc::now());
        let msg = IncomingMessage::new("!whois", author(), sink).with_mentions(vec![bob, carol]);
        assert_eq!(msg.first_mention().unwrap().username, "bob");
    }

    #[test]
    fn test_embed_plain_text() {
        let embed = Embed::new("Dice Roll Result")
            .color(Some(0x41b95f))
            .field("You rolled 2d6", "[ 1, 4 ]");
        assert_eq!(embed.to_plain_text(), "== Dice Roll Result ==\nYou rolled 2d6: [ 1, 4 ]");
    }

    #[test]
    fn test_outgoing_serialization_tag() {
        let json = serde_json::to_value(OutgoingMessage::text("pong")).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["content"], "pong");
    }
}
