//! Discord Embed Builder
//!
//! Maps platform-neutral [`OutgoingMessage`]s onto serenity message builders.

use serenity::builder::{CreateEmbed, CreateMessage};
use tavern_core::{Embed, OutgoingMessage};

pub struct DiscordEmbeds;

impl DiscordEmbeds {
    /// Build the embed, keeping field order and the optional colour.
    pub fn build_embed(embed: &Embed) -> CreateEmbed {
        let mut out = CreateEmbed::new().title(embed.title.clone());
        if let Some(color) = embed.color {
            out = out.colour(color);
        }
        out.fields(
            embed
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.value.clone(), f.inline)),
        )
    }

    /// A full message body for either text or an embed.
    pub fn build_message(message: &OutgoingMessage) -> CreateMessage {
        match message {
            OutgoingMessage::Text { content } => CreateMessage::new().content(content.clone()),
            OutgoingMessage::Embed(embed) => CreateMessage::new().embed(Self::build_embed(embed)),
        }
    }
}
