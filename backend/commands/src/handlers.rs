/// Built-in command handlers.
///
/// Each handler is a unit struct implementing [`CommandHandler`]; replies go
/// through the message's own sink.
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use tavern_core::{format_utc, Embed, IncomingMessage};

use crate::dice::{evaluate, DiceOutcome};
use crate::dispatch::{BotContext, CommandHandler};

// ---------------------------------------------------------------------------
// dice
// ---------------------------------------------------------------------------

pub struct DiceCommand;

/// Build the embed for a dice outcome, coloured from the bot's `defaultColors`.
pub fn dice_embed(outcome: &DiceOutcome, ctx: &BotContext) -> Embed {
    match outcome {
        DiceOutcome::Rolled {
            spec,
            results,
            extra,
        } => {
            let rolled: Vec<String> = results.iter().map(u32::to_string).collect();
            let embed = Embed::new("Dice Roll Result")
                .color(ctx.config.color("success"))
                .field(format!("You rolled {spec}"), format!("[ {} ]", rolled.join(", ")));
            if extra.is_empty() {
                embed
            } else {
                embed.field("You added the following: ", extra.join(" "))
            }
        }
        DiceOutcome::Invalid(_) => Embed::new("Invalid Parameter")
            .color(ctx.config.color("error"))
            .field(
                "Please specify either no parameter or add a dice count such as 1d6 or 3d12.",
                format!(
                    "Please see \"{}help dice\" for additional information.",
                    ctx.prefix()
                ),
            ),
    }
}

#[async_trait]
impl CommandHandler for DiceCommand {
    async fn execute(&self, message: &IncomingMessage, args: &[String], ctx: &BotContext) -> Result<()> {
        let outcome = evaluate(args, &mut rand::thread_rng());
        if let DiceOutcome::Invalid(e) = &outcome {
            debug!(bot = %ctx.name, error = %e, "Rejected dice parameter");
        }
        message
            .send(dice_embed(&outcome, ctx))
            .await
            .context("failed to send dice result")
    }
}

// ---------------------------------------------------------------------------
// whois
// ---------------------------------------------------------------------------

pub struct WhoisCommand;

#[async_trait]
impl CommandHandler for WhoisCommand {
    async fn execute(&self, message: &IncomingMessage, _args: &[String], _ctx: &BotContext) -> Result<()> {
        match message.first_mention() {
            Some(user) => message
                .send(format!(
                    "User Info: {} (account created: {})",
                    user.username,
                    format_utc(&user.created_at)
                ))
                .await
                .context("failed to send user info"),
            None => message
                .reply(format!(
                    "User Self Info: {} (account created: {})",
                    message.author.username,
                    format_utc(&message.author.created_at)
                ))
                .await
                .context("failed to send self info"),
        }
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

pub struct HelpCommand;

/// Text for `help` (all commands) or `help <name>`.
pub fn help_text(ctx: &BotContext, topic: Option<&str>) -> String {
    let prefix = ctx.prefix();
    match topic {
        None => {
            let mut lines = vec!["Available commands:".to_string()];
            for cmd in ctx.registry.all() {
                lines.push(format!("{prefix}{} — {}", cmd.name, cmd.description));
            }
            lines.push(format!("Send `{prefix}help <command>` for details on one command."));
            lines.join("\n")
        }
        Some(topic) => {
            let name = topic.to_lowercase();
            let name = name.strip_prefix(prefix).unwrap_or(name.as_str());
            match ctx.registry.get(name) {
                Some(cmd) => format!("{prefix}{}: {}", cmd.name, cmd.description),
                None => format!("`{name}` is not a known command. Send `{prefix}help` for the list."),
            }
        }
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn execute(&self, message: &IncomingMessage, args: &[String], ctx: &BotContext) -> Result<()> {
        let text = help_text(ctx, args.first().map(String::as_str));
        message.reply(text).await.context("failed to send help")
    }
}
